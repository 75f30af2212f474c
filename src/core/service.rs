//! Store trait behind the business directory

use crate::core::analytics::{DailyOrders, OrderTotals, StatusCount, TopProduct};
use crate::core::filter::Predicate;
use crate::core::model::{Business, BusinessPatch, BusinessSummary, Product, ReviewWithAuthor};
use crate::core::pagination::PageRequest;
use crate::core::ranking::ResultOrder;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An insert would give an owner a second active business
///
/// Stores return it inside `anyhow::Error` when their own uniqueness check
/// fires, which happens when a concurrent registration wins the race past the
/// directory's pre-check.
#[derive(Debug, thiserror::Error)]
#[error("owner '{owner_id}' already has an active business")]
pub struct ActiveBusinessConflict {
    pub owner_id: Uuid,
}

/// Read and write access to the marketplace tables
///
/// Reads never mutate. Implementations bind every value carried by a
/// [`Predicate`]; they never splice request input into statement text.
/// Errors are plain `anyhow` errors: the directory turns them into a generic
/// storage failure.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Count businesses matching the predicate
    async fn count_businesses(&self, predicate: &Predicate) -> Result<u64>;

    /// Aggregate rows matching the predicate, ordered, optionally paged
    async fn list_businesses(
        &self,
        predicate: &Predicate,
        order: ResultOrder,
        page: Option<PageRequest>,
    ) -> Result<Vec<BusinessSummary>>;

    /// Aggregate row of one active business
    async fn business_summary(&self, id: &Uuid) -> Result<Option<BusinessSummary>>;

    /// Available products of a business, newest first
    async fn available_products(&self, business_id: &Uuid) -> Result<Vec<Product>>;

    /// Most recent reviews of a business with author names
    async fn recent_reviews(&self, business_id: &Uuid, limit: u32) -> Result<Vec<ReviewWithAuthor>>;

    /// Order count, revenue and average value
    async fn order_totals(&self, business_id: Uuid) -> Result<OrderTotals>;

    /// One row per observed order status
    async fn orders_by_status(&self, business_id: Uuid) -> Result<Vec<StatusCount>>;

    /// Products with the highest summed quantity, descending
    async fn top_products(&self, business_id: Uuid, limit: u32) -> Result<Vec<TopProduct>>;

    /// Orders per day since `since`, ascending, days without orders omitted
    async fn orders_per_day(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyOrders>>;

    /// Whether a user with this id exists
    async fn user_exists(&self, user_id: &Uuid) -> Result<bool>;

    /// Active business owned by `owner_id`, if any
    async fn active_business_of(&self, owner_id: &Uuid) -> Result<Option<Uuid>>;

    /// Active business by id (no aggregates)
    async fn find_active_business(&self, id: &Uuid) -> Result<Option<Business>>;

    /// Insert a new business
    async fn insert_business(&self, business: Business) -> Result<Business>;

    /// Apply a partial update to an active business
    async fn update_business(&self, id: &Uuid, patch: BusinessPatch) -> Result<Option<Business>>;

    /// Clear the active flag; returns false when nothing was active
    async fn deactivate_business(&self, id: &Uuid) -> Result<bool>;
}
