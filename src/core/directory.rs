//! Business directory: listing, ranked search, detail, analytics and writes
//!
//! `BusinessDirectory` is what request handlers talk to. It builds a fresh
//! [`Predicate`] per call, runs the store queries and maps store failures to
//! [`HubError::Storage`]. It holds no mutable state of its own.

use crate::config::ListingConfig;
use crate::core::analytics::{self, AnalyticsReport, AnalyticsWindow};
use crate::core::error::HubError;
use crate::core::filter::{FilterCriteria, Predicate};
use crate::core::model::{Business, BusinessDetail, BusinessPatch, BusinessSummary, NewBusiness};
use crate::core::pagination::{PageParams, PageRequest, Paginated};
use crate::core::ranking::ResultOrder;
use crate::core::service::{ActiveBusinessConflict, MarketplaceStore};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Ranked search results with the query echoed back
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(flatten)]
    pub page: Paginated<BusinessSummary>,
    pub search_query: Option<String>,
    pub filters: SearchFilters,
}

/// The non-text filters of a search
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub location: Option<String>,
}

/// Entry point for every business read and write
#[derive(Clone)]
pub struct BusinessDirectory {
    store: Arc<dyn MarketplaceStore>,
    listing: ListingConfig,
    analytics: AnalyticsWindow,
}

impl BusinessDirectory {
    pub fn new(
        store: Arc<dyn MarketplaceStore>,
        listing: ListingConfig,
        analytics: AnalyticsWindow,
    ) -> Self {
        Self {
            store,
            listing,
            analytics,
        }
    }

    /// Coerce raw page parameters with the configured defaults
    pub fn page_request(&self, params: &PageParams) -> PageRequest {
        params.resolve(self.listing.default_limit, self.listing.max_limit)
    }

    /// Run the count and the row query over one shared predicate
    ///
    /// Both queries see the same clauses and parameters, so the metadata
    /// always describes the rows it accompanies.
    async fn paginate(
        &self,
        predicate: &Predicate,
        order: ResultOrder,
        page: PageRequest,
    ) -> Result<Paginated<BusinessSummary>, HubError> {
        let (total, items) = tokio::try_join!(
            self.store.count_businesses(predicate),
            self.store.list_businesses(predicate, order, Some(page)),
        )?;

        Ok(Paginated {
            items,
            pagination: page.meta(total),
        })
    }

    /// Active businesses matching the criteria, most recent first
    pub async fn list_businesses(
        &self,
        criteria: FilterCriteria,
        page: PageRequest,
    ) -> Result<Paginated<BusinessSummary>, HubError> {
        let criteria = criteria.normalized();
        let predicate = Predicate::from_criteria(&criteria);
        tracing::debug!(
            category = ?criteria.category,
            location = ?criteria.location,
            search = ?criteria.search,
            page = page.page(),
            limit = page.limit(),
            "listing businesses"
        );

        self.paginate(&predicate, ResultOrder::Recency, page).await
    }

    /// Ranked search: name matches ahead of description-only matches
    pub async fn search_businesses(
        &self,
        criteria: FilterCriteria,
        page: PageRequest,
    ) -> Result<SearchResults, HubError> {
        let criteria = criteria.normalized();
        let predicate = Predicate::from_criteria(&criteria);
        tracing::debug!(
            search = ?criteria.search,
            page = page.page(),
            limit = page.limit(),
            "searching businesses"
        );

        let page = self.paginate(&predicate, ResultOrder::Ranked, page).await?;

        Ok(SearchResults {
            page,
            search_query: criteria.search,
            filters: SearchFilters {
                category: criteria.category,
                location: criteria.location,
            },
        })
    }

    /// One active business with its available products and recent reviews
    pub async fn business_detail(&self, id: Uuid) -> Result<BusinessDetail, HubError> {
        let summary = self
            .store
            .business_summary(&id)
            .await?
            .ok_or_else(|| HubError::business_not_found(id))?;

        let (products, reviews) = tokio::try_join!(
            self.store.available_products(&id),
            self.store
                .recent_reviews(&id, self.listing.detail_review_limit),
        )?;

        Ok(BusinessDetail {
            summary,
            products,
            reviews,
        })
    }

    /// Order analytics of one active business
    pub async fn business_analytics(&self, id: Uuid) -> Result<AnalyticsReport, HubError> {
        self.require_active(id).await?;

        let report =
            analytics::collect_report(self.store.as_ref(), id, self.analytics, Utc::now()).await?;
        tracing::debug!(
            business_id = %id,
            total_orders = report.totals.total_orders,
            "analytics report compiled"
        );
        Ok(report)
    }

    /// Register a business for `owner_id`
    pub async fn create_business(
        &self,
        owner_id: Uuid,
        new: NewBusiness,
    ) -> Result<Business, HubError> {
        new.validate()?;

        if !self.store.user_exists(&owner_id).await? {
            return Err(HubError::BadRequest("User not found".to_string()));
        }
        if self.store.active_business_of(&owner_id).await?.is_some() {
            return Err(already_active());
        }

        let business = self
            .store
            .insert_business(Business::from_new(owner_id, new))
            .await
            .map_err(|e| {
                if e.downcast_ref::<ActiveBusinessConflict>().is_some() {
                    already_active()
                } else {
                    HubError::Storage(e)
                }
            })?;
        tracing::info!(business_id = %business.id, owner_id = %owner_id, "business created");
        Ok(business)
    }

    /// Partially update a business owned by `actor`
    pub async fn update_business(
        &self,
        actor: Uuid,
        id: Uuid,
        patch: BusinessPatch,
    ) -> Result<Business, HubError> {
        patch.validate()?;
        self.require_owner(actor, id).await?;

        let business = self
            .store
            .update_business(&id, patch)
            .await?
            .ok_or_else(|| HubError::business_not_found(id))?;
        tracing::info!(business_id = %id, "business updated");
        Ok(business)
    }

    /// Soft-delete a business owned by `actor`
    pub async fn delete_business(&self, actor: Uuid, id: Uuid) -> Result<(), HubError> {
        self.require_owner(actor, id).await?;

        if !self.store.deactivate_business(&id).await? {
            return Err(HubError::business_not_found(id));
        }
        tracing::info!(business_id = %id, "business deactivated");
        Ok(())
    }

    async fn require_active(&self, id: Uuid) -> Result<Business, HubError> {
        self.store
            .find_active_business(&id)
            .await?
            .ok_or_else(|| HubError::business_not_found(id))
    }

    async fn require_owner(&self, actor: Uuid, id: Uuid) -> Result<Business, HubError> {
        let business = self.require_active(id).await?;
        if business.owner_id != actor {
            return Err(HubError::Forbidden {
                entity_type: "business".to_string(),
                id,
            });
        }
        Ok(business)
    }
}

fn already_active() -> HubError {
    HubError::Conflict("User already has an active business".to_string())
}
