//! Shared test harness for marketplace store backends
//!
//! Provides row builders for every table and the [`SeedStore`] trait that
//! each backend's test file implements to load fixtures directly, bypassing
//! the directory's write rules.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod marketplace_store_tests;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use knust_hub::config::ListingConfig;
use knust_hub::core::analytics::{AnalyticsWindow, DailyOrders, OrderTotals, StatusCount, TopProduct};
use knust_hub::core::directory::BusinessDirectory;
use knust_hub::core::filter::Predicate;
use knust_hub::core::model::{
    Business, BusinessPatch, BusinessSummary, Order, OrderItem, Product, Review,
    ReviewWithAuthor, User,
};
use knust_hub::core::pagination::PageRequest;
use knust_hub::core::ranking::ResultOrder;
use knust_hub::core::service::MarketplaceStore;

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Raw fixture loading for a backend under test
#[async_trait]
pub trait SeedStore: MarketplaceStore + Clone + 'static {
    async fn seed_user(&self, user: &User) -> Result<()>;
    async fn seed_business(&self, business: &Business) -> Result<()>;
    async fn seed_product(&self, product: &Product) -> Result<()>;
    async fn seed_review(&self, review: &Review) -> Result<()>;
    async fn seed_order(&self, order: &Order) -> Result<()>;
    async fn seed_order_item(&self, item: &OrderItem) -> Result<()>;
}

/// Directory over `store` with default limits and analytics window
pub fn directory_for<S: SeedStore>(store: &S) -> BusinessDirectory {
    BusinessDirectory::new(
        Arc::new(store.clone()),
        ListingConfig::default(),
        AnalyticsWindow::default(),
    )
}

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

/// Message carried by injected failures; must never reach a response body
pub const INJECTED_FAILURE: &str = "relation \"businesses_shadow\" does not exist";

/// Delegating store that can fail one named operation, or skip the
/// one-active-business pre-check so inserts race into the store's own rule
#[derive(Clone)]
pub struct FaultyStore<S> {
    inner: S,
    failing: Option<&'static str>,
    hide_active_owners: bool,
}

impl<S: MarketplaceStore + Clone + 'static> FaultyStore<S> {
    /// Every call to `operation` fails
    pub fn failing(inner: S, operation: &'static str) -> Self {
        Self {
            inner,
            failing: Some(operation),
            hide_active_owners: false,
        }
    }

    /// `active_business_of` always answers `None`
    pub fn with_stale_owner_check(inner: S) -> Self {
        Self {
            inner,
            failing: None,
            hide_active_owners: true,
        }
    }

    pub fn directory(&self) -> BusinessDirectory {
        BusinessDirectory::new(
            Arc::new(self.clone()),
            ListingConfig::default(),
            AnalyticsWindow::default(),
        )
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.failing == Some(operation) {
            bail!("{}: {}", operation, INJECTED_FAILURE);
        }
        Ok(())
    }
}

#[async_trait]
impl<S: MarketplaceStore + Clone + 'static> MarketplaceStore for FaultyStore<S> {
    async fn count_businesses(&self, predicate: &Predicate) -> Result<u64> {
        self.check("count_businesses")?;
        self.inner.count_businesses(predicate).await
    }

    async fn list_businesses(
        &self,
        predicate: &Predicate,
        order: ResultOrder,
        page: Option<PageRequest>,
    ) -> Result<Vec<BusinessSummary>> {
        self.check("list_businesses")?;
        self.inner.list_businesses(predicate, order, page).await
    }

    async fn business_summary(&self, id: &Uuid) -> Result<Option<BusinessSummary>> {
        self.check("business_summary")?;
        self.inner.business_summary(id).await
    }

    async fn available_products(&self, business_id: &Uuid) -> Result<Vec<Product>> {
        self.check("available_products")?;
        self.inner.available_products(business_id).await
    }

    async fn recent_reviews(&self, business_id: &Uuid, limit: u32) -> Result<Vec<ReviewWithAuthor>> {
        self.check("recent_reviews")?;
        self.inner.recent_reviews(business_id, limit).await
    }

    async fn order_totals(&self, business_id: Uuid) -> Result<OrderTotals> {
        self.check("order_totals")?;
        self.inner.order_totals(business_id).await
    }

    async fn orders_by_status(&self, business_id: Uuid) -> Result<Vec<StatusCount>> {
        self.check("orders_by_status")?;
        self.inner.orders_by_status(business_id).await
    }

    async fn top_products(&self, business_id: Uuid, limit: u32) -> Result<Vec<TopProduct>> {
        self.check("top_products")?;
        self.inner.top_products(business_id, limit).await
    }

    async fn orders_per_day(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyOrders>> {
        self.check("orders_per_day")?;
        self.inner.orders_per_day(business_id, since).await
    }

    async fn user_exists(&self, user_id: &Uuid) -> Result<bool> {
        self.check("user_exists")?;
        self.inner.user_exists(user_id).await
    }

    async fn active_business_of(&self, owner_id: &Uuid) -> Result<Option<Uuid>> {
        self.check("active_business_of")?;
        if self.hide_active_owners {
            return Ok(None);
        }
        self.inner.active_business_of(owner_id).await
    }

    async fn find_active_business(&self, id: &Uuid) -> Result<Option<Business>> {
        self.check("find_active_business")?;
        self.inner.find_active_business(id).await
    }

    async fn insert_business(&self, business: Business) -> Result<Business> {
        self.check("insert_business")?;
        self.inner.insert_business(business).await
    }

    async fn update_business(&self, id: &Uuid, patch: BusinessPatch) -> Result<Option<Business>> {
        self.check("update_business")?;
        self.inner.update_business(id, patch).await
    }

    async fn deactivate_business(&self, id: &Uuid) -> Result<bool> {
        self.check("deactivate_business")?;
        self.inner.deactivate_business(id).await
    }
}

// ---------------------------------------------------------------------------
// Row builders
// ---------------------------------------------------------------------------

/// Timestamps truncated to whole seconds survive a PostgreSQL round trip intact
pub fn at(offset: Duration) -> DateTime<Utc> {
    let base = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_else(Utc::now);
    base + offset
}

pub fn user(first_name: &str) -> User {
    let id = Uuid::new_v4();
    User {
        id,
        username: format!("{}-{}", first_name.to_lowercase(), &id.simple().to_string()[..8]),
        first_name: first_name.to_string(),
        last_name: "Owusu".to_string(),
        created_at: at(Duration::zero()),
    }
}

pub fn business(owner: &User, name: &str, description: &str) -> Business {
    let now = at(Duration::zero());
    Business {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.to_string(),
        category: "Food".to_string(),
        location: "Ayeduase".to_string(),
        contact_number: "0241234567".to_string(),
        whatsapp_link: None,
        instagram_handle: None,
        logo_url: None,
        owner_id: owner.id,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Business created `age_minutes` ago
pub fn business_aged(owner: &User, name: &str, description: &str, age_minutes: i64) -> Business {
    let mut b = business(owner, name, description);
    b.created_at = at(-Duration::minutes(age_minutes));
    b.updated_at = b.created_at;
    b
}

pub fn product(business: &Business, name: &str, available: bool) -> Product {
    Product {
        id: Uuid::new_v4(),
        business_id: business.id,
        name: name.to_string(),
        description: format!("{} from {}", name, business.name),
        price: 12.5,
        is_available: available,
        created_at: at(Duration::zero()),
        updated_at: at(Duration::zero()),
    }
}

pub fn review(business: &Business, author: &User, rating: i32, age_minutes: i64) -> Review {
    Review {
        id: Uuid::new_v4(),
        business_id: business.id,
        user_id: author.id,
        rating,
        comment: Some(format!("{} stars", rating)),
        created_at: at(-Duration::minutes(age_minutes)),
    }
}

pub fn order(
    business: &Business,
    customer: &User,
    total_amount: f64,
    status: &str,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: Uuid::new_v4(),
        business_id: business.id,
        customer_id: customer.id,
        status: status.to_string(),
        total_amount,
        created_at,
    }
}

pub fn order_item(order: &Order, product: &Product, quantity: i32) -> OrderItem {
    OrderItem {
        id: Uuid::new_v4(),
        order_id: order.id,
        product_id: product.id,
        quantity,
        unit_price: product.price,
    }
}

/// Seed an owner and a business in one step
pub async fn seed_owned_business<S: SeedStore>(
    store: &S,
    owner_name: &str,
    name: &str,
    description: &str,
    age_minutes: i64,
) -> (User, Business) {
    let owner = user(owner_name);
    store.seed_user(&owner).await.expect("seed user");
    let b = business_aged(&owner, name, description, age_minutes);
    store.seed_business(&b).await.expect("seed business");
    (owner, b)
}
