//! In-memory implementation of MarketplaceStore for testing and development
//!
//! Predicates, ordering and aggregates are evaluated with the same semantics
//! as the PostgreSQL backend: case-insensitive substring search, averages
//! absent without reviews, distinct counts, days without orders omitted.

use crate::core::analytics::{DailyOrders, OrderTotals, StatusCount, TopProduct};
use crate::core::filter::Predicate;
use crate::core::model::{
    Business, BusinessPatch, BusinessSummary, Order, OrderItem, Product, Review, ReviewWithAuthor,
    User,
};
use crate::core::pagination::PageRequest;
use crate::core::ranking::ResultOrder;
use crate::core::service::{ActiveBusinessConflict, MarketplaceStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    businesses: HashMap<Uuid, Business>,
    products: HashMap<Uuid, Product>,
    reviews: HashMap<Uuid, Review>,
    orders: HashMap<Uuid, Order>,
    order_items: HashMap<Uuid, OrderItem>,
}

impl Tables {
    fn summarize(&self, business: &Business) -> BusinessSummary {
        let product_count = self
            .products
            .values()
            .filter(|p| p.business_id == business.id)
            .count() as i64;

        let ratings: Vec<i32> = self
            .reviews
            .values()
            .filter(|r| r.business_id == business.id)
            .map(|r| r.rating)
            .collect();
        let average_rating = (!ratings.is_empty())
            .then(|| ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64);

        let owner = self.users.get(&business.owner_id);

        BusinessSummary {
            business: business.clone(),
            product_count,
            average_rating,
            review_count: ratings.len() as i64,
            owner_first_name: owner.map(|u| u.first_name.clone()),
            owner_last_name: owner.map(|u| u.last_name.clone()),
        }
    }
}

/// In-memory marketplace store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryMarketplaceStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryMarketplaceStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }

    pub fn add_user(&self, user: User) -> Result<()> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    /// Store a business as-is, bypassing the one-active-per-owner check
    pub fn add_business(&self, business: Business) -> Result<()> {
        self.write()?.businesses.insert(business.id, business);
        Ok(())
    }

    pub fn add_product(&self, product: Product) -> Result<()> {
        self.write()?.products.insert(product.id, product);
        Ok(())
    }

    pub fn add_review(&self, review: Review) -> Result<()> {
        self.write()?.reviews.insert(review.id, review);
        Ok(())
    }

    pub fn add_order(&self, order: Order) -> Result<()> {
        self.write()?.orders.insert(order.id, order);
        Ok(())
    }

    pub fn add_order_item(&self, item: OrderItem) -> Result<()> {
        self.write()?.order_items.insert(item.id, item);
        Ok(())
    }

    /// Raw business row regardless of its active flag
    pub fn business(&self, id: &Uuid) -> Result<Option<Business>> {
        Ok(self.read()?.businesses.get(id).cloned())
    }
}

#[async_trait]
impl MarketplaceStore for InMemoryMarketplaceStore {
    async fn count_businesses(&self, predicate: &Predicate) -> Result<u64> {
        let tables = self.read()?;
        Ok(tables
            .businesses
            .values()
            .filter(|b| predicate.matches(b))
            .count() as u64)
    }

    async fn list_businesses(
        &self,
        predicate: &Predicate,
        order: ResultOrder,
        page: Option<PageRequest>,
    ) -> Result<Vec<BusinessSummary>> {
        let tables = self.read()?;
        let mut rows: Vec<BusinessSummary> = tables
            .businesses
            .values()
            .filter(|b| predicate.matches(b))
            .map(|b| tables.summarize(b))
            .collect();

        let term = predicate.search_term();
        rows.sort_by(|a, b| order.compare(term, a, b));

        Ok(match page {
            Some(page) => rows
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
                .collect(),
            None => rows,
        })
    }

    async fn business_summary(&self, id: &Uuid) -> Result<Option<BusinessSummary>> {
        let tables = self.read()?;
        let predicate = Predicate::active_business(*id);
        Ok(tables
            .businesses
            .get(id)
            .filter(|b| predicate.matches(b))
            .map(|b| tables.summarize(b)))
    }

    async fn available_products(&self, business_id: &Uuid) -> Result<Vec<Product>> {
        let tables = self.read()?;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| &p.business_id == business_id && p.is_available)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn recent_reviews(&self, business_id: &Uuid, limit: u32) -> Result<Vec<ReviewWithAuthor>> {
        let tables = self.read()?;
        let mut reviews: Vec<ReviewWithAuthor> = tables
            .reviews
            .values()
            .filter(|r| &r.business_id == business_id)
            .filter_map(|r| {
                // Inner join: reviews whose author is gone are skipped
                tables.users.get(&r.user_id).map(|u| ReviewWithAuthor {
                    review: r.clone(),
                    username: u.username.clone(),
                    first_name: u.first_name.clone(),
                    last_name: u.last_name.clone(),
                })
            })
            .collect();
        reviews.sort_by(|a, b| {
            b.review
                .created_at
                .cmp(&a.review.created_at)
                .then(a.review.id.cmp(&b.review.id))
        });
        reviews.truncate(limit as usize);
        Ok(reviews)
    }

    async fn order_totals(&self, business_id: Uuid) -> Result<OrderTotals> {
        let tables = self.read()?;
        let amounts: Vec<f64> = tables
            .orders
            .values()
            .filter(|o| o.business_id == business_id)
            .map(|o| o.total_amount)
            .collect();
        Ok(OrderTotals::from_amounts(&amounts))
    }

    async fn orders_by_status(&self, business_id: Uuid) -> Result<Vec<StatusCount>> {
        let tables = self.read()?;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for order in tables.orders.values().filter(|o| o.business_id == business_id) {
            *counts.entry(order.status.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status.to_string(),
                count,
            })
            .collect())
    }

    async fn top_products(&self, business_id: Uuid, limit: u32) -> Result<Vec<TopProduct>> {
        let tables = self.read()?;
        let mut sold: HashMap<Uuid, i64> = HashMap::new();
        for item in tables.order_items.values() {
            let Some(product) = tables.products.get(&item.product_id) else {
                continue;
            };
            if product.business_id == business_id {
                *sold.entry(product.id).or_default() += i64::from(item.quantity);
            }
        }

        let mut top: Vec<TopProduct> = sold
            .into_iter()
            .filter_map(|(id, total_sold)| {
                tables.products.get(&id).map(|p| TopProduct {
                    id,
                    name: p.name.clone(),
                    total_sold,
                })
            })
            .collect();
        top.sort_by(|a, b| b.total_sold.cmp(&a.total_sold).then(a.id.cmp(&b.id)));
        top.truncate(limit as usize);
        Ok(top)
    }

    async fn orders_per_day(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyOrders>> {
        let tables = self.read()?;
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for order in tables
            .orders
            .values()
            .filter(|o| o.business_id == business_id && o.created_at >= since)
        {
            *per_day.entry(order.created_at.date_naive()).or_default() += 1;
        }
        Ok(per_day
            .into_iter()
            .map(|(day, orders)| DailyOrders { day, orders })
            .collect())
    }

    async fn user_exists(&self, user_id: &Uuid) -> Result<bool> {
        Ok(self.read()?.users.contains_key(user_id))
    }

    async fn active_business_of(&self, owner_id: &Uuid) -> Result<Option<Uuid>> {
        Ok(self
            .read()?
            .businesses
            .values()
            .find(|b| &b.owner_id == owner_id && b.is_active)
            .map(|b| b.id))
    }

    async fn find_active_business(&self, id: &Uuid) -> Result<Option<Business>> {
        Ok(self
            .read()?
            .businesses
            .get(id)
            .filter(|b| b.is_active)
            .cloned())
    }

    async fn insert_business(&self, business: Business) -> Result<Business> {
        let mut tables = self.write()?;
        if tables
            .businesses
            .values()
            .any(|b| b.owner_id == business.owner_id && b.is_active)
        {
            return Err(ActiveBusinessConflict {
                owner_id: business.owner_id,
            }
            .into());
        }
        tables.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn update_business(&self, id: &Uuid, patch: BusinessPatch) -> Result<Option<Business>> {
        let mut tables = self.write()?;
        let Some(business) = tables.businesses.get_mut(id).filter(|b| b.is_active) else {
            return Ok(None);
        };
        business.apply(patch);
        Ok(Some(business.clone()))
    }

    async fn deactivate_business(&self, id: &Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        match tables.businesses.get_mut(id).filter(|b| b.is_active) {
            Some(business) => {
                business.is_active = false;
                business.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
