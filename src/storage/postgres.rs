//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresMarketplaceStore`, backed by a PostgreSQL database via
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! knust-hub = { version = "0.1.0", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Tables are created by the migrations under `migrations/`, applied with
//! [`migrate`]. Monetary columns are `NUMERIC` and are cast to `float8` when
//! read. Listing filters come from [`Predicate::write_to`], so every
//! user-supplied value travels as a bound parameter.

use crate::core::analytics::{DailyOrders, OrderTotals, StatusCount, TopProduct};
use crate::core::filter::{Predicate, SqlValue, SqlWriter, WrittenPredicate};
use crate::core::model::{Business, BusinessPatch, BusinessSummary, Product, ReviewWithAuthor};
use crate::core::pagination::PageRequest;
use crate::core::ranking::ResultOrder;
use crate::core::service::{ActiveBusinessConflict, MarketplaceStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Postgres;
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::query::QueryAs;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply pending migrations (idempotent).
///
/// Safe to call on every startup.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))
}

// ---------------------------------------------------------------------------
// Statement fragments
// ---------------------------------------------------------------------------

const BUSINESS_COLUMNS: &str = "b.id, b.name, b.description, b.category, b.location, \
     b.contact_number, b.whatsapp_link, b.instagram_handle, b.logo_url, b.owner_id, \
     b.is_active, b.created_at, b.updated_at";

/// Aggregated listing row: distinct counts so that the product and review
/// joins do not inflate each other
const SUMMARY_SELECT: &str = "COUNT(DISTINCT p.id) AS product_count, \
     AVG(r.rating)::float8 AS average_rating, \
     COUNT(DISTINCT r.id) AS review_count, \
     u.first_name AS owner_first_name, \
     u.last_name AS owner_last_name \
     FROM businesses b \
     LEFT JOIN products p ON p.business_id = b.id \
     LEFT JOIN reviews r ON r.business_id = b.id \
     LEFT JOIN users u ON u.id = b.owner_id";

const SUMMARY_GROUP_BY: &str = " GROUP BY b.id, u.first_name, u.last_name";

/// Partial unique index backing the one-active-business rule
const ONE_ACTIVE_PER_OWNER_INDEX: &str = "idx_businesses_one_active_per_owner";

const RETURNING_BUSINESS: &str = "RETURNING id, name, description, category, location, \
     contact_number, whatsapp_link, instagram_handle, logo_url, owner_id, is_active, \
     created_at, updated_at";

/// Bind predicate parameters in placeholder order
fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in params {
        query = match value {
            SqlValue::Text(text) => query.bind(text.clone()),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Uuid(id) => query.bind(*id),
        };
    }
    query
}

/// LIMIT/OFFSET operand; BIGINT tops out at `i64::MAX`
fn row_count(n: u64) -> SqlValue {
    SqlValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn write_where(writer: &mut SqlWriter, predicate: &Predicate) -> WrittenPredicate {
    if predicate.clauses().is_empty() {
        return WrittenPredicate::default();
    }
    writer.push(" WHERE ");
    predicate.write_to(writer)
}

// ---------------------------------------------------------------------------
// PostgresMarketplaceStore
// ---------------------------------------------------------------------------

/// Marketplace store backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use sqlx::PgPool;
/// use knust_hub::storage::{PostgresMarketplaceStore, postgres::migrate};
///
/// let pool = PgPool::connect("postgres://postgres@localhost/knust_enterprise_hub").await?;
/// migrate(&pool).await?;
/// let store = PostgresMarketplaceStore::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresMarketplaceStore {
    pool: PgPool,
}

impl PostgresMarketplaceStore {
    /// Create a new `PostgresMarketplaceStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MarketplaceStore for PostgresMarketplaceStore {
    async fn count_businesses(&self, predicate: &Predicate) -> Result<u64> {
        let mut writer = SqlWriter::new();
        writer.push("SELECT COUNT(*) FROM businesses b");
        write_where(&mut writer, predicate);
        let (sql, params) = writer.finish();

        let (count,) = bind_values(sqlx::query_as::<_, (i64,)>(&sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to count businesses: {}", e))?;

        Ok(count.max(0) as u64)
    }

    async fn list_businesses(
        &self,
        predicate: &Predicate,
        order: ResultOrder,
        page: Option<PageRequest>,
    ) -> Result<Vec<BusinessSummary>> {
        let mut writer = SqlWriter::new();
        writer
            .push("SELECT ")
            .push(BUSINESS_COLUMNS)
            .push(", ")
            .push(SUMMARY_SELECT);
        let written = write_where(&mut writer, predicate);
        writer.push(SUMMARY_GROUP_BY).push(" ");
        writer.push(&order.order_by_sql(&written));
        if let Some(page) = page {
            writer.push(" LIMIT ");
            writer.push_bind(row_count(page.limit()));
            writer.push(" OFFSET ");
            writer.push_bind(row_count(page.offset()));
        }
        let (sql, params) = writer.finish();
        tracing::trace!(sql = %sql, params = params.len(), "listing businesses");

        bind_values(sqlx::query_as::<_, BusinessSummary>(&sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to list businesses: {}", e))
    }

    async fn business_summary(&self, id: &Uuid) -> Result<Option<BusinessSummary>> {
        let predicate = Predicate::active_business(*id);
        let mut writer = SqlWriter::new();
        writer
            .push("SELECT ")
            .push(BUSINESS_COLUMNS)
            .push(", ")
            .push(SUMMARY_SELECT);
        write_where(&mut writer, &predicate);
        writer.push(SUMMARY_GROUP_BY);
        let (sql, params) = writer.finish();

        bind_values(sqlx::query_as::<_, BusinessSummary>(&sql), &params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch business {}: {}", id, e))
    }

    async fn available_products(&self, business_id: &Uuid) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            "SELECT id, business_id, name, description, price::float8 AS price, is_available, \
             created_at, updated_at \
             FROM products \
             WHERE business_id = $1 AND is_available = true \
             ORDER BY created_at DESC, id ASC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch products: {}", e))
    }

    async fn recent_reviews(&self, business_id: &Uuid, limit: u32) -> Result<Vec<ReviewWithAuthor>> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.business_id, r.user_id, r.rating, r.comment, r.created_at, \
             u.username, u.first_name, u.last_name \
             FROM reviews r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.business_id = $1 \
             ORDER BY r.created_at DESC, r.id ASC \
             LIMIT $2",
        )
        .bind(business_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch reviews: {}", e))
    }

    async fn order_totals(&self, business_id: Uuid) -> Result<OrderTotals> {
        let (total_orders, total_revenue, avg_order_value): (i64, f64, f64) = sqlx::query_as(
            "SELECT COUNT(*), \
             COALESCE(SUM(total_amount), 0)::float8, \
             COALESCE(AVG(total_amount), 0)::float8 \
             FROM orders WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to compute order totals: {}", e))?;

        Ok(OrderTotals {
            total_orders,
            total_revenue,
            avg_order_value,
        })
    }

    async fn orders_by_status(&self, business_id: Uuid) -> Result<Vec<StatusCount>> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count \
             FROM orders WHERE business_id = $1 \
             GROUP BY status ORDER BY status",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to group orders by status: {}", e))
    }

    async fn top_products(&self, business_id: Uuid, limit: u32) -> Result<Vec<TopProduct>> {
        sqlx::query_as::<_, TopProduct>(
            "SELECT p.id, p.name, SUM(oi.quantity)::int8 AS total_sold \
             FROM order_items oi \
             JOIN products p ON p.id = oi.product_id \
             WHERE p.business_id = $1 \
             GROUP BY p.id, p.name \
             ORDER BY total_sold DESC, p.id ASC \
             LIMIT $2",
        )
        .bind(business_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to rank products: {}", e))
    }

    async fn orders_per_day(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyOrders>> {
        sqlx::query_as::<_, DailyOrders>(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS orders \
             FROM orders \
             WHERE business_id = $1 AND created_at >= $2 \
             GROUP BY day ORDER BY day",
        )
        .bind(business_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to count daily orders: {}", e))
    }

    async fn user_exists(&self, user_id: &Uuid) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to look up user: {}", e))?;
        Ok(exists)
    }

    async fn active_business_of(&self, owner_id: &Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM businesses WHERE owner_id = $1 AND is_active = true LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to look up owner business: {}", e))?;
        Ok(row.map(|(id,)| id))
    }

    async fn find_active_business(&self, id: &Uuid) -> Result<Option<Business>> {
        let sql = format!(
            "SELECT {} FROM businesses b WHERE b.id = $1 AND b.is_active = true",
            BUSINESS_COLUMNS
        );
        sqlx::query_as::<_, Business>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch business {}: {}", id, e))
    }

    async fn insert_business(&self, business: Business) -> Result<Business> {
        let sql = format!(
            "INSERT INTO businesses (id, name, description, category, location, contact_number, \
             whatsapp_link, instagram_handle, logo_url, owner_id, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) {}",
            RETURNING_BUSINESS
        );
        sqlx::query_as::<_, Business>(&sql)
            .bind(business.id)
            .bind(&business.name)
            .bind(&business.description)
            .bind(&business.category)
            .bind(&business.location)
            .bind(&business.contact_number)
            .bind(&business.whatsapp_link)
            .bind(&business.instagram_handle)
            .bind(&business.logo_url)
            .bind(business.owner_id)
            .bind(business.is_active)
            .bind(business.created_at)
            .bind(business.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db)
                    if db.constraint() == Some(ONE_ACTIVE_PER_OWNER_INDEX) =>
                {
                    ActiveBusinessConflict {
                        owner_id: business.owner_id,
                    }
                    .into()
                }
                _ => anyhow!("Failed to insert business: {}", e),
            })
    }

    async fn update_business(&self, id: &Uuid, patch: BusinessPatch) -> Result<Option<Business>> {
        let Some(mut business) = self.find_active_business(id).await? else {
            return Ok(None);
        };
        business.apply(patch);

        let sql = format!(
            "UPDATE businesses SET name = $2, description = $3, category = $4, location = $5, \
             contact_number = $6, whatsapp_link = $7, instagram_handle = $8, logo_url = $9, \
             updated_at = $10 \
             WHERE id = $1 AND is_active = true {}",
            RETURNING_BUSINESS
        );
        sqlx::query_as::<_, Business>(&sql)
            .bind(id)
            .bind(&business.name)
            .bind(&business.description)
            .bind(&business.category)
            .bind(&business.location)
            .bind(&business.contact_number)
            .bind(&business.whatsapp_link)
            .bind(&business.instagram_handle)
            .bind(&business.logo_url)
            .bind(business.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to update business {}: {}", id, e))
    }

    async fn deactivate_business(&self, id: &Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE businesses SET is_active = false, updated_at = NOW() \
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to deactivate business {}: {}", id, e))?;

        Ok(result.rows_affected() > 0)
    }
}
