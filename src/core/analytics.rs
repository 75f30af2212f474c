//! Order analytics for one business
//!
//! Four independent aggregates are issued concurrently and merged into one
//! [`AnalyticsReport`]. If any of them fails the whole report fails; a
//! partially filled report is never returned.

use crate::core::service::MarketplaceStore;
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order count, revenue and average order value
///
/// All three are zero (never null) for a business without orders.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub avg_order_value: f64,
}

impl OrderTotals {
    /// Fold a list of order amounts
    pub fn from_amounts(amounts: &[f64]) -> Self {
        if amounts.is_empty() {
            return Self::default();
        }
        let total_revenue: f64 = amounts.iter().sum();
        Self {
            total_orders: amounts.len() as i64,
            total_revenue,
            avg_order_value: total_revenue / amounts.len() as f64,
        }
    }
}

/// Number of orders in one status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// A best-selling product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub total_sold: i64,
}

/// Orders placed on one UTC calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct DailyOrders {
    pub day: NaiveDate,
    pub orders: i64,
}

/// Merged analytics for one business
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub totals: OrderTotals,
    pub orders_by_status: Vec<StatusCount>,
    pub top_products: Vec<TopProduct>,
    pub orders_per_day: Vec<DailyOrders>,
}

/// Bounds of the analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsWindow {
    /// How many best sellers to report
    pub top_products: u32,
    /// Length of the trailing daily series
    pub window_days: u32,
}

impl Default for AnalyticsWindow {
    fn default() -> Self {
        Self {
            top_products: 5,
            window_days: 30,
        }
    }
}

impl AnalyticsWindow {
    /// First instant included in the daily series
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.window_days))
    }
}

/// Run the four aggregates concurrently and merge them
pub async fn collect_report(
    store: &dyn MarketplaceStore,
    business_id: Uuid,
    window: AnalyticsWindow,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let since = window.since(now);

    let (totals, orders_by_status, top_products, orders_per_day) = tokio::try_join!(
        store.order_totals(business_id),
        store.orders_by_status(business_id),
        store.top_products(business_id, window.top_products),
        store.orders_per_day(business_id, since),
    )?;

    Ok(AnalyticsReport {
        totals,
        orders_by_status,
        top_products,
        orders_per_day,
    })
}
