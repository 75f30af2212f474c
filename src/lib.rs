//! # KNUST Enterprise Hub
//!
//! Backend for a campus marketplace where student businesses list products
//! and collect reviews and orders.
//!
//! ## Features
//!
//! - **Filtered listings**: category, location and free-text filters compiled
//!   into one parameterized predicate shared by the count and row queries
//! - **Ranked search**: name matches ahead of description-only matches
//! - **Pagination**: `currentPage`, `totalPages`, `totalCount`, `hasNext`, `hasPrev`
//! - **Aggregates**: product count, average rating and review count per business
//! - **Analytics**: order totals, status breakdown, top products, daily orders
//! - **Storage backends**: in-memory (default) and PostgreSQL (`postgres` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use knust_hub::prelude::*;
//!
//! let store = InMemoryMarketplaceStore::new();
//! ServerBuilder::new()
//!     .with_store(store)
//!     .with_config(HubConfig::default())
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::{DatabaseConfig, HubConfig, ListingConfig, ServerConfig};
    pub use crate::core::{
        AnalyticsReport, AnalyticsWindow, AuthContext, AuthProvider, Business,
        BusinessDetail, BusinessDirectory, BusinessPatch, BusinessSummary, FilterCriteria,
        HubError, MarketplaceStore, NewBusiness, NoAuthProvider, PageParams, PageRequest,
        Paginated, PaginationMeta, Predicate, ResultOrder, SearchResults,
        TrustedHeaderAuthProvider,
    };
    pub use crate::server::{AppState, ServerBuilder};

    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryMarketplaceStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresMarketplaceStore;

    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
