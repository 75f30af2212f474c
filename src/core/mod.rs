//! Core module containing the directory, its query building blocks and the store trait

pub mod analytics;
pub mod auth;
pub mod directory;
pub mod error;
pub mod filter;
pub mod model;
pub mod pagination;
pub mod ranking;
pub mod service;

pub use analytics::{AnalyticsReport, AnalyticsWindow, DailyOrders, OrderTotals, StatusCount, TopProduct};
pub use auth::{AuthContext, AuthProvider, NoAuthProvider, TrustedHeaderAuthProvider};
pub use directory::{BusinessDirectory, SearchFilters, SearchResults};
pub use error::{ErrorResponse, HubError};
pub use filter::{Clause, Column, FilterCriteria, Predicate, PredicateBuilder, SqlValue, SqlWriter};
pub use model::{
    Business, BusinessDetail, BusinessPatch, BusinessSummary, NewBusiness, Order, OrderItem,
    Product, Review, ReviewWithAuthor, User,
};
pub use pagination::{PageParams, PageRequest, Paginated, PaginationMeta};
pub use ranking::ResultOrder;
pub use service::{ActiveBusinessConflict, MarketplaceStore};
