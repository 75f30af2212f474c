//! Route table of the hub

use super::handlers::{
    AppState, create_business, delete_business, get_business, get_business_analytics,
    health_check, list_businesses, route_not_found, search_businesses, update_business,
};
use axum::{Router, routing::get};

/// Build the business routes
///
/// - GET /api/businesses - Paginated listing with category/location/search filters
/// - GET /api/businesses/search - Ranked search (`q`)
/// - GET /api/businesses/{id} - Detail with products and recent reviews
/// - GET /api/businesses/{id}/analytics - Order analytics
/// - POST /api/businesses - Register a business (authenticated)
/// - PUT /api/businesses/{id} - Update (owner only)
/// - DELETE /api/businesses/{id} - Soft delete (owner only)
pub fn build_business_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/businesses",
            get(list_businesses).post(create_business),
        )
        .route("/api/businesses/search", get(search_businesses))
        .route(
            "/api/businesses/{id}",
            get(get_business)
                .put(update_business)
                .delete(delete_business),
        )
        .route(
            "/api/businesses/{id}/analytics",
            get(get_business_analytics),
        )
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Full application router with the JSON 404 fallback
pub fn build_routes(state: AppState) -> Router {
    health_routes()
        .merge(build_business_routes(state))
        .fallback(route_not_found)
}
