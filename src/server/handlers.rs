//! HTTP handlers for the business directory
//!
//! Handlers only translate between HTTP and [`BusinessDirectory`]. Query
//! strings are taken as raw strings and coerced by the directory, so a bad
//! `page` or `limit` falls back to the default instead of failing the request.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::analytics::AnalyticsReport;
use crate::core::auth::AuthProvider;
use crate::core::directory::{BusinessDirectory, SearchResults};
use crate::core::error::HubError;
use crate::core::filter::FilterCriteria;
use crate::core::model::{Business, BusinessDetail, BusinessPatch, BusinessSummary, NewBusiness};
use crate::core::pagination::{PageParams, Paginated};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: BusinessDirectory,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// The authenticated caller; anonymous or unreadable identities are rejected
    async fn caller(&self, headers: &HeaderMap) -> Result<Uuid, HubError> {
        self.auth
            .extract_context(headers)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "rejecting request with unreadable identity");
                HubError::Unauthorized
            })?
            .require_user()
    }
}

/// Query string of `GET /api/businesses`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Query string of `GET /api/businesses/search`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn page_params(page: Option<String>, limit: Option<String>) -> PageParams {
    PageParams { page, limit }
}

fn parse_id(raw: &str) -> Result<Uuid, HubError> {
    Uuid::parse_str(raw).map_err(|_| HubError::BadRequest(format!("Invalid business id '{}'", raw)))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HubError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| HubError::BadRequest(rejection.body_text()))
}

/// List active businesses, most recent first
pub async fn list_businesses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<BusinessSummary>>, HubError> {
    let page = state
        .directory
        .page_request(&page_params(query.page, query.limit));
    let criteria = FilterCriteria {
        category: query.category,
        location: query.location,
        search: query.search,
    };

    let listing = state.directory.list_businesses(criteria, page).await?;
    Ok(Json(listing))
}

/// Ranked search over name and description
pub async fn search_businesses(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, HubError> {
    let page = state
        .directory
        .page_request(&page_params(query.page, query.limit));
    let criteria = FilterCriteria {
        category: query.category,
        location: query.location,
        search: query.q,
    };

    let results = state.directory.search_businesses(criteria, page).await?;
    Ok(Json(results))
}

/// Detail of one active business
pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BusinessDetail>, HubError> {
    let id = parse_id(&id)?;
    Ok(Json(state.directory.business_detail(id).await?))
}

/// Order analytics of one active business
pub async fn get_business_analytics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalyticsReport>, HubError> {
    let id = parse_id(&id)?;
    Ok(Json(state.directory.business_analytics(id).await?))
}

/// Register a business for the calling user
pub async fn create_business(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewBusiness>, JsonRejection>,
) -> Result<(StatusCode, Json<Business>), HubError> {
    let owner = state.caller(&headers).await?;
    let new = json_body(body)?;

    let business = state.directory.create_business(owner, new).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

/// Update a business owned by the calling user
pub async fn update_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<BusinessPatch>, JsonRejection>,
) -> Result<Json<Business>, HubError> {
    let actor = state.caller(&headers).await?;
    let id = parse_id(&id)?;
    let patch = json_body(body)?;

    Ok(Json(state.directory.update_business(actor, id, patch).await?))
}

/// Soft-delete a business owned by the calling user
pub async fn delete_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, HubError> {
    let actor = state.caller(&headers).await?;
    let id = parse_id(&id)?;

    state.directory.delete_business(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint handler
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "knust-hub"
    }))
}

/// Fallback for unknown routes
pub async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}
