//! Typed error handling for the hub
//!
//! Every fallible directory operation returns [`HubError`]. Each variant maps
//! to one HTTP status and one stable error code, so clients can branch on the
//! code instead of parsing messages.
//!
//! # Error Categories
//!
//! - `NotFound`: a single-entity lookup matched no active row
//! - `Validation`: a write payload failed field validation
//! - `Conflict`: the write would break a uniqueness rule (one active business per owner)
//! - `Unauthorized` / `Forbidden`: missing identity or missing ownership
//! - `BadRequest`: malformed request input
//! - `Storage`: any store failure; the detail is logged, never rendered
//!
//! An empty listing is not an error: it is an empty page.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The main error type for directory operations
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Entity was not found (or is inactive)
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    /// Field validation failed on a write path
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(BTreeMap<String, Vec<String>>),

    /// Write conflicts with existing state
    #[error("{0}")]
    Conflict(String),

    /// No authenticated identity on a request that needs one
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated identity does not own the target entity
    #[error("Not authorized to modify {entity_type} '{id}'")]
    Forbidden { entity_type: String, id: Uuid },

    /// Malformed request input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Store failure. The wrapped error stays server-side.
    #[error("Storage operation failed")]
    Storage(#[source] anyhow::Error),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl HubError {
    /// Shorthand for a business that does not exist or is inactive
    pub fn business_not_found(id: Uuid) -> Self {
        HubError::NotFound {
            entity_type: "business".to_string(),
            id,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HubError::NotFound { .. } => StatusCode::NOT_FOUND,
            HubError::Validation(_) => StatusCode::BAD_REQUEST,
            HubError::Conflict(_) => StatusCode::CONFLICT,
            HubError::Unauthorized => StatusCode::UNAUTHORIZED,
            HubError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HubError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HubError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HubError::NotFound { .. } => "NOT_FOUND",
            HubError::Validation(_) => "VALIDATION_ERROR",
            HubError::Conflict(_) => "CONFLICT",
            HubError::Unauthorized => "UNAUTHORIZED",
            HubError::Forbidden { .. } => "FORBIDDEN",
            HubError::BadRequest(_) => "BAD_REQUEST",
            HubError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            HubError::NotFound { entity_type, id } => Some(serde_json::json!({
                "entity_type": entity_type,
                "id": id.to_string()
            })),
            HubError::Validation(fields) => Some(serde_json::json!({ "fields": fields })),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for HubError {
    fn from(err: anyhow::Error) -> Self {
        HubError::Storage(err)
    }
}

impl From<validator::ValidationErrors> for HubError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        HubError::Validation(fields)
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        if let HubError::Storage(source) = &self {
            tracing::error!(error = %source, "storage failure while serving request");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}
