//! Request identity for the hub
//!
//! Token issuance and verification happen upstream. By the time a request
//! reaches the hub, an [`AuthProvider`] only has to turn request headers into
//! an [`AuthContext`]. Ownership of a business is checked against the store.

use crate::core::error::HubError;
use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Header carrying the verified user id, set by the auth gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    /// The user id, or `Unauthorized` for anonymous requests
    pub fn require_user(&self) -> Result<Uuid, HubError> {
        self.user_id().ok_or(HubError::Unauthorized)
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Treats every caller as anonymous, which leaves the hub read-only
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}

/// Trusts the `X-User-Id` header written by an upstream gateway
///
/// A missing header yields `Anonymous`; a header that is not a UUID is an error.
pub struct TrustedHeaderAuthProvider;

#[async_trait]
impl AuthProvider for TrustedHeaderAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let Some(value) = headers.get(USER_ID_HEADER) else {
            return Ok(AuthContext::Anonymous);
        };

        let user_id = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid {} header", USER_ID_HEADER))?;

        Ok(AuthContext::User { user_id })
    }
}
