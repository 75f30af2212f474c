//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::build_routes;
use crate::config::{HubConfig, ServerConfig};
use crate::core::auth::{AuthProvider, NoAuthProvider, TrustedHeaderAuthProvider};
use crate::core::directory::BusinessDirectory;
use crate::core::service::MarketplaceStore;
use anyhow::Result;
use axum::Router;
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the hub's HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryMarketplaceStore::new())
///     .with_config(HubConfig::default())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn MarketplaceStore>>,
    config: HubConfig,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    ///
    /// Identity is read from the trusted `X-User-Id` header unless another
    /// provider is set or the config is read-only.
    pub fn new() -> Self {
        Self {
            store: None,
            config: HubConfig::default(),
            auth: None,
        }
    }

    /// Set the marketplace store (required)
    pub fn with_store(mut self, store: impl MarketplaceStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_config(mut self, config: HubConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Build the application state without any HTTP layers
    pub fn build_state(&mut self) -> Result<AppState> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("MarketplaceStore is required. Call .with_store()"))?;

        Ok(AppState {
            directory: BusinessDirectory::new(store, self.config.listing, self.config.analytics),
            auth: self
                .auth
                .clone()
                .unwrap_or_else(|| default_auth_provider(&self.config.server)),
        })
    }

    /// Build the final router with tracing and CORS layers
    pub fn build(mut self) -> Result<Router> {
        self.config.validate()?;
        let state = self.build_state()?;

        Ok(build_routes(state)
            .layer(build_cors_layer(&self.config.server))
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_store(store)
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Allow the configured origin, or any origin when none is configured
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let origin = config
        .cors_origin
        .as_deref()
        .and_then(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        });

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}

fn default_auth_provider(config: &ServerConfig) -> Arc<dyn AuthProvider> {
    if config.read_only {
        tracing::info!("read-only mode: caller identity is ignored");
        Arc::new(NoAuthProvider)
    } else {
        Arc::new(TrustedHeaderAuthProvider)
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
