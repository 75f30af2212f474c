//! Server module for building the hub's HTTP server
//!
//! `ServerBuilder` wires a store, configuration and auth provider into the
//! business routes, health checks and a JSON 404 fallback.

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::build_routes;
