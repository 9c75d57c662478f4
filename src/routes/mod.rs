//! HTTP route definitions and handlers.
//!
//! Requests are dispatched on the request target: exactly `/health` reports
//! liveness as JSON and everything else, including `/health` with a query
//! string, receives the plain-text greeting. Methods, headers and bodies are
//! never inspected.

mod greeting_routes;
mod health_routes;

pub use greeting_routes::GREETING;
pub use health_routes::{HealthStatus, HEALTH_PATH};

use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router() -> Router {
    Router::new()
        .merge(health_routes::routes())
        .merge(greeting_routes::routes())
}
