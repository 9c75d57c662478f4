//! Default route served for every path without a dedicated handler.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Router,
};

pub const GREETING: &str = "Hello DevOps Apprentice 👋\n";

/// Registers the greeting as the router fallback.
pub fn routes() -> Router {
    Router::new().fallback(greeting)
}

pub(super) async fn greeting() -> impl IntoResponse {
    // Plain `text/plain`, without the charset axum adds for `&str` bodies.
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        GREETING,
    )
}
