//! Health check endpoints.

use axum::{
    http::Uri,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::greeting_routes::greeting;

pub const HEALTH_PATH: &str = "/health";

/// Body of the health response, serialized as `{"status":"ok"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        HealthStatus {
            status: "ok".to_string(),
        }
    }
}

/// Registers health check routes. Any method matches.
pub fn routes() -> Router {
    Router::new().route(HEALTH_PATH, any(health_check))
}

/// Simple health check endpoint.
///
/// Returns 200 with an `application/json` body to indicate the service is running.
/// The whole request target must be `/health`; with any query string attached
/// the request gets the greeting instead.
async fn health_check(uri: Uri) -> Response {
    if uri.query().is_some() {
        return greeting().await.into_response();
    }
    Json(HealthStatus::ok()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serializes_exactly() {
        let body = serde_json::to_string(&HealthStatus::ok()).unwrap();
        assert_eq!(body, r#"{"status":"ok"}"#);
    }
}
