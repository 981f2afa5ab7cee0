//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that pings the backing object store

use crate::namespace::NamespaceService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON
/// body. This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe: one cheap round trip to the store (bucket listing).
/// HTTP 200 when it answers, HTTP 503 when it does not.
pub async fn readyz(State(service): State<NamespaceService>) -> impl IntoResponse {
    match service.list_buckets().await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ok".into(),
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "error".into(),
                error: Some(err.to_string()),
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
