//! Liveness endpoint

use axum::{Json, response::IntoResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Returns 200 OK while the server is running
pub async fn healthz() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
