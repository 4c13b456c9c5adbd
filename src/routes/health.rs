use axum::{http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::success_to_api_response;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(HealthResponse {
            message: "Server is running".into(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").into(),
        }),
    )
}
