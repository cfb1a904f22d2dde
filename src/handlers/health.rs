use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Paths advertised by the liveness probe
pub const ENDPOINTS: [&str; 2] = ["/classify", "/test"];

/// Liveness probe at `GET /`
pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "EcoCycle Backend LIVE",
            "endpoints": ENDPOINTS,
        })),
    )
}
