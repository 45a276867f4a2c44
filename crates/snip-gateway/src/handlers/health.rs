use crate::model::HealthResponse;
use axum::Json;
use jiff::Timestamp;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Timestamp::now(),
    })
}
