use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub time: String,
}

/// GET /api/health -> liveness only; never touches the database.
pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
