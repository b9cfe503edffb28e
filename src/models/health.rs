use chrono::{DateTime, Utc};
use serde::Serialize;

/// Réponse de GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            time: Utc::now(),
        }
    }
}
