use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
}

impl HealthResponse {
    /// Both stores answered the ping.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// At least one store did not answer the ping.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
