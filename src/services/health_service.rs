use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging store failures.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let mut healthy = true;

    if let Err(err) = state.submissions().ping() {
        warn!(error = %err, "submission store health check failed");
        healthy = false;
    }
    if let Err(err) = state.results().ping() {
        warn!(error = %err, "result store health check failed");
        healthy = false;
    }

    if healthy {
        HealthResponse::ok()
    } else {
        HealthResponse::degraded()
    }
}
