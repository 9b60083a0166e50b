//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use tracing::debug;

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of the config and the model server
pub async fn get_health(state: &AppState) -> CommandResponse<HealthResponse> {
    let mut health = HealthResponse::default();

    health.config = state.is_config_healthy();

    health.model_server = match state.check_model_server().await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "model server health check failed");
            false
        }
    };

    // Overall status
    health.status = if health.config && health.model_server {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    CommandResponse::ok(health)
}
