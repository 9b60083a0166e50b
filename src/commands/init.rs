//! Initialization Commands
//!
//! Commands for application initialization and setup.

use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Initialize the application on startup
pub async fn init_app(state: &AppState) -> CommandResponse<String> {
    match state.initialize().await {
        Ok(()) => CommandResponse::ok("Application initialized successfully".to_string()),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

/// Get the application version
pub fn get_version() -> CommandResponse<String> {
    CommandResponse::ok(env!("CARGO_PKG_VERSION").to_string())
}
