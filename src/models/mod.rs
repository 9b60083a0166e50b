//! Data Models
//!
//! Application-level data structures. The subject data model itself lives in
//! the `study-buddy-core` crate and is re-exported here.

pub mod response;
pub mod settings;

pub use response::{CommandResponse, HealthResponse, SubjectView};
pub use settings::{AppConfig, SettingsUpdate};
pub use study_buddy_core::models::*;
