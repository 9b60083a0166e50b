//! Storage Layer
//!
//! Handles all data persistence: subject records and the JSON config.

pub mod config;
pub mod subject_store;

pub use config::*;
pub use subject_store::*;
