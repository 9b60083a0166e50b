//! Commands
//!
//! Front-end entry points. Every handler takes the shared `AppState` and
//! answers with a `CommandResponse`, so any front end (the bundled terminal
//! one included) renders success and failure the same way.

pub mod chat;
pub mod health;
pub mod init;
pub mod input;
pub mod settings;
pub mod subjects;

pub use chat::*;
pub use health::*;
pub use init::*;
pub use input::*;
pub use settings::*;
pub use subjects::*;
