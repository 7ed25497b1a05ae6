//! # polysql-core
//!
//! Core types for polysql: the error enum shared by every crate, settings
//! and their loading from files and the environment, and tracing setup.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings and the global settings instance
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{SqlError, SqlResult};
pub use settings::{DatabaseSettings, Settings, SETTINGS};
