//! Settings for polysql.
//!
//! This module provides the [`Settings`] struct, which holds the compiler's
//! configuration, and [`LazySettings`], a globally-accessible,
//! lazily-initialized settings instance.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Database dialect selection.
///
/// The `engine` and `driver` strings are interpreted by the statement
/// compiler; this crate only carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database engine (`mysql` or `postgresql`).
    pub engine: String,
    /// The driver talking to the engine (`native` or `data-api`).
    pub driver: String,
    /// The privacy mode used when a statement selects every field
    /// (`public`, `protected` or `private`).
    pub privacy: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "mysql".to_string(),
            driver: "native".to_string(),
            privacy: "public".to_string(),
        }
    }
}

/// The complete set of polysql settings.
///
/// # Examples
///
/// ```
/// use polysql_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert_eq!(settings.database.engine, "mysql");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (human-readable logs).
    pub debug: bool,
    /// The log level filter (e.g. "info", "debug", "polysql_db=trace").
    pub log_level: String,
    /// Dialect selection.
    pub database: DatabaseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            database: DatabaseSettings::default(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured yet.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
