//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file path could be determined for this user.
    #[error("no configuration directory available; set ACCESSCTL_CONFIG")]
    NoConfigDir,
    /// The config file could not be read or parsed.
    #[error("failed to load configuration from '{path}': {source}")]
    Load {
        /// Path of the file that failed to load.
        path: String,
        /// Underlying parse/read error.
        #[source]
        source: config::ConfigError,
    },
    /// A required key was missing or empty.
    #[error("configuration key '{key}' is required in '{path}'")]
    MissingKey {
        /// Fully-qualified key, e.g. `api.token`.
        key: &'static str,
        /// Path of the file the key was expected in.
        path: String,
    },
    /// The configured API URL did not parse.
    #[error("configured API URL '{value}' is invalid: {source}")]
    InvalidUrl {
        /// Offending value from the config file.
        value: String,
        /// Underlying URL parse error.
        #[source]
        source: url::ParseError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
