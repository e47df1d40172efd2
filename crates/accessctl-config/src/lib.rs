#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Configuration loading for the accessctl client.
//!
//! Settings come from an INI-style file with an `[api]` section carrying the
//! instructor's base URL and the static auth token. The file path is taken
//! from the `ACCESSCTL_CONFIG` environment variable when set, otherwise from
//! the per-user config directory. The loaded [`Settings`] value is passed
//! explicitly into the CLI at startup; nothing here is ambient global state.

use std::env;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

pub mod error;

pub use error::{ConfigError, ConfigResult};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "ACCESSCTL_CONFIG";

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the instructor API, e.g. `http://127.0.0.1:8000/api/v1`.
    pub api_url: Url,
    /// Static token forwarded on mutating calls.
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl Settings {
    /// Load settings from the default location, honouring the
    /// `ACCESSCTL_CONFIG` override.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when no path can be determined, the file
    /// cannot be read or parsed, a required key is missing, or the URL is
    /// invalid.
    pub fn load() -> ConfigResult<Self> {
        let path = env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .map_or_else(default_config_path, Ok)?;
        Self::load_from(&path)
    }

    /// Load settings from an explicit file path. Used directly by tests to
    /// inject fixtures.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Settings::load`], minus path resolution.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let display_path = path.display().to_string();

        let loaded = Config::builder()
            .add_source(File::new(&display_path, FileFormat::Ini))
            .build()
            .map_err(|source| ConfigError::Load {
                path: display_path.clone(),
                source,
            })?;

        let api: ApiSection = loaded.get("api").map_err(|source| ConfigError::Load {
            path: display_path.clone(),
            source,
        })?;

        let url_value = api
            .url
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                key: "api.url",
                path: display_path.clone(),
            })?;
        let token = api
            .token
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                key: "api.token",
                path: display_path.clone(),
            })?;

        let api_url = url_value
            .trim()
            .parse::<Url>()
            .map_err(|source| ConfigError::InvalidUrl {
                value: url_value.clone(),
                source,
            })?;

        Ok(Self {
            api_url,
            token: token.trim().to_string(),
        })
    }
}

fn default_config_path() -> ConfigResult<PathBuf> {
    let dirs = ProjectDirs::from("", "", "accessctl").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.ini"))
}
