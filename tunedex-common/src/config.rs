//! Configuration loading and resolution
//!
//! Settings follow the same priority order everywhere:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Default catalog service base URL
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3001";

/// Environment variable overriding the catalog service base URL
pub const SERVICE_URL_ENV: &str = "TUNEDEX_SERVICE_URL";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TUNEDEX_DATA_DIR";

/// Optional settings from the user's config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub service_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl TomlConfig {
    /// Read and parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the platform config file. A missing file is the normal case and
    /// yields defaults silently; an unreadable or malformed one is logged
    /// and skipped.
    pub fn load_or_default() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                Self::default()
            }
        }
    }
}

/// Platform config file location (`<config dir>/tunedex/config.toml`)
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunedex").join("config.toml"))
}

/// Resolve the catalog service base URL
pub fn resolve_service_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return url.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
        return url;
    }

    // Priority 3: TOML config file
    if let Some(url) = TomlConfig::load_or_default().service_url {
        return url;
    }

    // Priority 4: Compiled default
    DEFAULT_SERVICE_URL.to_string()
}

/// Resolve the directory holding the local song cache
pub fn resolve_data_dir(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = TomlConfig::load_or_default().data_dir {
        return path;
    }

    default_data_dir()
}

/// OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunedex"))
        .unwrap_or_else(|| PathBuf::from("./tunedex_data"))
}

/// Create the data directory if it does not exist yet
pub fn ensure_data_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
