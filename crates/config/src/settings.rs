// Report settings
// Loaded from ~/.config/countboard/settings.toml

use std::fs;
use std::path::{Path, PathBuf};

use countboard_io::fetch::DEFAULT_TIMEOUT_SECS;
use countboard_recon::ReportOptions;
use serde::Deserialize;

use crate::error::ConfigError;

/// Download settings for shared links
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Worksheet to read when none is given on the command line
    pub sheet: Option<String>,

    /// Saved source name used when `report` gets no source at all
    pub default_source: Option<String>,

    pub report: ReportOptions,

    pub fetch: FetchSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.toml")
    }

    /// Load settings from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.message().to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.report
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
