// Configuration loading

pub mod error;
pub mod settings;
pub mod sources;

pub use error::ConfigError;
pub use settings::{FetchSettings, Settings};
pub use sources::{SourceEntry, SourceRegistry};

use std::path::PathBuf;

/// Environment override for the configuration directory.
pub const CONFIG_DIR_ENV: &str = "COUNTBOARD_CONFIG_DIR";

/// `$COUNTBOARD_CONFIG_DIR` if set, else `<config_dir>/countboard`
/// (`./countboard` when the platform has no config directory).
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("countboard")
}
