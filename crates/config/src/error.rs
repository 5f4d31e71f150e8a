use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid sources file {}: {message}", path.display())]
    Sources { path: PathBuf, message: String },

    #[error("invalid settings: {0}")]
    Invalid(String),
}
