use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading a topology or settings file from disk
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path} does not contain a mapping at the top level")]
    NotAMapping { path: PathBuf },
}
