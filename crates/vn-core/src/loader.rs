use serde_yaml::Value;
use std::path::Path;

use crate::error::ConfigError;

/// Read a topology description from a YAML file.
///
/// The returned mapping carries a `config_dir` entry holding the absolute
/// directory of `path`, which the validator uses to resolve relative host
/// file references. Any `config_dir` already present in the file is replaced.
pub fn load_config(path: &Path) -> Result<Value, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = std::fs::read_to_string(path).map_err(io_error)?;
    let mut config: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let absolute = std::path::absolute(path).map_err(io_error)?;
    let config_dir = absolute.parent().unwrap_or(Path::new("/"));

    let Value::Mapping(mapping) = &mut config else {
        return Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        });
    };
    mapping.insert(
        Value::from("config_dir"),
        Value::from(config_dir.to_string_lossy().into_owned()),
    );

    tracing::debug!(
        "Loaded topology from {} (config_dir: {})",
        path.display(),
        config_dir.display()
    );
    Ok(config)
}
