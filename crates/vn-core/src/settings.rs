use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// How far back the VLAN link existence check looks for earlier violations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkCheckScope {
    /// Skip the check once any violation has been recorded during the run
    #[default]
    Global,
    /// Skip the check once a violation has been recorded for the same machine
    Machine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub supported_machine_types: Vec<String>,
    pub vlan_link_check: LinkCheckScope,
    /// Switch `n` is provisioned as the bridge `{prefix}{n}`
    pub switch_bridge_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supported_machine_types: vec!["router".into(), "host".into(), "switch".into()],
            vlan_link_check: LinkCheckScope::Global,
            switch_bridge_prefix: "vnet-br".into(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn supports_machine_type(&self, kind: &str) -> bool {
        self.supported_machine_types.iter().any(|t| t == kind)
    }
}
