//! Deterministic stand-ins for the validator's external capabilities

use serde_yaml::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::mac::{MacAddr, MacGenerator};
use crate::probe::PathProbe;

pub(crate) fn yaml(doc: &str) -> Value {
    serde_yaml::from_str(doc).expect("test YAML parses")
}

/// Hands out 02:00:00:00:00:01, 02:00:00:00:00:02, ...
#[derive(Debug, Default)]
pub(crate) struct SequenceMac {
    issued: u8,
}

impl MacGenerator for SequenceMac {
    fn generate(&mut self) -> MacAddr {
        self.issued += 1;
        MacAddr::new([0x02, 0, 0, 0, 0, self.issued])
    }
}

/// A filesystem holding exactly the listed paths
#[derive(Debug, Default)]
pub(crate) struct FakeFs {
    paths: HashSet<PathBuf>,
}

impl FakeFs {
    pub(crate) fn with<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            paths: paths.into_iter().map(PathBuf::from).collect(),
        }
    }
}

impl PathProbe for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}
