use std::path::Path;

/// Answers whether a host path exists as a file or a directory
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probes the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl PathProbe for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file() || path.is_dir()
    }
}
