//! Bundled resource resolution.

use std::path::{Path, PathBuf};

/// Resolves a named resource to a file path.
///
/// The application bundle is a collaborator; the sequencer only needs
/// name + extension → path lookups.
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, name: &str, ext: &str) -> Option<PathBuf>;
}

/// Resolver over a plain directory of resource files.
#[derive(Debug, Clone)]
pub struct DirResolver {
    base: PathBuf,
}

impl DirResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ResourceResolver for DirResolver {
    fn resolve(&self, name: &str, ext: &str) -> Option<PathBuf> {
        let path = self.base.join(format!("{name}.{ext}"));
        path.is_file().then_some(path)
    }
}
