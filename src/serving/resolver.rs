//! Artifact resolution: logical model name -> local artifact path.
//!
//! Model management (registries, downloads, versioning) belongs to the
//! host; it injects a resolver at adapter construction time instead of
//! wiring a hard-coded path into the serving code.

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use crate::error::{Result, ServeError};

/// Resolves a logical model name to a local artifact file.
///
/// An unresolvable name is an [`ServeError::ArtifactLoad`]: resolution only
/// happens on the load path, where every failure is a start-up failure.
#[cfg_attr(test, automock)]
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<PathBuf>;
}

/// Resolves artifacts as `{root}/{name}.{extension}`.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
    extension: String,
}

impl DirectoryResolver {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, extension: S) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }
}

impl ArtifactResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(format!("{}.{}", name, self.extension));
        if !path.is_file() {
            return Err(ServeError::ArtifactLoad(format!(
                "model artifact not found: {}",
                path.display()
            )));
        }
        Ok(path)
    }
}

/// Resolver for hosts that already know the artifact path. The logical
/// name is ignored; existence is still checked at resolve time.
#[derive(Debug, Clone)]
pub struct FixedPathResolver {
    path: PathBuf,
}

impl FixedPathResolver {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactResolver for FixedPathResolver {
    fn resolve(&self, _name: &str) -> Result<PathBuf> {
        if !self.path.is_file() {
            return Err(ServeError::ArtifactLoad(format!(
                "model artifact not found: {}",
                self.path.display()
            )));
        }
        Ok(self.path.clone())
    }
}
