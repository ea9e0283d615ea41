use std::{
    fs,
    path::PathBuf,
};

use pkgindex_registry::Artifact;

use crate::error::{ErrorContext, OperationError, Result};

/// Locates the tracked artifacts of a run.
pub trait ArtifactSource {
    /// Path of `artifact`, which must exist.
    fn locate(&self, artifact: Artifact) -> Result<PathBuf>;

    /// Raw bytes of `artifact`.
    fn read(&self, artifact: Artifact) -> Result<Vec<u8>> {
        let path = self.locate(artifact)?;
        fs::read(&path).with_context(|| format!("reading {}", path.display()))
    }
}

impl<T: ArtifactSource + ?Sized> ArtifactSource for &T {
    fn locate(&self, artifact: Artifact) -> Result<PathBuf> {
        (**self).locate(artifact)
    }
}

/// Artifacts laid out flat in one directory under their published file names.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl ArtifactSource for ArtifactDir {
    fn locate(&self, artifact: Artifact) -> Result<PathBuf> {
        let path = self.root.join(artifact.file_name());
        if !path.is_file() {
            return Err(OperationError::MissingArtifact {
                file_name: artifact.file_name(),
                dir: self.root.clone(),
            });
        }
        Ok(path)
    }
}
