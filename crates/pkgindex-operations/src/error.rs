//! Error types for pkgindex-operations.

use std::path::PathBuf;

use miette::Diagnostic;
use pkgindex_commit::CommitError;
use pkgindex_config::error::ConfigError;
use pkgindex_registry::RegistryError;
use pkgindex_utils::error::FileSystemError;
use thiserror::Error;

/// Errors surfaced by the build and update pipelines.
#[derive(Error, Diagnostic, Debug)]
pub enum OperationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    #[diagnostic(code(pkgindex::fs), help("Check file permissions and disk space"))]
    FileSystem(#[from] FileSystemError),

    #[error("Could not find {file_name} in artifacts directory {}", .dir.display())]
    #[diagnostic(
        code(pkgindex::missing_artifact),
        help("Run the catalog build and resource packaging steps first")
    )]
    MissingArtifact {
        file_name: &'static str,
        dir: PathBuf,
    },

    #[error("Error while {action}")]
    #[diagnostic(code(pkgindex::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            OperationError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
