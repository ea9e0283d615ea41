//! Error types for the registry crate.
//!
//! This module defines [`RegistryError`], the error type used throughout
//! the crate, along with helper traits for error context.

use std::path::PathBuf;

use miette::Diagnostic;
use pkgindex_utils::error::{FileSystemError, HashError};
use thiserror::Error;

use crate::version::VersionParseError;

/// Errors that can occur while loading, merging or tracking catalog data.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(pkgindex_registry::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Required input {} does not exist", .path.display())]
    #[diagnostic(
        code(pkgindex_registry::missing_input),
        help("Check that the previous pipeline step produced this file")
    )]
    MissingInput { path: PathBuf },

    #[error("Package `{identifier}` has a malformed version")]
    #[diagnostic(
        code(pkgindex_registry::malformed_version),
        help("Versions must be dot-separated non-negative integers no larger than 18446744073709551615, e.g. 1.2.3")
    )]
    MalformedVersion {
        identifier: String,
        #[source]
        source: VersionParseError,
    },

    #[error("Invalid document {}: {source}", .path.display())]
    #[diagnostic(
        code(pkgindex_registry::invalid_document),
        help("The file may be corrupted or missing required fields")
    )]
    InvalidDocument {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(pkgindex_registry::json))]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(pkgindex_registry::hash))]
    HashError(#[from] HashError),

    #[error(transparent)]
    #[diagnostic(code(pkgindex_registry::fs))]
    FileSystemError(#[from] FileSystemError),

    #[error("Modification time {0} cannot be rendered as a date")]
    #[diagnostic(code(pkgindex_registry::timestamp))]
    TimestampOutOfRange(i64),
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
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
            RegistryError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
