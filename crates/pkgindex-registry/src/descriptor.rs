//! Repository descriptor and change detection for published artifacts.
//!
//! The descriptor ties each published artifact to the digest, timestamp and
//! download address of its last published content. [`TrackedFileRecord::update`]
//! is the only place those digests change, and it is what decides whether a
//! publish happens at all.

use std::{fmt, fs, io, path::Path};

use pkgindex_utils::{fs::modified_timestamp, hash::calculate_sha256, time::format_local_timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    canonical::to_canonical_string,
    error::{ErrorContext, RegistryError, Result},
};

/// An artifact tracked by the repository descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// The package catalog.
    Packages,
    /// The companion resource bundle.
    Resources,
}

impl Artifact {
    pub const ALL: [Artifact; 2] = [Artifact::Packages, Artifact::Resources];

    /// Key of the artifact in the descriptor.
    pub fn key(self) -> &'static str {
        match self {
            Artifact::Packages => "packages",
            Artifact::Resources => "resources",
        }
    }

    /// File name the artifact is produced and published under.
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Packages => "packages.json",
            Artifact::Resources => "resources.zip",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Last published state of one artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedFileRecord {
    /// Hex SHA-256 digest of the last published content.
    pub sha256: String,

    /// Modification time of the source file at last publish, in Unix seconds.
    #[serde(default)]
    pub update_timestamp: i64,

    /// `update_timestamp` rendered as `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub update_time_utc: String,

    /// Address the artifact is downloaded from.
    #[serde(default)]
    pub url: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackedFileRecord {
    /// Rehashes `file_path` and records the new state if the content changed.
    ///
    /// Returns `false` and leaves the record untouched when the digest matches
    /// the recorded one. Otherwise stores the new digest, the file's
    /// modification time and its local-time rendering, and returns `true`.
    /// `url` is never touched here.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::MissingInput`] if the file does not exist.
    /// * [`RegistryError::HashError`] / [`RegistryError::FileSystemError`] if
    ///   it cannot be read or inspected.
    pub fn update<P: AsRef<Path>>(&mut self, file_path: P) -> Result<bool> {
        let file_path = file_path.as_ref();

        let sha256 = calculate_sha256(file_path).map_err(|err| {
            if err.is_not_found() {
                RegistryError::MissingInput {
                    path: file_path.to_path_buf(),
                }
            } else {
                err.into()
            }
        })?;

        if sha256 == self.sha256 {
            debug!("{} is unchanged ({})", file_path.display(), sha256);
            return Ok(false);
        }

        let timestamp = modified_timestamp(file_path)?;
        let rendered =
            format_local_timestamp(timestamp).ok_or(RegistryError::TimestampOutOfRange(timestamp))?;

        debug!(
            "{} changed: {} -> {}",
            file_path.display(),
            self.sha256,
            sha256
        );
        self.sha256 = sha256;
        self.update_timestamp = timestamp;
        self.update_time_utc = rendered;

        Ok(true)
    }
}

/// Maps each tracked artifact to its [`TrackedFileRecord`].
///
/// Top-level keys other than the artifacts are preserved as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub packages: TrackedFileRecord,

    pub resources: TrackedFileRecord,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepositoryDescriptor {
    /// Reads a descriptor document.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::MissingInput`] if the file does not exist.
    /// * [`RegistryError::InvalidDocument`] if it cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading repository descriptor from {}", path.display());

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RegistryError::MissingInput {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };

        serde_json::from_slice(&content).map_err(|err| {
            RegistryError::InvalidDocument {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    pub fn record(&self, artifact: Artifact) -> &TrackedFileRecord {
        match artifact {
            Artifact::Packages => &self.packages,
            Artifact::Resources => &self.resources,
        }
    }

    pub fn record_mut(&mut self, artifact: Artifact) -> &mut TrackedFileRecord {
        match artifact {
            Artifact::Packages => &mut self.packages,
            Artifact::Resources => &mut self.resources,
        }
    }

    /// Canonical serialized form of the descriptor.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(to_canonical_string(self)?)
    }
}
