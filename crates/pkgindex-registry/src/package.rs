//! Package metadata records.
//!
//! A [`PackageRecord`] is what a package author publishes: an identifier, a
//! list of [`VersionEntry`]s and any number of descriptive fields. Only the
//! fields needed for merging and ordering are typed; everything else is kept
//! verbatim in `extra` so it round-trips unchanged into the catalog.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{ErrorContext, RegistryError, Result},
    version::{VersionKey, VersionParseError},
};

/// Name of the per-package metadata file inside each package directory.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_epoch: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VersionEntry {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            version_epoch: None,
            extra: Map::new(),
        }
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.version_epoch = Some(epoch);
        self
    }

    /// Ordering key of this entry.
    pub fn sort_key(&self) -> std::result::Result<VersionKey, VersionParseError> {
        VersionKey::parse(&self.version, self.version_epoch)
    }
}

/// One package's published metadata, keyed by `identifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub identifier: String,

    pub versions: Vec<VersionEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageRecord {
    pub fn new(identifier: impl Into<String>, versions: Vec<VersionEntry>) -> Self {
        Self {
            identifier: identifier.into(),
            versions,
            extra: Map::new(),
        }
    }

    /// Reads a record from a metadata file.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::MissingInput`] if the file does not exist.
    /// * [`RegistryError::InvalidDocument`] if it is not valid JSON or lacks
    ///   `identifier` or `versions`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading package metadata from {}", path.display());

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

    /// Sorts `versions` newest first.
    ///
    /// The sort is stable, so entries with equal keys keep their relative
    /// order. Keys are computed up front and the record is left untouched if
    /// any of them fails to parse.
    pub fn sort_versions(&mut self) -> Result<()> {
        let keys = self
            .versions
            .iter()
            .map(VersionEntry::sort_key)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| {
                RegistryError::MalformedVersion {
                    identifier: self.identifier.clone(),
                    source: err,
                }
            })?;

        let mut keyed: Vec<(VersionKey, VersionEntry)> =
            keys.into_iter().zip(self.versions.drain(..)).collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        self.versions = keyed.into_iter().map(|(_, entry)| entry).collect();

        Ok(())
    }
}
