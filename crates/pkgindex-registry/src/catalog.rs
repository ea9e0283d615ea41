//! The aggregated package catalog.

use std::{collections::HashMap, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    canonical::to_canonical_string,
    error::{ErrorContext, RegistryError, Result},
    package::PackageRecord,
};

/// Ordered collection of every package record in the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub packages: Vec<PackageRecord>,
}

/// Summary of what a [`Catalog::merge`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Packages that were already present and whose record changed.
    pub updated: usize,
    /// Packages that were already present with an identical record.
    pub unchanged: usize,
    /// Packages that were not in the previous catalog.
    pub added: usize,
    /// Identifiers dropped because their source disappeared.
    pub removed: Vec<String>,
    /// Identifiers declared by more than one incoming record.
    pub duplicates: Vec<String>,
}

impl Catalog {
    pub fn new(packages: Vec<PackageRecord>) -> Self {
        Self {
            packages,
        }
    }

    /// Reads a catalog document.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::MissingInput`] if the file does not exist.
    /// * [`RegistryError::InvalidDocument`] if it cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading catalog from {}", path.display());

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

    #[cfg(test)]
    fn identifiers(&self) -> Vec<&str> {
        self.packages
            .iter()
            .map(|pkg| pkg.identifier.as_str())
            .collect()
    }

    #[cfg(test)]
    fn get(&self, identifier: &str) -> Option<&PackageRecord> {
        self.packages
            .iter()
            .find(|pkg| pkg.identifier == identifier)
    }

    /// Merges freshly loaded records into this catalog.
    ///
    /// `incoming` is the complete set of packages for this run, in discovery
    /// order, and defines catalog membership:
    ///
    /// 1. Existing packages whose identifier is in `incoming` keep their
    ///    position and have their record replaced wholesale.
    /// 2. Existing packages missing from `incoming` are dropped.
    /// 3. Remaining incoming packages are appended in discovery order.
    /// 4. Every resulting record's versions are sorted newest first.
    ///
    /// When two incoming records share an identifier the later one wins but
    /// keeps the discovery position of the first.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::MalformedVersion`] if any version fails to parse. No
    ///   catalog is produced in that case.
    pub fn merge(self, incoming: Vec<PackageRecord>) -> Result<(Catalog, MergeReport)> {
        let mut report = MergeReport::default();

        let mut pending: Vec<Option<PackageRecord>> = Vec::with_capacity(incoming.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(incoming.len());
        for record in incoming {
            match positions.get(&record.identifier) {
                Some(&idx) => {
                    warn!(
                        "Package identifier {} is declared more than once; using the last one",
                        record.identifier
                    );
                    report.duplicates.push(record.identifier.clone());
                    pending[idx] = Some(record);
                }
                None => {
                    positions.insert(record.identifier.clone(), pending.len());
                    pending.push(Some(record));
                }
            }
        }

        let mut packages = Vec::with_capacity(pending.len());
        for existing in self.packages {
            let Some(&idx) = positions.get(&existing.identifier) else {
                debug!("Removing package {}", existing.identifier);
                report.removed.push(existing.identifier);
                continue;
            };

            match pending[idx].take() {
                Some(mut record) => {
                    record.sort_versions()?;
                    if record == existing {
                        report.unchanged += 1;
                    } else {
                        debug!("Updating package {}", record.identifier);
                        report.updated += 1;
                    }
                    packages.push(record);
                }
                None => {
                    warn!(
                        "Previous catalog lists {} more than once; dropping the repeat",
                        existing.identifier
                    );
                }
            }
        }

        for mut record in pending.into_iter().flatten() {
            record.sort_versions()?;
            debug!("Adding package {}", record.identifier);
            report.added += 1;
            packages.push(record);
        }

        Ok((Catalog::new(packages), report))
    }

    /// Canonical serialized form of the catalog.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(to_canonical_string(self)?)
    }
}
