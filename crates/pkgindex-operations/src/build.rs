//! Catalog build from a metadata checkout.

use std::path::{Path, PathBuf};

use pkgindex_registry::{
    package::METADATA_FILE_NAME, Catalog, MergeReport, PackageRecord, RegistryError,
};
use pkgindex_utils::fs::{list_subdirectories, write_atomic};
use tracing::{debug, info, warn};

use crate::error::{OperationError, Result};

/// Subdirectory of the metadata root holding one directory per package.
pub const PACKAGES_DIR: &str = "packages";

/// Inputs of a catalog build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Checkout of the metadata repository.
    pub metadata_root: PathBuf,
    /// Previously published catalog.
    pub catalog: PathBuf,
    /// Where the new catalog is written.
    pub output: PathBuf,
}

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub merge: MergeReport,
    /// Number of packages in the written catalog.
    pub total: usize,
    pub output: PathBuf,
}

/// Loads every `<metadata_root>/packages/<dir>/metadata.json`, in
/// lexicographic directory order.
///
/// Any unreadable or invalid record aborts the whole discovery.
pub fn discover_packages<P: AsRef<Path>>(metadata_root: P) -> Result<Vec<PackageRecord>> {
    let packages_dir = metadata_root.as_ref().join(PACKAGES_DIR);
    debug!("Discovering packages in {}", packages_dir.display());

    let names = list_subdirectories(&packages_dir).map_err(|err| {
        if err.is_not_found() {
            OperationError::from(RegistryError::MissingInput {
                path: packages_dir.clone(),
            })
        } else {
            OperationError::from(err)
        }
    })?;

    let mut records = Vec::with_capacity(names.len());
    for name in names {
        let path = packages_dir.join(&name).join(METADATA_FILE_NAME);
        let record = PackageRecord::load(&path)?;
        if record.identifier != name {
            debug!("Directory {} declares package {}", name, record.identifier);
        }
        records.push(record);
    }

    Ok(records)
}

/// Rebuilds the catalog from the metadata checkout and writes it to
/// `options.output`.
///
/// A missing previous catalog is treated as empty. Nothing is written if any
/// record fails to load or any version fails to parse.
pub fn build_catalog(options: &BuildOptions) -> Result<BuildReport> {
    let existing = match Catalog::load(&options.catalog) {
        Ok(catalog) => catalog,
        Err(RegistryError::MissingInput {
            path,
        }) => {
            warn!(
                "No previous catalog at {}; starting from an empty one",
                path.display()
            );
            Catalog::default()
        }
        Err(err) => return Err(err.into()),
    };

    let incoming = discover_packages(&options.metadata_root)?;
    info!("Loaded {} package record(s)", incoming.len());

    let (catalog, merge) = existing.merge(incoming)?;
    let content = catalog.to_canonical_json()?;
    write_atomic(&options.output, content.as_bytes())?;

    info!(
        "Wrote {} package(s) to {}: {} updated, {} unchanged, {} added, {} removed",
        catalog.packages.len(),
        options.output.display(),
        merge.updated,
        merge.unchanged,
        merge.added,
        merge.removed.len()
    );
    for identifier in &merge.removed {
        info!("Removed package {}", identifier);
    }

    Ok(BuildReport {
        total: catalog.packages.len(),
        merge,
        output: options.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::write_metadata;

    #[test]
    fn test_discover_in_lexicographic_order() {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), "zeta", json!({"identifier": "z", "versions": []}));
        write_metadata(dir.path(), "alpha", json!({"identifier": "a", "versions": []}));
        fs::write(dir.path().join("packages/README.md"), "not a package").unwrap();

        let records = discover_packages(dir.path()).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[test]
    fn test_discover_missing_packages_dir() {
        let dir = tempdir().unwrap();
        let err = discover_packages(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Registry(RegistryError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_discover_directory_without_metadata() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages/empty")).unwrap();
        let err = discover_packages(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Registry(RegistryError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_build_catalog_end_to_end() {
        let dir = tempdir().unwrap();
        let metadata = dir.path().join("metadata");
        write_metadata(
            &metadata,
            "b",
            json!({
                "identifier": "B",
                "name": "Bee",
                "versions": [{"version": "1.0.0"}, {"version": "2.0.0"}, {"version": "1.5.0"}]
            }),
        );
        write_metadata(&metadata, "c", json!({"identifier": "C", "versions": [{"version": "0.1"}]}));

        let catalog = dir.path().join("packages.json");
        fs::write(
            &catalog,
            json!({"packages": [
                {"identifier": "A", "versions": []},
                {"identifier": "B", "description": "old", "versions": []}
            ]})
            .to_string(),
        )
        .unwrap();

        let options = BuildOptions {
            metadata_root: metadata,
            catalog,
            output: dir.path().join("artifacts/packages.json"),
        };
        let report = build_catalog(&options).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.merge.updated, 1);
        assert_eq!(report.merge.added, 1);
        assert_eq!(report.merge.removed, vec!["A".to_string()]);

        let written = fs::read_to_string(&options.output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["packages"][0]["identifier"], "B");
        assert!(value["packages"][0].get("description").is_none());
        assert_eq!(value["packages"][0]["versions"][0]["version"], "2.0.0");
        assert_eq!(value["packages"][1]["identifier"], "C");
        assert!(written.ends_with("}\n"));

        let again = build_catalog(&BuildOptions {
            catalog: options.output.clone(),
            ..options.clone()
        })
        .unwrap();
        assert_eq!(again.merge.updated, 0);
        assert_eq!(fs::read_to_string(&options.output).unwrap(), written);
    }

    #[test]
    fn test_build_without_previous_catalog() {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), "a", json!({"identifier": "A", "versions": []}));

        let report = build_catalog(&BuildOptions {
            metadata_root: dir.path().to_path_buf(),
            catalog: dir.path().join("missing.json"),
            output: dir.path().join("out.json"),
        })
        .unwrap();
        assert_eq!(report.merge.added, 1);
    }

    #[test]
    fn test_malformed_version_writes_nothing() {
        let dir = tempdir().unwrap();
        write_metadata(
            dir.path(),
            "a",
            json!({"identifier": "A", "versions": [{"version": "1.beta"}]}),
        );
        let output = dir.path().join("out.json");

        let err = build_catalog(&BuildOptions {
            metadata_root: dir.path().to_path_buf(),
            catalog: dir.path().join("missing.json"),
            output: output.clone(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            OperationError::Registry(RegistryError::MalformedVersion { .. })
        ));
        assert!(!output.exists());
    }
}
