//! Package catalog management for pkgindex.
//!
//! This crate holds the data model shared by the two pipelines and the logic
//! that does not depend on where files come from or where updates go:
//!
//! - **Version ordering**: [`VersionKey`] turns a dotted version plus optional
//!   epoch into a totally ordered key.
//! - **Catalog merging**: [`Catalog::merge`] upserts freshly loaded
//!   [`PackageRecord`]s into an existing catalog by identifier, drops packages
//!   that disappeared, appends new ones and sorts every version list.
//! - **Change detection**: [`TrackedFileRecord::update`] rehashes a published
//!   artifact and records the new digest only when it differs.
//! - **Canonical JSON**: [`canonical::to_canonical_string`] writes documents
//!   with sorted keys and fixed indentation so reruns produce identical bytes.
//!
//! # Example
//!
//! ```no_run
//! use pkgindex_registry::{Catalog, PackageRecord};
//!
//! fn rebuild(existing: Catalog, loaded: Vec<PackageRecord>) -> pkgindex_registry::Result<String> {
//!     let (catalog, report) = existing.merge(loaded)?;
//!     println!("{} packages added", report.added);
//!     catalog.to_canonical_json()
//! }
//! ```

pub mod canonical;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod package;
pub mod version;

pub use catalog::{Catalog, MergeReport};
pub use descriptor::{Artifact, RepositoryDescriptor, TrackedFileRecord};
pub use error::{ErrorContext, RegistryError, Result};
pub use package::{PackageRecord, VersionEntry};
pub use version::{ComponentError, VersionKey, VersionParseError};
