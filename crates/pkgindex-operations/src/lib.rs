pub mod build;
pub mod error;
pub mod publish;
pub mod source;
pub mod update;

#[cfg(test)]
pub(crate) mod test_utils;

pub use build::{build_catalog, discover_packages, BuildOptions, BuildReport};
pub use error::{OperationError, Result};
pub use publish::{commit_message, ChangeSet, PublishOutcome, Publisher};
pub use source::{ArtifactDir, ArtifactSource};
pub use update::{detect_changes, run_update, ReferenceSource, UpdateOptions, UpdateOutcome};
