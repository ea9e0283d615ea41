//! The update run: detect artifact changes and publish them.

use std::path::PathBuf;

use pkgindex_commit::{CommitApi, CommitReceipt};
use pkgindex_registry::{Artifact, RegistryError, RepositoryDescriptor};
use pkgindex_utils::fs::{read_first_line, write_atomic};
use tracing::{debug, info};

use crate::{
    error::{OperationError, Result},
    publish::{ChangeSet, PublishOutcome, Publisher},
    source::ArtifactSource,
};

/// Where the metadata revision quoted in the commit message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    Explicit(String),
    /// First line of a file written by the build job.
    File(PathBuf),
}

impl ReferenceSource {
    pub fn resolve(&self) -> Result<String> {
        match self {
            ReferenceSource::Explicit(reference) => Ok(reference.trim().to_string()),
            ReferenceSource::File(path) => {
                let line = read_first_line(path).map_err(|err| {
                    if err.is_not_found() {
                        OperationError::from(RegistryError::MissingInput {
                            path: path.clone(),
                        })
                    } else {
                        OperationError::from(err)
                    }
                })?;
                Ok(line.trim().to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Local copy of the published repository descriptor.
    pub descriptor: PathBuf,
    pub reference: ReferenceSource,
    /// Rewrite `descriptor` after a successful commit.
    pub write_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    Committed {
        receipt: CommitReceipt,
        changes: ChangeSet,
    },
}

/// Runs the change detector on every tracked artifact.
///
/// All artifacts must exist before any record is touched.
pub fn detect_changes<S: ArtifactSource>(
    descriptor: &mut RepositoryDescriptor,
    source: &S,
) -> Result<ChangeSet> {
    let mut located = Vec::with_capacity(Artifact::ALL.len());
    for artifact in Artifact::ALL {
        located.push((artifact, source.locate(artifact)?));
    }

    let mut changes = ChangeSet::default();
    for (artifact, path) in located {
        if descriptor.record_mut(artifact).update(&path)? {
            info!("{} changed: {}", artifact, descriptor.record(artifact).sha256);
            changes.mark(artifact);
        } else {
            debug!("{} unchanged", artifact);
        }
    }

    Ok(changes)
}

/// Detects changes to the tracked artifacts and publishes them.
///
/// The reference is only resolved once something changed, and the local
/// descriptor is only rewritten after the commit succeeded.
pub fn run_update<S, C>(
    options: &UpdateOptions,
    publisher: &Publisher<C>,
    source: &S,
) -> Result<UpdateOutcome>
where
    S: ArtifactSource,
    C: CommitApi,
{
    let mut descriptor = RepositoryDescriptor::load(&options.descriptor)?;

    let changes = detect_changes(&mut descriptor, source)?;
    if changes.is_empty() {
        return Ok(UpdateOutcome::Unchanged);
    }

    let reference = options.reference.resolve()?;
    debug!("Metadata reference: {}", reference);

    let receipt = match publisher.publish(&mut descriptor, changes, source, &reference)? {
        PublishOutcome::Committed(receipt) => receipt,
        PublishOutcome::Unchanged => return Ok(UpdateOutcome::Unchanged),
    };

    if options.write_back {
        let content = descriptor.to_canonical_json()?;
        write_atomic(&options.descriptor, content.as_bytes())?;
        info!("Updated {}", options.descriptor.display());
    }

    Ok(UpdateOutcome::Committed {
        receipt,
        changes,
    })
}
