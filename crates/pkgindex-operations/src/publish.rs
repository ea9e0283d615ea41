//! Assembling and submitting the index update commit.

use pkgindex_commit::{CommitApi, CommitReceipt, CommitRequest, FileAction};
use pkgindex_config::config::Config;
use pkgindex_registry::{Artifact, RepositoryDescriptor};
use tracing::{debug, info};

use crate::{error::Result, source::ArtifactSource};

/// Path of the descriptor inside the index repository.
pub const DESCRIPTOR_FILE_NAME: &str = "repository.json";

pub const COMMIT_TITLE: &str = "Update package index from metadata repository";

/// Commit message naming the metadata revision the index was built from.
pub fn commit_message(reference: &str) -> String {
    format!("{COMMIT_TITLE}\n\nMetadata repo commit {reference}")
}

/// Which tracked artifacts changed in this run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub packages: bool,
    pub resources: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        !self.packages && !self.resources
    }

    pub fn contains(&self, artifact: Artifact) -> bool {
        match artifact {
            Artifact::Packages => self.packages,
            Artifact::Resources => self.resources,
        }
    }

    pub fn mark(&mut self, artifact: Artifact) {
        match artifact {
            Artifact::Packages => self.packages = true,
            Artifact::Resources => self.resources = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing changed; no commit was submitted.
    Unchanged,
    Committed(CommitReceipt),
}

/// Builds update commits and hands them to a [`CommitApi`].
pub struct Publisher<C> {
    config: Config,
    api: C,
}

impl<C: CommitApi> Publisher<C> {
    pub fn new(config: Config, api: C) -> Self {
        Self {
            config,
            api,
        }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    fn artifact_url(&self, artifact: Artifact) -> String {
        match artifact {
            Artifact::Packages => self.config.packages_url(),
            Artifact::Resources => self.config.resources_url(),
        }
    }

    /// Refreshes the urls of changed records and builds the commit for them.
    ///
    /// Returns `None` when nothing changed. The descriptor is always the first
    /// action; the catalog follows, base64-encoded, only when its digest
    /// changed. A changed resource bundle is recorded in the descriptor but is
    /// not part of the commit.
    pub fn prepare<S: ArtifactSource>(
        &self,
        descriptor: &mut RepositoryDescriptor,
        changes: ChangeSet,
        source: &S,
        reference: &str,
    ) -> Result<Option<CommitRequest>> {
        if changes.is_empty() {
            return Ok(None);
        }

        for artifact in Artifact::ALL {
            if changes.contains(artifact) {
                let url = self.artifact_url(artifact);
                debug!("Publishing {} at {}", artifact, url);
                descriptor.record_mut(artifact).url = url;
            }
        }

        let mut actions = vec![FileAction::update_text(
            DESCRIPTOR_FILE_NAME,
            descriptor.to_canonical_json()?,
        )];
        if changes.packages {
            let catalog = source.read(Artifact::Packages)?;
            actions.push(FileAction::update_binary(
                Artifact::Packages.file_name(),
                &catalog,
            ));
        }

        Ok(Some(CommitRequest {
            branch: self.config.branch.clone(),
            author_email: self.config.author_email.clone(),
            author_name: self.config.author_name.clone(),
            commit_message: commit_message(reference),
            actions,
        }))
    }

    /// Prepares and submits the update commit, if anything changed.
    pub fn publish<S: ArtifactSource>(
        &self,
        descriptor: &mut RepositoryDescriptor,
        changes: ChangeSet,
        source: &S,
        reference: &str,
    ) -> Result<PublishOutcome> {
        let Some(request) = self.prepare(descriptor, changes, source, reference)? else {
            return Ok(PublishOutcome::Unchanged);
        };

        let receipt = self.api.commit(&request)?;
        info!("Committed package index update: {}", receipt.reference);
        Ok(PublishOutcome::Committed(receipt))
    }
}
