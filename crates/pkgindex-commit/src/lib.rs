//! Commit submission for pkgindex.
//!
//! A publish is a single multi-file commit described by a [`CommitRequest`].
//! Where that commit lands is decided by the [`CommitApi`] implementation:
//!
//! - [`GitlabCommitApi`] posts it to a hosted repository's commits endpoint.
//! - [`WorkdirCommitApi`] applies it to a local checkout.

pub mod api;
pub mod error;
pub mod gitlab;
pub mod http_client;
pub mod types;
pub mod workdir;

pub use api::CommitApi;
pub use error::{CommitError, Result};
pub use gitlab::GitlabCommitApi;
pub use http_client::ClientConfig;
pub use types::{ActionKind, CommitReceipt, CommitRequest, Encoding, FileAction};
pub use workdir::WorkdirCommitApi;
