use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use pkgindex_utils::{
    error::FileSystemError,
    fs::{ensure_dir_exists, part_path},
};
use tracing::{debug, info, warn};

use crate::{
    api::CommitApi,
    error::{CommitError, Result},
    types::{CommitReceipt, CommitRequest},
};

/// Applies commits directly to a local checkout.
///
/// Every action is staged to a `.part` file before any destination is
/// replaced, so a decoding or write failure leaves the checkout as it was.
/// If a rename fails, files already replaced keep their new content and the
/// remaining `.part` files are removed.
#[derive(Debug, Clone)]
pub struct WorkdirCommitApi {
    root: PathBuf,
}

impl WorkdirCommitApi {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
        }
    }

    fn resolve(&self, file_path: &str) -> Result<PathBuf> {
        let relative = Path::new(file_path);
        let is_safe = !file_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_safe {
            return Err(CommitError::InvalidPath(file_path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl CommitApi for WorkdirCommitApi {
    fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        info!(
            "Applying {} file(s) to {}",
            request.actions.len(),
            self.root.display()
        );

        let mut staged = Vec::with_capacity(request.actions.len());
        for action in &request.actions {
            let target = self.resolve(&action.file_path)?;
            let content = action.decoded_content()?;
            staged.push((target, content));
        }

        for (target, _) in &staged {
            if let Some(parent) = target.parent() {
                ensure_dir_exists(parent)?;
            }
        }

        let mut written: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(staged.len());
        for (target, content) in staged {
            let part = part_path(&target);
            if let Err(err) = fs::write(&part, &content) {
                discard_parts(&written);
                return Err(FileSystemError::File {
                    path: part,
                    action: "write",
                    source: err,
                }
                .into());
            }
            written.push((part, target));
        }

        for (idx, (part, target)) in written.iter().enumerate() {
            debug!("Replacing {}", target.display());
            if let Err(err) = fs::rename(part, target) {
                discard_parts(&written[idx..]);
                return Err(FileSystemError::File {
                    path: target.clone(),
                    action: "replace",
                    source: err,
                }
                .into());
            }
        }

        Ok(CommitReceipt {
            reference: self.root.display().to_string(),
            id: None,
        })
    }
}

fn discard_parts(parts: &[(PathBuf, PathBuf)]) {
    for (part, _) in parts {
        if let Err(err) = fs::remove_file(part) {
            warn!("Failed to remove {}: {}", part.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::{Encoding, FileAction};

    fn request(actions: Vec<FileAction>) -> CommitRequest {
        CommitRequest {
            branch: "main".into(),
            author_email: "bot@example.com".into(),
            author_name: "Bot".into(),
            commit_message: "Update".into(),
            actions,
        }
    }

    #[test]
    fn test_applies_text_and_binary_actions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("repository.json"), "old").unwrap();

        let api = WorkdirCommitApi::new(dir.path());
        let receipt = api
            .commit(&request(vec![
                FileAction::update_text("repository.json", "{}\n"),
                FileAction::update_binary("nested/packages.json", b"\x00\x01data"),
            ]))
            .unwrap();

        assert_eq!(receipt.reference, dir.path().display().to_string());
        assert_eq!(
            fs::read_to_string(dir.path().join("repository.json")).unwrap(),
            "{}\n"
        );
        assert_eq!(
            fs::read(dir.path().join("nested/packages.json")).unwrap(),
            b"\x00\x01data"
        );
        assert!(!dir.path().join("repository.json.part").exists());
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let api = WorkdirCommitApi::new(dir.path());

        for path in ["../outside.json", "/etc/passwd", "a/../../b", ""] {
            let err = api
                .commit(&request(vec![FileAction::update_text(path, "x")]))
                .unwrap_err();
            assert!(matches!(err, CommitError::InvalidPath(_)), "{path}");
        }
    }

    #[test]
    fn test_bad_action_leaves_checkout_untouched() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("repository.json"), "old").unwrap();

        let broken = FileAction {
            encoding: Encoding::Base64,
            ..FileAction::update_text("packages.json", "***")
        };
        let api = WorkdirCommitApi::new(dir.path());
        let err = api
            .commit(&request(vec![
                FileAction::update_text("repository.json", "new"),
                broken,
            ]))
            .unwrap_err();

        assert!(matches!(err, CommitError::InvalidBase64 { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join("repository.json")).unwrap(),
            "old"
        );
        assert!(!dir.path().join("packages.json").exists());
    }

    #[test]
    fn test_blocked_parent_leaves_no_part_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("repository.json"), "old").unwrap();
        fs::write(dir.path().join("blocker"), "regular file").unwrap();

        let api = WorkdirCommitApi::new(dir.path());
        let err = api
            .commit(&request(vec![
                FileAction::update_text("repository.json", "new"),
                FileAction::update_text("blocker/packages.json", "{}"),
            ]))
            .unwrap_err();

        assert!(matches!(err, CommitError::FileSystem(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("repository.json")).unwrap(),
            "old"
        );
        assert!(!dir.path().join("repository.json.part").exists());
    }

    #[test]
    fn test_failed_write_discards_staged_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("repository.json"), "old").unwrap();
        fs::create_dir(dir.path().join("packages.json.part")).unwrap();

        let api = WorkdirCommitApi::new(dir.path());
        let err = api
            .commit(&request(vec![
                FileAction::update_text("repository.json", "new"),
                FileAction::update_text("packages.json", "{}"),
            ]))
            .unwrap_err();

        assert!(matches!(err, CommitError::FileSystem(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("repository.json")).unwrap(),
            "old"
        );
        assert!(!dir.path().join("repository.json.part").exists());
    }

    #[test]
    fn test_failed_rename_discards_remaining_parts() {
        let dir = tempdir().unwrap();
        let occupied = dir.path().join("packages.json");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("keep"), "x").unwrap();

        let api = WorkdirCommitApi::new(dir.path());
        let err = api
            .commit(&request(vec![
                FileAction::update_text("packages.json", "{}"),
                FileAction::update_text("repository.json", "new"),
            ]))
            .unwrap_err();

        assert!(matches!(err, CommitError::FileSystem(_)));
        assert!(!dir.path().join("packages.json.part").exists());
        assert!(!dir.path().join("repository.json.part").exists());
        assert!(!dir.path().join("repository.json").exists());
    }
}
