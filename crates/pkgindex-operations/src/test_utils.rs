use std::{cell::RefCell, fs, path::Path};

use pkgindex_commit::{CommitApi, CommitError, CommitReceipt, CommitRequest};
use pkgindex_config::config::Config;
use serde_json::Value;

/// Writes `<root>/packages/<dir>/metadata.json`.
pub fn write_metadata(root: &Path, dir: &str, value: Value) {
    let package_dir = root.join("packages").join(dir);
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(package_dir.join("metadata.json"), value.to_string()).unwrap();
}

pub fn test_config() -> Config {
    Config::from_toml_str(
        r#"
        project_url = "https://gitlab.example.com/group/index"
        branch = "main"
        author_name = "Index Bot"
        author_email = "bot@example.com"
        "#,
        |_| None,
    )
    .unwrap()
}

/// Records every submitted request and answers with a fixed receipt, or fails
/// when built with [`FakeCommitApi::failing`].
#[derive(Default)]
pub struct FakeCommitApi {
    pub requests: RefCell<Vec<CommitRequest>>,
    fail: bool,
}

impl FakeCommitApi {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl CommitApi for FakeCommitApi {
    fn commit(&self, request: &CommitRequest) -> pkgindex_commit::Result<CommitReceipt> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail {
            return Err(CommitError::HttpError {
                status: 500,
                message: "500 Internal Server Error".to_string(),
            });
        }
        Ok(CommitReceipt {
            reference: "https://gitlab.example.com/group/index/-/commit/abc123".to_string(),
            id: Some("abc123".to_string()),
        })
    }
}
