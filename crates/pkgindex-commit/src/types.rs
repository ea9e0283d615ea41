use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::error::{CommitError, Result};

/// What a file action does to its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Update,
}

/// How an action's `content` is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Text,
    Base64,
}

impl Encoding {
    fn is_text(&self) -> bool {
        *self == Encoding::Text
    }
}

/// One file replacement within a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAction {
    pub action: ActionKind,
    pub file_path: String,
    pub content: String,
    #[serde(skip_serializing_if = "Encoding::is_text")]
    pub encoding: Encoding,
}

impl FileAction {
    /// Replaces `file_path` with plain text content.
    pub fn update_text(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: ActionKind::Update,
            file_path: file_path.into(),
            content: content.into(),
            encoding: Encoding::Text,
        }
    }

    /// Replaces `file_path` with raw bytes, carried base64-encoded.
    pub fn update_binary(file_path: impl Into<String>, content: &[u8]) -> Self {
        Self {
            action: ActionKind::Update,
            file_path: file_path.into(),
            content: STANDARD.encode(content),
            encoding: Encoding::Base64,
        }
    }

    /// The bytes this action writes.
    pub fn decoded_content(&self) -> Result<Vec<u8>> {
        match self.encoding {
            Encoding::Text => Ok(self.content.as_bytes().to_vec()),
            Encoding::Base64 => {
                STANDARD.decode(&self.content).map_err(|err| {
                    CommitError::InvalidBase64 {
                        path: self.file_path.clone(),
                        source: err,
                    }
                })
            }
        }
    }
}

/// A single atomic multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRequest {
    pub branch: String,
    pub author_email: String,
    pub author_name: String,
    pub commit_message: String,
    pub actions: Vec<FileAction>,
}

/// Where an applied commit can be looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Web-viewable URL or local path of the result.
    pub reference: String,
    /// Commit id, when the backend reports one.
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_text_action_wire_format() {
        let action = FileAction::update_text("repository.json", "{}\n");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "action": "update",
                "file_path": "repository.json",
                "content": "{}\n"
            })
        );
    }

    #[test]
    fn test_binary_action_wire_format() {
        let action = FileAction::update_binary("packages.json", b"hello");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "action": "update",
                "file_path": "packages.json",
                "content": "aGVsbG8=",
                "encoding": "base64"
            })
        );
        assert_eq!(action.decoded_content().unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_base64() {
        let action = FileAction {
            encoding: Encoding::Base64,
            ..FileAction::update_text("packages.json", "not base64!")
        };
        assert!(matches!(
            action.decoded_content(),
            Err(CommitError::InvalidBase64 { .. })
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request = CommitRequest {
            branch: "main".into(),
            author_email: "bot@example.com".into(),
            author_name: "Bot".into(),
            commit_message: "msg".into(),
            actions: vec![FileAction::update_text("a", "b")],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["branch"], "main");
        assert_eq!(value["author_email"], "bot@example.com");
        assert_eq!(value["author_name"], "Bot");
        assert_eq!(value["commit_message"], "msg");
        assert_eq!(value["actions"].as_array().unwrap().len(), 1);
    }
}
