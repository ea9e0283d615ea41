use miette::Diagnostic;
use pkgindex_utils::error::FileSystemError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CommitError {
    #[error("Failed to reach the commit API at {url}")]
    #[diagnostic(
        code(pkgindex_commit::transport),
        help("Check your network connection and the configured API address")
    )]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Commit API answered HTTP {status}: {message}")]
    #[diagnostic(
        code(pkgindex_commit::http_error),
        help("Check that the token is valid and may push to the target branch")
    )]
    HttpError { status: u16, message: String },

    #[error("Invalid response from commit API: {reason}")]
    #[diagnostic(code(pkgindex_commit::response_decode))]
    ResponseDecode { reason: String },

    #[error("Invalid base64 content for {path}")]
    #[diagnostic(code(pkgindex_commit::invalid_base64))]
    InvalidBase64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Refusing to write outside the repository: {0}")]
    #[diagnostic(
        code(pkgindex_commit::invalid_path),
        help("Action paths must be relative and must not contain `..`")
    )]
    InvalidPath(String),

    #[error(transparent)]
    #[diagnostic(code(pkgindex_commit::fs))]
    FileSystem(#[from] FileSystemError),
}

pub type Result<T> = std::result::Result<T, CommitError>;

impl CommitError {
    pub fn transport(url: impl Into<String>, source: ureq::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }
}
