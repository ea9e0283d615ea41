use std::{error::Error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum HashError {
    ReadFailed {
        path: PathBuf,
        source: io::Error,
    },
}

impl HashError {
    /// Returns `true` when the hashed file does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            HashError::ReadFailed { source, .. } => source.kind() == io::ErrorKind::NotFound,
        }
    }
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::ReadFailed { path, source } => {
                write!(f, "Failed to read file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for HashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HashError::ReadFailed { source, .. } => Some(source),
        }
    }
}

#[derive(Debug)]
pub enum FileSystemError {
    File {
        path: PathBuf,
        action: &'static str,
        source: io::Error,
    },

    Directory {
        path: PathBuf,
        action: &'static str,
        source: io::Error,
    },

    NotADirectory {
        path: PathBuf,
    },
}

impl FileSystemError {
    /// Returns `true` when the underlying I/O failure was a missing path.
    pub fn is_not_found(&self) -> bool {
        match self {
            FileSystemError::File { source, .. } | FileSystemError::Directory { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            FileSystemError::NotADirectory { .. } => false,
        }
    }
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::File {
                path,
                action,
                source,
            } => {
                write!(f, "Failed to {action} file `{}`: {source}", path.display())
            }
            FileSystemError::Directory {
                path,
                action,
                source,
            } => {
                write!(
                    f,
                    "Failed to {action} directory `{}`: {source}",
                    path.display()
                )
            }
            FileSystemError::NotADirectory { path } => {
                write!(f, "`{}` is not a directory", path.display())
            }
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FileSystemError::File { source, .. } => Some(source),
            FileSystemError::Directory { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;
pub type HashResult<T> = std::result::Result<T, HashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_error_display_and_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = HashError::ReadFailed {
            path: PathBuf::from("/test"),
            source: io_error,
        };
        assert_eq!(
            error.to_string(),
            "Failed to read file `/test`: file not found"
        );
        assert!(error.source().is_some());
        assert!(error.is_not_found());
    }

    #[test]
    fn test_hash_error_other_kind_is_not_missing() {
        let error = HashError::ReadFailed {
            path: PathBuf::from("/test"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_file_system_error_display_and_source() {
        let file_error = FileSystemError::File {
            path: PathBuf::from("/file"),
            action: "read",
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            file_error.to_string(),
            "Failed to read file `/file`: permission denied"
        );
        assert!(file_error.source().is_some());
        assert!(!file_error.is_not_found());

        let dir_error = FileSystemError::Directory {
            path: PathBuf::from("/dir"),
            action: "list",
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(
            dir_error.to_string(),
            "Failed to list directory `/dir`: missing"
        );
        assert!(dir_error.is_not_found());

        let not_a_dir_error = FileSystemError::NotADirectory {
            path: PathBuf::from("/path"),
        };
        assert_eq!(not_a_dir_error.to_string(), "`/path` is not a directory");
        assert!(not_a_dir_error.source().is_none());
    }
}
