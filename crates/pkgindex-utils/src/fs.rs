use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| {
            FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "create",
                source: err,
            }
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Lists the names of the immediate subdirectories of `path`, sorted
/// lexicographically.
///
/// Regular files and symlinks to files are skipped. Entries whose names are not
/// valid UTF-8 are converted lossily.
///
/// # Errors
///
/// * [`FileSystemError::NotADirectory`] if `path` is not a directory.
/// * [`FileSystemError::Directory`] if the directory cannot be read.
pub fn list_subdirectories<P: AsRef<Path>>(path: P) -> FileSystemResult<Vec<String>> {
    let path = path.as_ref();
    let dir_error = |err| {
        FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "list",
            source: err,
        }
    };

    if path.exists() && !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(path).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    Ok(names)
}

/// Writes `content` to `path` without ever leaving a half-written file behind.
///
/// The bytes go to a `.part` sibling first which is then renamed over the
/// destination. Missing parent directories are created.
pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> FileSystemResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }

    let part_path = part_path(path);
    fs::write(&part_path, content).map_err(|err| {
        FileSystemError::File {
            path: part_path.clone(),
            action: "write",
            source: err,
        }
    })?;

    fs::rename(&part_path, path).map_err(|err| {
        let _ = fs::remove_file(&part_path);
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "replace",
            source: err,
        }
    })
}

/// Path of the temporary sibling used by [`write_atomic`].
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Returns the modification time of `path` as whole seconds since the Unix
/// epoch. Sub-second precision is truncated.
pub fn modified_timestamp<P: AsRef<Path>>(path: P) -> FileSystemResult<i64> {
    let path = path.as_ref();
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|err| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "stat",
                source: err,
            }
        })?;

    let seconds = match modified.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(before_epoch) => -(before_epoch.duration().as_secs() as i64),
    };
    Ok(seconds)
}

/// Reads the first line of a text file, without its line terminator.
pub fn read_first_line<P: AsRef<Path>>(path: P) -> FileSystemResult<String> {
    let path = path.as_ref();
    let read_error = |err| {
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "read",
            source: err,
        }
    };

    let file = fs::File::open(path).map_err(read_error)?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(read_error)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
