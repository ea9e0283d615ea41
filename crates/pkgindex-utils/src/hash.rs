use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use sha2::{Digest, Sha256};

use crate::error::{HashError, HashResult};

/// Size of the chunks fed to the hasher.
pub const READ_SIZE: usize = 65536;

/// Computes the SHA-256 digest of everything readable from `reader`.
///
/// The input is consumed in [`READ_SIZE`] chunks, so memory use does not grow
/// with the size of the input. Returns the lowercase hex digest.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_SIZE];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculates the SHA-256 checksum of a file.
///
/// The file is streamed through the hasher and closed before returning, on
/// success and on error alike.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be opened or read.
///
/// # Example
///
/// ```no_run
/// use pkgindex_utils::error::HashResult;
/// use pkgindex_utils::hash::calculate_sha256;
///
/// fn main() -> HashResult<()> {
///     let checksum = calculate_sha256("artifacts/packages.json")?;
///     println!("Checksum is {}", checksum);
///     Ok(())
/// }
/// ```
pub fn calculate_sha256<P: AsRef<Path>>(file_path: P) -> HashResult<String> {
    let file_path = file_path.as_ref();
    let read_failed = |err| {
        HashError::ReadFailed {
            path: file_path.to_path_buf(),
            source: err,
        }
    };
    let file = File::open(file_path).map_err(read_failed)?;
    sha256_reader(file).map_err(read_failed)
}
