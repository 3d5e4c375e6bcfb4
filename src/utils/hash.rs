use crate::error::{RegistryError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Size of the read buffer used when streaming a file through the hasher.
const BUFFER_SIZE: usize = 65536;

/// Content identity of a file: SHA-256 digest and byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Lowercase hex SHA-256 digest
    pub checksum: String,
    /// Number of bytes hashed
    pub size: u64,
}

/// SHA-256 of an in-memory buffer as lowercase hex.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Streams a file through SHA-256 and returns its checksum and length.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> Result<FileDigest> {
    let mut file = File::open(path).map_err(|e| RegistryError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| RegistryError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        size += bytes_read as u64;
    }

    let checksum = hex::encode(hasher.finalize());
    tracing::debug!(path = %path.display(), %checksum, size, "hashed file");
    Ok(FileDigest { checksum, size })
}
