//! Content hashing for fetched artifacts

use crate::error::{CapstanError, CapstanResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// SHA-256 over the full file content, hex-encoded.
///
/// The file is streamed once start to end; the handle closes on every
/// exit path when it drops.
pub fn hash_file(path: &Path) -> CapstanResult<String> {
    let mut file = File::open(path)
        .map_err(|e| CapstanError::io(format!("opening {} for hashing", path.display()), e))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| CapstanError::io(format!("hashing {}", path.display()), e))?;

    Ok(hex::encode(hasher.finalize()))
}

/// Size of a file in bytes
pub fn file_size(path: &Path) -> CapstanResult<u64> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CapstanError::io(format!("reading metadata of {}", path.display()), e))?;
    Ok(metadata.len())
}
