//! The .cpkg package container
//!
//! Layout: 4-byte magic `CPKG`, one format-version byte, a u32-LE manifest
//! length, the manifest JSON, then the payload. The manifest is parsed
//! eagerly on open; the payload is exposed as a lazy reader so hashing and
//! extraction never buffer the whole package in memory.

use crate::error::{CapstanError, CapstanResult};
use crate::package::manifest::PackageManifest;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File extension every cached artifact carries
pub const ARTIFACT_EXTENSION: &str = "cpkg";

const MAGIC: &[u8; 4] = b"CPKG";
const FORMAT_VERSION: u8 = 1;

/// Manifests above this size are rejected as corrupt rather than allocated
const MAX_MANIFEST_BYTES: u32 = 4 * 1024 * 1024;

/// A package file on disk with its parsed manifest.
///
/// Read-only once opened; cache entries are never mutated in place.
#[derive(Debug)]
pub struct LocalPackage {
    path: PathBuf,
    manifest: PackageManifest,
    payload_offset: u64,
}

impl LocalPackage {
    /// Open and validate a package file.
    ///
    /// Fails with `PackageFormat` on bad magic, an unknown format version,
    /// a truncated header or unparseable manifest JSON. Callers scanning a
    /// cache treat that as "not a match"; callers that just finished a
    /// download treat it as fatal.
    pub fn open(path: &Path) -> CapstanResult<Self> {
        let file = File::open(path)
            .map_err(|e| CapstanError::io(format!("opening package {}", path.display()), e))?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| CapstanError::format(path, format!("truncated header: {}", e)))?;
        if &magic != MAGIC {
            return Err(CapstanError::format(path, "bad magic, not a cpkg file"));
        }

        let mut version = [0u8; 1];
        reader
            .read_exact(&mut version)
            .map_err(|e| CapstanError::format(path, format!("truncated header: {}", e)))?;
        if version[0] != FORMAT_VERSION {
            return Err(CapstanError::format(
                path,
                format!("unsupported format version {}", version[0]),
            ));
        }

        let mut len_bytes = [0u8; 4];
        reader
            .read_exact(&mut len_bytes)
            .map_err(|e| CapstanError::format(path, format!("truncated header: {}", e)))?;
        let manifest_len = u32::from_le_bytes(len_bytes);
        if manifest_len == 0 || manifest_len > MAX_MANIFEST_BYTES {
            return Err(CapstanError::format(
                path,
                format!("implausible manifest length {}", manifest_len),
            ));
        }

        let mut manifest_bytes = vec![0u8; manifest_len as usize];
        reader
            .read_exact(&mut manifest_bytes)
            .map_err(|e| CapstanError::format(path, format!("truncated manifest: {}", e)))?;

        let manifest: PackageManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| CapstanError::format(path, format!("invalid manifest: {}", e)))?;

        let payload_offset = 4 + 1 + 4 + u64::from(manifest_len);
        Ok(Self {
            path: path.to_path_buf(),
            manifest,
            payload_offset,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// A fresh reader positioned at the start of the payload.
    ///
    /// Each call opens its own handle, so the handle is released as soon
    /// as the returned reader is dropped.
    pub fn content(&self) -> CapstanResult<impl Read> {
        let mut file = File::open(&self.path).map_err(|e| {
            CapstanError::io(format!("opening package payload {}", self.path.display()), e)
        })?;
        file.seek(SeekFrom::Start(self.payload_offset)).map_err(|e| {
            CapstanError::io(format!("seeking package payload {}", self.path.display()), e)
        })?;
        Ok(BufReader::new(file))
    }
}

/// Write a complete package file: header, manifest, payload.
///
/// Used by feed tooling and tests; the acquisition path itself only ever
/// reads packages.
pub fn write_package(
    path: &Path,
    manifest: &PackageManifest,
    payload: &[u8],
) -> CapstanResult<()> {
    let manifest_bytes = serde_json::to_vec(manifest)?;
    let manifest_len = u32::try_from(manifest_bytes.len())
        .map_err(|_| CapstanError::Internal("manifest exceeds u32 length".to_string()))?;

    let mut file = File::create(path)
        .map_err(|e| CapstanError::io(format!("creating package {}", path.display()), e))?;
    let mut write_all = || -> std::io::Result<()> {
        file.write_all(MAGIC)?;
        file.write_all(&[FORMAT_VERSION])?;
        file.write_all(&manifest_len.to_le_bytes())?;
        file.write_all(&manifest_bytes)?;
        file.write_all(payload)
    };
    write_all().map_err(|e| CapstanError::io(format!("writing package {}", path.display()), e))?;
    Ok(())
}
