//! Pre-flight disk space check
//!
//! Runs before a real fetch, never before a cache hit. Both the threshold
//! and the global switch are configuration.

use crate::config::CacheConfig;
use crate::error::{CapstanError, CapstanResult};
use std::path::Path;
use tracing::debug;

/// Fail when the volume containing `dir` has less free space than the
/// configured minimum.
pub fn ensure_free_space(dir: &Path, config: &CacheConfig) -> CapstanResult<()> {
    if !config.verify_free_space {
        debug!("Free space check disabled by configuration");
        return Ok(());
    }

    let available = available_bytes(dir)?;
    debug!(
        "Free space on volume containing '{}': {} bytes",
        dir.display(),
        available
    );

    if available < config.min_free_bytes {
        return Err(CapstanError::InsufficientDiskSpace {
            path: dir.to_path_buf(),
            available,
            required: config.min_free_bytes,
        });
    }
    Ok(())
}

/// Bytes available to unprivileged writers on the volume containing `path`
#[cfg(unix)]
fn available_bytes(path: &Path) -> CapstanResult<u64> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| CapstanError::Internal(format!("path contains NUL: {}", path.display())))?;

    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(CapstanError::io(
            format!("statvfs on {}", path.display()),
            std::io::Error::last_os_error(),
        ));
    }

    // Field widths differ across unix targets
    #[allow(clippy::unnecessary_cast)]
    let available = stat.f_bavail as u64 * stat.f_frsize as u64;
    Ok(available)
}

#[cfg(not(unix))]
fn available_bytes(_path: &Path) -> CapstanResult<u64> {
    // No portable check here; the write itself will surface ENOSPC
    Ok(u64::MAX)
}
