//! Atomic file writes and JSON load/save shared by the pipeline stages.
//!
//! Every producer of the artifact writes to a `.tmp` sibling and renames
//! into place, so a killed process never leaves a truncated artifact at
//! the path the mobile app build reads.

use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Atomically write JSON data to a file.
///
/// Serializes `data` to pretty-printed JSON, writes to a `.tmp` sibling
/// file, then renames to the target path. Creates parent directories if
/// they don't exist.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    atomic_write(path, json.as_bytes())
}

/// Atomically write raw bytes to a file.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load and deserialize JSON from a file.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let value =
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}

/// Hex-encoded SHA-256 digest of a byte slice, logged alongside every
/// written artifact.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
