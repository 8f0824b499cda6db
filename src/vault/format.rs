//! On-disk vault file format and atomic persistence.
//!
//! A vault file is pretty-printed JSON with stably ordered fields:
//!
//! ```text
//! {
//!   "version": 1,
//!   "salt": "<base64>",
//!   "key_check": "<base64>",
//!   "kdf": { "memory_kib": .., "iterations": .., "parallelism": .. },
//!   "created_at": "<RFC 3339>",
//!   "records": [ { "account", "nonce", "ciphertext", "tag" }, ... ]
//! }
//! ```
//!
//! Writes go to `.<name>.tmp` in the same directory, are fsynced, and
//! are then renamed over the target, so a reader never observes a
//! half-written vault.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::SecretRecord;
use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current vault file format version.
pub const CURRENT_VERSION: u8 = 1;

/// How many times the final rename is attempted before giving up.
const RENAME_ATTEMPTS: u32 = 3;

/// Pause between rename attempts.
const RENAME_BACKOFF: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// VaultFile
// ---------------------------------------------------------------------------

/// The serialized shape of a vault, field order as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    /// Format version.
    pub version: u8,

    /// The salt used for Argon2id key derivation (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Passphrase verifier (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub key_check: Vec<u8>,

    /// Argon2 params used at init (stored so unlock uses the same).
    pub kdf: Argon2Params,

    /// When this vault was initialized.
    pub created_at: DateTime<Utc>,

    /// Encrypted records in insertion order.
    pub records: Vec<SecretRecord>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read and parse a vault file.
///
/// A missing file is `VaultNotFound`; anything that is not a well-formed
/// vault of a known version is `CorruptStore`.  Semantic checks on the
/// parsed contents happen in `Vault::from_file`.
pub fn read_vault(path: &Path) -> Result<VaultFile> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(VaultError::VaultNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let file: VaultFile = serde_json::from_slice(&data)
        .map_err(|e| VaultError::CorruptStore(format!("vault JSON: {e}")))?;

    if file.version != CURRENT_VERSION {
        return Err(VaultError::CorruptStore(format!(
            "unsupported version {}, expected {CURRENT_VERSION}",
            file.version
        )));
    }

    Ok(file)
}

/// Write a vault file to disk **atomically**.
///
/// 1. Serialize to JSON.
/// 2. Write and fsync a temp file in the same directory.
/// 3. Rename the temp file over the target path.
pub fn write_vault(path: &Path, file: &VaultFile) -> Result<()> {
    let tmp_path = write_temp(path, file)?;
    commit_temp(&tmp_path, path)
}

/// Steps 1 and 2 of `write_vault`: returns the durable temp file path.
///
/// Until `commit_temp` runs, the file at `path` is untouched.
pub fn write_temp(path: &Path, file: &VaultFile) -> Result<PathBuf> {
    let buf = serde_json::to_vec_pretty(file)
        .map_err(|e| VaultError::CorruptStore(format!("cannot serialize vault: {e}")))?;

    let tmp_path = temp_path(path);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    // Owner-only read/write for the vault file and its temp sibling.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut tmp = options.open(&tmp_path)?;
    tmp.write_all(&buf)?;
    tmp.sync_all()?;

    Ok(tmp_path)
}

/// Step 3 of `write_vault`: move the temp file into place.
///
/// The rename is retried a bounded number of times on error; after the
/// last failure the temp file is removed and the error surfaced.
pub fn commit_temp(tmp_path: &Path, path: &Path) -> Result<()> {
    let mut attempt = 1;
    loop {
        match fs::rename(tmp_path, path) {
            Ok(()) => break,
            Err(e) if attempt < RENAME_ATTEMPTS => {
                tracing::warn!(
                    attempt,
                    error = %e,
                    path = %path.display(),
                    "vault rename failed, retrying"
                );
                attempt += 1;
                thread::sleep(RENAME_BACKOFF);
            }
            Err(e) => {
                let _ = fs::remove_file(tmp_path);
                return Err(e.into());
            }
        }
    }

    sync_parent_dir(path);
    Ok(())
}

/// The temp file used while persisting `path`: `.<name>.tmp` alongside it.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Make the rename itself durable. Best effort; not all platforms allow
/// opening a directory.
fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
