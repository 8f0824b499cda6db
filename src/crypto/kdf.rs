//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Parameters are configurable via `Argon2Params`
//! (loaded from `.pwvault.toml` or sensible defaults) and are stored in
//! the vault file so unlock re-derives with exactly the same cost.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};

use super::keys::DerivedKey;
use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Upper bounds on stored costs, so a tampered vault file cannot make
/// unlock allocate without limit or run forever.
const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;
const MAX_ITERATIONS: u32 = 64;
const MAX_PARALLELISM: u32 = 64;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings` and to the `kdf` object
/// persisted in the vault file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// The cheapest parameters `derive` accepts. Meant for tests.
    pub fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Reject dangerously weak or unreasonably expensive settings.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.memory_kib) {
            return Err(VaultError::InvalidInput(format!(
                "Argon2 memory_kib must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(VaultError::InvalidInput(format!(
                "Argon2 iterations must be between 1 and {MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(VaultError::InvalidInput(format!(
                "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive the session key from a passphrase and salt using Argon2id.
///
/// The same passphrase + salt + params always produce the same key.
/// An empty passphrase or a salt that is not exactly `SALT_LEN` bytes
/// is rejected with `InvalidInput`.
pub fn derive(passphrase: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(VaultError::InvalidInput(
            "master passphrase cannot be empty".into(),
        ));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::InvalidInput(format!(
            "salt must be exactly {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    argon2_params.validate()?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::InvalidInput(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = DerivedKey::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase, salt, key.as_mut_bytes())
        .map_err(|e| VaultError::InvalidInput(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Check a passphrase against the stored key check.
///
/// Only the boolean outcome leaves this function; the derived key is
/// dropped (and zeroized) before returning.
pub fn verify(
    passphrase: &[u8],
    salt: &[u8],
    key_check: &[u8],
    argon2_params: &Argon2Params,
) -> Result<bool> {
    let key = derive(passphrase, salt, argon2_params)?;
    key.verify_key_check(salt, key_check)
}

/// Generate a cryptographically random 32-byte salt from the OS RNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| VaultError::Io(std::io::Error::other(format!("OS RNG unavailable: {e}"))))?;
    Ok(salt)
}
