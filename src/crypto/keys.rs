//! Session key material and the sub-keys expanded from it.
//!
//! From the Argon2id output (`DerivedKey`) we derive, with HKDF-SHA256:
//! - the **record key** used by AES-256-GCM for every secret record;
//! - the **key-check key** used to compute the vault's `key_check`
//!   value, so a passphrase can be verified without storing the key.
//!
//! HKDF (RFC 5869) uses the derived key as input keying material and a
//! context string (`info`) to produce independent sub-keys.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use super::kdf::KEY_LEN;
use crate::errors::{Result, VaultError};

const RECORD_KEY_INFO: &[u8] = b"pwvault-record-key";
const KEY_CHECK_INFO: &[u8] = b"pwvault-key-check";

/// Domain prefix for the key-check MAC input.
const KEY_CHECK_DOMAIN: &[u8] = b"pwvault-key-check-v1";

/// A 32-byte key derived from the master passphrase.
///
/// Lives only in memory for the duration of an unlocked session and is
/// zeroed when dropped.  Deliberately not `Clone` or `Debug`.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    /// Expand the AES-256-GCM key used for secret records.
    pub fn record_key(&self) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        hkdf_derive(&self.bytes, RECORD_KEY_INFO)
    }

    /// Compute the key-check value stored in the vault file.
    pub fn key_check(&self, salt: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key_check_mac(salt)?.finalize().into_bytes().to_vec())
    }

    /// Constant-time comparison of this key against a stored key check.
    pub fn verify_key_check(&self, salt: &[u8], expected: &[u8]) -> Result<bool> {
        Ok(self.key_check_mac(salt)?.verify_slice(expected).is_ok())
    }

    fn key_check_mac(&self, salt: &[u8]) -> Result<Hmac<Sha256>> {
        let check_key = hkdf_derive(&self.bytes, KEY_CHECK_INFO)?;
        let mut mac = Hmac::<Sha256>::new_from_slice(&*check_key)
            .map_err(|e| VaultError::InvalidInput(format!("invalid HMAC key: {e}")))?;
        mac.update(KEY_CHECK_DOMAIN);
        mac.update(salt);
        Ok(mac)
    }
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The extract step gets no salt: the input already has full entropy
/// (it came from Argon2id).
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut *okm)
        .map_err(|e| VaultError::InvalidInput(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
