//! AES-256-GCM encryption of individual secret records.
//!
//! Each call to `encrypt` draws a fresh random 12-byte nonce from the OS
//! RNG.  The authentication tag is kept detached from the ciphertext and
//! the account name is fed in as associated data, so a record copied
//! under another account label no longer authenticates.

use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce, Tag};
use zeroize::Zeroize;

use super::keys::DerivedKey;
use crate::errors::{Result, VaultError};
use crate::vault::SecretRecord;

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Prefix of the associated data bound into every record.
const AAD_PREFIX: &[u8] = b"pwvault-record-v1:";

/// Encrypt `password` for `account` under the session key.
pub fn encrypt(key: &DerivedKey, account: &str, password: &str) -> Result<SecretRecord> {
    let cipher = record_cipher(key)?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = password.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, &associated_data(account), &mut buffer)
        .map_err(|e| {
            buffer.zeroize();
            VaultError::InvalidInput(format!("encryption error: {e}"))
        })?;

    Ok(SecretRecord {
        account: account.to_string(),
        nonce: nonce.to_vec(),
        ciphertext: buffer,
        tag: tag.to_vec(),
    })
}

/// Decrypt a record produced by `encrypt`.
///
/// Any mismatch (wrong key, flipped bit, wrong account label, truncated
/// nonce or tag) yields `AuthenticationFailure` and no plaintext.
pub fn decrypt(key: &DerivedKey, record: &SecretRecord) -> Result<String> {
    if record.nonce.len() != NONCE_LEN || record.tag.len() != TAG_LEN {
        return Err(VaultError::AuthenticationFailure);
    }

    let cipher = record_cipher(key).map_err(|_| VaultError::AuthenticationFailure)?;
    let nonce = Nonce::from_slice(&record.nonce);
    let tag = Tag::from_slice(&record.tag);

    let mut buffer = record.ciphertext.clone();
    if cipher
        .decrypt_in_place_detached(nonce, &associated_data(&record.account), &mut buffer, tag)
        .is_err()
    {
        buffer.zeroize();
        return Err(VaultError::AuthenticationFailure);
    }

    // A record that authenticates but is not UTF-8 was not written by us.
    String::from_utf8(buffer).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::CorruptStore(format!(
            "record for '{}' is not valid UTF-8",
            record.account
        ))
    })
}

fn record_cipher(key: &DerivedKey) -> Result<Aes256Gcm> {
    let record_key = key.record_key()?;
    Aes256Gcm::new_from_slice(&*record_key)
        .map_err(|e| VaultError::InvalidInput(format!("invalid key length: {e}")))
}

fn associated_data(account: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(AAD_PREFIX.len() + account.len());
    aad.extend_from_slice(AAD_PREFIX);
    aad.extend_from_slice(account.as_bytes());
    aad
}
