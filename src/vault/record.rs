//! The `SecretRecord` type stored inside a vault.
//!
//! Byte fields use the base64 serde helpers from `format.rs` so they
//! serialize as strings in JSON rather than raw byte arrays.

use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_encode};

/// One encrypted credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Unique, case-sensitive account identifier (e.g. "email").
    pub account: String,

    /// Random 12-byte AES-GCM nonce, never reused under one key.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    /// Encrypted password bytes.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// 16-byte GCM tag over account, nonce, and ciphertext.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub tag: Vec<u8>,
}
