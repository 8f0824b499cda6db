//! Cryptographic primitives for pwvault.
//!
//! This module provides:
//! - Argon2id passphrase-based key derivation and verification (`kdf`)
//! - The in-memory `DerivedKey` and its HKDF sub-keys (`keys`)
//! - AES-256-GCM encryption of secret records (`encryption`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive, ...};
pub use encryption::{decrypt, encrypt};
pub use kdf::{derive, generate_salt, verify, Argon2Params, SALT_LEN};
pub use keys::DerivedKey;
