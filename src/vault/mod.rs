//! Vault module — the encrypted record store.
//!
//! This module provides:
//! - The `SecretRecord` type (`record`)
//! - The JSON file format with atomic temp-file + rename writes (`format`)
//! - The in-memory `Vault` with upsert, lookup, and ordered listing (`store`)

pub mod format;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use format::VaultFile;
pub use record::SecretRecord;
pub use store::Vault;
