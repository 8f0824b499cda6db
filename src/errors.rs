use std::path::PathBuf;
use thiserror::Error;

use crate::service::VaultState;

/// All errors that can occur in pwvault.
///
/// `AuthenticationFailure` and `CorruptStore` never carry key material or
/// plaintext; their messages are safe to show to the user as-is.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid generation policy: {0}")]
    InvalidPolicy(String),

    // --- Vault lifecycle errors ---
    #[error("Vault already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Vault not found at {0} (run `pwvault init` first)")]
    VaultNotFound(PathBuf),

    #[error("Operation requires a {required} vault, but the vault is {actual}")]
    InvalidState {
        required: VaultState,
        actual: VaultState,
    },

    // --- Record errors ---
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Account '{0}' already exists")]
    DuplicateAccount(String),

    // --- Integrity errors ---
    #[error("Vault file is corrupt: {0}")]
    CorruptStore(String),

    #[error("Authentication failed: wrong master passphrase or tampered data")]
    AuthenticationFailure,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// True for both "vault file missing" and "account missing".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VaultError::VaultNotFound(_) | VaultError::AccountNotFound(_)
        )
    }
}

/// Convenience type alias for pwvault results.
pub type Result<T> = std::result::Result<T, VaultError>;
