//! The vault service: the only way front ends touch a vault.
//!
//! `VaultService` owns the path, the KDF cost used at `init`, and the
//! session.  A session exists only while the vault is unlocked and holds
//! the in-memory `Vault` together with its `DerivedKey`; `lock` (or
//! dropping the service) destroys it, zeroing the key.
//!
//! ```text
//! Uninitialized --init--> Unlocked --lock--> Locked --unlock--> Unlocked
//! ```
//!
//! All operations serialize on one mutex guarding the session, which also
//! covers the persist call that follows every mutation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use zeroize::Zeroizing;

use crate::crypto::{self, Argon2Params, DerivedKey};
use crate::errors::{Result, VaultError};
use crate::generator::{self, GenerationPolicy};
use crate::vault::Vault;

/// Maximum account name length in bytes.
const MAX_ACCOUNT_LEN: usize = 256;

/// Where a vault is in its lifecycle, from this service's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No vault file at the configured path.
    Uninitialized,
    /// Vault file present, no verified key in memory.
    Locked,
    /// Verified key held for this session.
    Unlocked,
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VaultState::Uninitialized => "uninitialized",
            VaultState::Locked => "locked",
            VaultState::Unlocked => "unlocked",
        };
        f.write_str(name)
    }
}

/// An unlocked vault and the key that unlocked it.
struct Session {
    vault: Vault,
    key: DerivedKey,
}

/// Orchestrates key derivation, the record codec, and the store.
pub struct VaultService {
    path: PathBuf,
    kdf: Argon2Params,
    session: Mutex<Option<Session>>,
}

impl VaultService {
    /// A service for the vault at `path` using the default Argon2 cost
    /// for any new vault.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_params(path, Argon2Params::default())
    }

    /// A service whose `init` uses `kdf`.  Existing vaults always unlock
    /// with the cost stored in their file.
    pub fn with_params(path: impl Into<PathBuf>, kdf: Argon2Params) -> Self {
        Self {
            path: path.into(),
            kdf,
            session: Mutex::new(None),
        }
    }

    /// Path of the backing vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        let session = self.session();
        self.state_of(&session)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a new, empty vault protected by `passphrase` and unlock it.
    pub fn init(&self, passphrase: &str) -> Result<()> {
        let mut session = self.session();
        if self.path.exists() {
            return Err(VaultError::AlreadyInitialized(self.path.clone()));
        }
        expect_state(self.state_of(&session), VaultState::Uninitialized)?;

        let salt = crypto::generate_salt()?;
        let key = crypto::derive(passphrase.as_bytes(), &salt, &self.kdf)?;
        let key_check = key.key_check(&salt)?;
        let vault = Vault::new(salt.to_vec(), key_check, self.kdf);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        vault.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), "vault initialized");
        *session = Some(Session { vault, key });
        Ok(())
    }

    /// Verify `passphrase` against the stored key check and unlock.
    ///
    /// On a wrong passphrase the vault stays locked.
    pub fn unlock(&self, passphrase: &str) -> Result<()> {
        let mut session = self.session();
        expect_state(self.state_of(&session), VaultState::Locked)?;

        let vault = Vault::load(&self.path)?;
        let key = crypto::derive(passphrase.as_bytes(), vault.salt(), vault.kdf())?;
        if !key.verify_key_check(vault.salt(), vault.key_check())? {
            tracing::warn!(path = %self.path.display(), "unlock rejected: wrong passphrase");
            return Err(VaultError::AuthenticationFailure);
        }

        tracing::debug!(path = %self.path.display(), records = vault.len(), "vault unlocked");
        *session = Some(Session { vault, key });
        Ok(())
    }

    /// Discard the session key and return to `Locked`.
    pub fn lock(&self) -> Result<()> {
        let mut session = self.session();
        expect_state(self.state_of(&session), VaultState::Unlocked)?;
        *session = None;
        tracing::debug!(path = %self.path.display(), "vault locked");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Store a password for `account`, replacing any existing one.
    ///
    /// Exactly one of `password` / `policy` may be given; with neither,
    /// a password is generated with the default policy.
    pub fn add(
        &self,
        account: &str,
        password: Option<&str>,
        policy: Option<&GenerationPolicy>,
    ) -> Result<()> {
        self.store(account, password, policy, false)
    }

    /// Like `add`, but fails with `DuplicateAccount` instead of replacing.
    pub fn add_strict(
        &self,
        account: &str,
        password: Option<&str>,
        policy: Option<&GenerationPolicy>,
    ) -> Result<()> {
        self.store(account, password, policy, true)
    }

    /// Decrypt and return the password stored for `account`.
    pub fn get(&self, account: &str) -> Result<Zeroizing<String>> {
        let session = self.session();
        let active = unlocked(&session, self.state_of(&session))?;

        let record = active
            .vault
            .get(account)
            .ok_or_else(|| VaultError::AccountNotFound(account.to_string()))?;
        crypto::decrypt(&active.key, record).map(Zeroizing::new)
    }

    /// Account names in insertion order.  No secret material is touched.
    pub fn list(&self) -> Result<Vec<String>> {
        let session = self.session();
        let active = unlocked(&session, self.state_of(&session))?;
        Ok(active.vault.list())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn store(
        &self,
        account: &str,
        password: Option<&str>,
        policy: Option<&GenerationPolicy>,
        strict: bool,
    ) -> Result<()> {
        validate_account(account)?;

        let mut session = self.session();
        let state = self.state_of(&session);
        let active = match session.as_mut() {
            Some(active) => active,
            None => return Err(wrong_state(state, VaultState::Unlocked)),
        };

        if strict && active.vault.contains(account) {
            return Err(VaultError::DuplicateAccount(account.to_string()));
        }

        let plaintext = match (password, policy) {
            (Some(_), Some(_)) => {
                return Err(VaultError::InvalidInput(
                    "supply either a password or a generation policy, not both".into(),
                ));
            }
            (Some(pw), None) => Zeroizing::new(pw.to_string()),
            (None, Some(policy)) => Zeroizing::new(generator::generate(policy)?),
            (None, None) => Zeroizing::new(generator::generate(&GenerationPolicy::default())?),
        };

        let record = crypto::encrypt(&active.key, account, &plaintext)?;
        let previous = active.vault.upsert(record);

        // Keep memory and disk in step: undo the upsert if persisting fails.
        if let Err(e) = active.vault.persist(&self.path) {
            match previous {
                Some(old) => {
                    active.vault.upsert(old);
                }
                None => {
                    active.vault.remove(account);
                }
            }
            return Err(e);
        }

        tracing::debug!(account, "record stored");
        Ok(())
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_of(&self, session: &Option<Session>) -> VaultState {
        if session.is_some() {
            VaultState::Unlocked
        } else if self.path.exists() {
            VaultState::Locked
        } else {
            VaultState::Uninitialized
        }
    }
}

fn unlocked(session: &Option<Session>, state: VaultState) -> Result<&Session> {
    session
        .as_ref()
        .ok_or_else(|| wrong_state(state, VaultState::Unlocked))
}

fn expect_state(actual: VaultState, required: VaultState) -> Result<()> {
    if actual == required {
        Ok(())
    } else {
        Err(wrong_state(actual, required))
    }
}

fn wrong_state(actual: VaultState, required: VaultState) -> VaultError {
    VaultError::InvalidState { required, actual }
}

/// Account names are non-empty, at most 256 bytes, and free of control
/// characters.  Matching is exact and case-sensitive.
fn validate_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(VaultError::InvalidInput(
            "account name cannot be empty".into(),
        ));
    }
    if account.len() > MAX_ACCOUNT_LEN {
        return Err(VaultError::InvalidInput(format!(
            "account name cannot exceed {MAX_ACCOUNT_LEN} bytes"
        )));
    }
    if account.chars().any(char::is_control) {
        return Err(VaultError::InvalidInput(
            "account name cannot contain control characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> VaultService {
        VaultService::with_params(dir.path().join("vault.json"), Argon2Params::minimum())
    }

    #[test]
    fn state_follows_lifecycle() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        assert_eq!(svc.state(), VaultState::Uninitialized);

        svc.init("correct-horse").unwrap();
        assert_eq!(svc.state(), VaultState::Unlocked);

        svc.lock().unwrap();
        assert_eq!(svc.state(), VaultState::Locked);

        svc.unlock("correct-horse").unwrap();
        assert_eq!(svc.state(), VaultState::Unlocked);
    }

    #[test]
    fn operations_outside_unlocked_name_required_state() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let err = svc.list().unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidState {
                required: VaultState::Unlocked,
                actual: VaultState::Uninitialized
            }
        ));
        assert!(matches!(
            svc.unlock("pw").unwrap_err(),
            VaultError::InvalidState {
                required: VaultState::Locked,
                ..
            }
        ));
        assert!(matches!(
            svc.lock().unwrap_err(),
            VaultError::InvalidState { .. }
        ));
    }

    #[test]
    fn unlock_while_unlocked_is_invalid_state() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.init("pw-123456").unwrap();
        assert!(matches!(
            svc.unlock("pw-123456").unwrap_err(),
            VaultError::InvalidState {
                actual: VaultState::Unlocked,
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_account_names() {
        assert!(validate_account("").is_err());
        assert!(validate_account("tab\there").is_err());
        assert!(validate_account(&"a".repeat(257)).is_err());
        assert!(validate_account("Work Email (old)").is_ok());
    }

    #[test]
    fn password_and_policy_together_is_invalid() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.init("pw-123456").unwrap();
        let err = svc
            .add("x", Some("pw"), Some(&GenerationPolicy::default()))
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
        assert!(svc.list().unwrap().is_empty());
    }

    #[test]
    fn failed_persist_rolls_back_memory() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.init("pw-123456").unwrap();
        svc.add("kept", Some("one"), None).unwrap();

        // Replace the vault file with a directory so the rename fails.
        fs::remove_file(svc.path()).unwrap();
        fs::create_dir(svc.path()).unwrap();
        fs::write(svc.path().join("blocker"), b"x").unwrap();

        assert!(svc.add("new", Some("two"), None).is_err());
        assert!(svc.add("kept", Some("changed"), None).is_err());
        assert_eq!(svc.list().unwrap(), vec!["kept"]);
        assert_eq!(svc.get("kept").unwrap().as_str(), "one");
    }
}
