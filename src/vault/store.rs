//! The in-memory vault and its load/persist cycle.
//!
//! `Vault` keeps records in insertion order with a name index on the
//! side, so `list` is stable across loads and lookups stay O(1).
//! Mutations are in-memory only; call `persist` to make them durable.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::crypto::kdf::{Argon2Params, SALT_LEN};
use crate::errors::{Result, VaultError};

use super::format::{self, VaultFile, CURRENT_VERSION};
use super::record::SecretRecord;

/// Length of the stored key check (HMAC-SHA256 output).
const KEY_CHECK_LEN: usize = 32;

/// Salt, key check, KDF cost, and the ordered account → record mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    salt: Vec<u8>,
    key_check: Vec<u8>,
    kdf: Argon2Params,
    created_at: DateTime<Utc>,
    records: Vec<SecretRecord>,
    /// account -> position in `records`.
    index: HashMap<String, usize>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// An empty vault for a freshly initialized master credential.
    pub fn new(salt: Vec<u8>, key_check: Vec<u8>, kdf: Argon2Params) -> Self {
        Self {
            salt,
            key_check,
            kdf,
            created_at: Utc::now(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Read and validate the vault at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let file = format::read_vault(path)?;
        Self::from_file(file)
    }

    /// Validate a parsed vault file and build the index.
    pub fn from_file(file: VaultFile) -> Result<Self> {
        if file.salt.len() != SALT_LEN {
            return Err(VaultError::CorruptStore(format!(
                "salt must be {SALT_LEN} bytes, found {}",
                file.salt.len()
            )));
        }
        if file.key_check.len() != KEY_CHECK_LEN {
            return Err(VaultError::CorruptStore(format!(
                "key check must be {KEY_CHECK_LEN} bytes, found {}",
                file.key_check.len()
            )));
        }
        file.kdf
            .validate()
            .map_err(|e| VaultError::CorruptStore(format!("stored KDF parameters: {e}")))?;

        let mut index = HashMap::with_capacity(file.records.len());
        for (pos, record) in file.records.iter().enumerate() {
            if index.insert(record.account.clone(), pos).is_some() {
                return Err(VaultError::CorruptStore(format!(
                    "account '{}' appears more than once",
                    record.account
                )));
            }
        }

        Ok(Self {
            salt: file.salt,
            key_check: file.key_check,
            kdf: file.kdf,
            created_at: file.created_at,
            records: file.records,
            index,
        })
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Insert a record, or replace the one with the same account.
    ///
    /// A replaced record keeps its original position in the listing.
    /// Returns the record that was replaced, if any.
    pub fn upsert(&mut self, record: SecretRecord) -> Option<SecretRecord> {
        match self.index.get(&record.account) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.index.insert(record.account.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    /// Look up a record by exact (case-sensitive) account name.
    pub fn get(&self, account: &str) -> Option<&SecretRecord> {
        self.index.get(account).map(|&pos| &self.records[pos])
    }

    /// Remove a record, keeping the relative order of the rest.
    pub fn remove(&mut self, account: &str) -> Option<SecretRecord> {
        let pos = self.index.remove(account)?;
        let removed = self.records.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// All account names in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.records.iter().map(|r| r.account.clone()).collect()
    }

    /// Returns `true` if the vault holds a record for `account`.
    pub fn contains(&self, account: &str) -> bool {
        self.index.contains_key(account)
    }

    /// Iterate over the records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &SecretRecord> {
        self.records.iter()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the full vault to `path` atomically (temp file + rename).
    pub fn persist(&self, path: &Path) -> Result<()> {
        format::write_vault(path, &self.to_file())?;
        tracing::debug!(path = %path.display(), records = self.records.len(), "vault persisted");
        Ok(())
    }

    /// The serializable form of this vault.
    pub fn to_file(&self) -> VaultFile {
        VaultFile {
            version: CURRENT_VERSION,
            salt: self.salt.clone(),
            key_check: self.key_check.clone(),
            kdf: self.kdf,
            created_at: self.created_at,
            records: self.records.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key_check(&self) -> &[u8] {
        &self.key_check
    }

    /// The Argon2 cost this vault was initialized with.
    pub fn kdf(&self) -> &Argon2Params {
        &self.kdf
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
