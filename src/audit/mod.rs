//! Audit log — SQLite-based operation history.
//!
//! Stores a record of every vault operation (init, unlock, add, get,
//! list, failed unlocks) in a local SQLite database next to the vault
//! file, at `<vault dir>/audit.db`.  Secrets never reach this table;
//! only operation names, account names, and short outcome notes do.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{Result, VaultError};

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub account: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<vault_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened — callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(vault_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(vault_dir);
        let conn = match Connection::open(&db_path) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(error = %e, path = %db_path.display(), "audit log unavailable");
                return None;
            }
        };

        // Set restrictive permissions on the audit database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                account     TEXT,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget: errors are only traced.
    pub fn log(&self, operation: &str, account: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, account, details)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![now, operation, account, details],
        ) {
            tracing::debug!(error = %e, operation, "audit write failed");
        }
    }

    /// Query the most recent `limit` entries, newest first.
    pub fn query(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, account, details
                 FROM audit_log
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(|e| VaultError::CommandFailed(format!("audit query prepare: {e}")))?;

        let rows = stmt
            .query_map([limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    account: row.get(3)?,
                    details: row.get(4)?,
                })
            })
            .map_err(|e| VaultError::CommandFailed(format!("audit query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(
                row.map_err(|e| VaultError::CommandFailed(format!("audit row parse: {e}")))?,
            );
        }

        Ok(entries)
    }

    /// Return the path to the audit database.
    pub fn db_path(vault_dir: &Path) -> PathBuf {
        vault_dir.join("audit.db")
    }
}

/// Directory holding the audit database for the vault at `vault_path`.
pub fn audit_dir(vault_path: &Path) -> PathBuf {
    match vault_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Convenience helper: log an event for the vault at `vault_path`.
///
/// Never fails the parent operation.
pub fn log_audit(vault_path: &Path, op: &str, account: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(&audit_dir(vault_path)) {
        audit.log(op, account, details);
    }
}
