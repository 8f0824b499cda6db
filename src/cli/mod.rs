//! CLI module — Clap argument parser, output helpers, and command implementations.
//!
//! Commands are thin: they resolve settings, build a `VaultService`,
//! and call into it.  Nothing here reads or writes the vault file.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::generator::GenerationPolicy;
use crate::service::{VaultService, VaultState};

/// Minimum master passphrase length accepted by `init`.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the passphrase.
pub const PASSWORD_ENV: &str = "PWVAULT_PASSWORD";

/// pwvault CLI: local encrypted password vault.
#[derive(Parser)]
#[command(name = "pwvault", about = "Local encrypted password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (default: value from .pwvault.toml, else .pwvault/vault.json)
    #[arg(long, global = true, env = "PWVAULT_VAULT")]
    pub vault: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault protected by a master passphrase
    Init,

    /// Add or update the password for an account
    Add {
        /// Account name (e.g. email, bank)
        account: String,

        /// Password value (omit for interactive prompt)
        #[arg(long, conflicts_with = "generate")]
        password: Option<String>,

        /// Generate a random password instead of entering one
        #[arg(short, long)]
        generate: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Show the password stored for an account
    Get {
        /// Account name
        account: String,

        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
    },

    /// List all stored accounts
    List,

    /// Generate a random password without touching the vault
    Generate {
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show
        #[arg(long, default_value = "50")]
        last: usize,
    },
}

/// Overrides for the configured generation policy.
#[derive(clap::Args, Debug, Default)]
pub struct PolicyArgs {
    /// Password length
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Exclude uppercase letters
    #[arg(long)]
    pub no_upper: bool,

    /// Exclude lowercase letters
    #[arg(long)]
    pub no_lower: bool,

    /// Exclude digits
    #[arg(long)]
    pub no_digits: bool,

    /// Exclude symbols
    #[arg(long)]
    pub no_symbols: bool,
}

impl PolicyArgs {
    /// True when any generation flag was given.
    pub fn is_set(&self) -> bool {
        self.length.is_some()
            || self.no_upper
            || self.no_lower
            || self.no_digits
            || self.no_symbols
    }

    /// Apply these flags on top of `base`.
    pub fn apply(&self, base: GenerationPolicy) -> GenerationPolicy {
        GenerationPolicy {
            length: self.length.unwrap_or(base.length),
            include_upper: base.include_upper && !self.no_upper,
            include_lower: base.include_lower && !self.no_lower,
            include_digits: base.include_digits && !self.no_digits,
            include_symbols: base.include_symbols && !self.no_symbols,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Settings from `.pwvault.toml` in the current directory.
pub fn settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Resolve the vault path: `--vault` wins, then the config file.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => Ok(path.clone()),
        None => Ok(settings.vault_path(&std::env::current_dir()?)),
    }
}

/// Build the service every command talks to.
pub fn open_service(cli: &Cli, settings: &Settings) -> Result<VaultService> {
    let path = vault_path(cli, settings)?;
    Ok(VaultService::with_params(path, settings.argon2_params()))
}

/// Prompt for the master passphrase and unlock `service`.
///
/// Failed attempts are recorded in the audit log.
pub fn unlock(service: &VaultService) -> Result<()> {
    if service.state() == VaultState::Uninitialized {
        return Err(VaultError::VaultNotFound(service.path().to_path_buf()));
    }
    let password = prompt_password()?;
    let result = service.unlock(&password);
    if matches!(result, Err(VaultError::AuthenticationFailure)) {
        audit(service, "unlock", None, Some("wrong passphrase"));
    }
    result
}

/// Get the master passphrase, trying in order:
/// 1. `PWVAULT_PASSWORD` env var (scripts, CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master passphrase")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation (used during `init`).
///
/// Also respects `PWVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum passphrase length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(VaultError::InvalidInput(format!(
                    "master passphrase must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master passphrase")
            .with_confirmation(
                "Confirm master passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Record an operation in the audit log (no-op without `audit-log`).
pub fn audit(service: &VaultService, op: &str, account: Option<&str>, details: Option<&str>) {
    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(service.path(), op, account, details);

    #[cfg(not(feature = "audit-log"))]
    let _ = (service, op, account, details);
}
