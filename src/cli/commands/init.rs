//! `pwvault init` — create a new vault under a master passphrase.

use crate::cli::output;
use crate::cli::{audit, open_service, prompt_new_password, settings, Cli};
use crate::errors::{Result, VaultError};
use crate::service::VaultState;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = settings()?;
    let service = open_service(cli, &settings)?;

    // Fail before prompting if there is already a vault here.
    if service.state() != VaultState::Uninitialized {
        output::tip("Use `pwvault add <ACCOUNT>` to add passwords to the existing vault.");
        return Err(VaultError::AlreadyInitialized(service.path().to_path_buf()));
    }

    let password = prompt_new_password()?;
    service.init(&password)?;
    audit(&service, "init", None, Some("vault created"));
    service.lock()?;

    output::success(&format!("Vault created at {}", service.path().display()));
    output::tip("Run `pwvault add <ACCOUNT>` to store a password.");
    output::tip("Run `pwvault add <ACCOUNT> --generate` to store a generated one.");

    Ok(())
}
