//! `pwvault get` — retrieve the password for one account.

use crate::cli::output;
use crate::cli::{audit, open_service, settings, unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, account: &str, copy: bool) -> Result<()> {
    let settings = settings()?;
    let service = open_service(cli, &settings)?;

    unlock(&service)?;
    let password = service.get(account)?;
    service.lock()?;

    audit(&service, "get", Some(account), copy.then_some("copied"));

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_text(password.as_str())
            .map_err(|e| VaultError::CommandFailed(format!("clipboard write failed: {e}")))?;
        output::success(&format!("Password for '{account}' copied to clipboard."));
    } else {
        println!("{}", password.as_str());
    }

    Ok(())
}
