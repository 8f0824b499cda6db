//! `pwvault list` — show all stored account names.

use crate::cli::output;
use crate::cli::{audit, open_service, settings, unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = settings()?;
    let service = open_service(cli, &settings)?;

    unlock(&service)?;
    let accounts = service.list()?;
    service.lock()?;

    audit(&service, "list", None, None);

    output::info(&format!("{} account(s)", accounts.len()));
    output::print_accounts_table(&accounts);

    Ok(())
}
