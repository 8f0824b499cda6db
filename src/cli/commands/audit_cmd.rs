//! `pwvault audit` — display the audit log.
//!
//! Usage:
//!   pwvault audit               # show last 50 entries
//!   pwvault audit --last 20     # show last 20

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `audit` command.
#[cfg(feature = "audit-log")]
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    use crate::audit::{audit_dir, AuditLog};
    use crate::cli::{output, settings, vault_path};
    use crate::errors::VaultError;

    let settings = settings()?;
    let path = vault_path(cli, &settings)?;

    let audit = AuditLog::open(&audit_dir(&path))
        .ok_or_else(|| VaultError::CommandFailed("failed to open audit database".into()))?;

    let entries = audit.query(last)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Execute the `audit` command (audit support not compiled in).
#[cfg(not(feature = "audit-log"))]
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let _ = (cli, last);
    Err(crate::errors::VaultError::CommandFailed(
        "audit log support not compiled, rebuild with `--features audit-log`".into(),
    ))
}

/// Print audit entries in a formatted table.
#[cfg(feature = "audit-log")]
pub fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Account", "Details"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let op = colorize_operation(&entry.operation, entry.details.as_deref());
        let account = entry.account.as_deref().unwrap_or("-");
        let details = entry.details.as_deref().unwrap_or("-");

        table.add_row(vec![time, op, account.to_string(), details.to_string()]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display; failed unlocks stand out.
fn colorize_operation(op: &str, details: Option<&str>) -> String {
    use console::style;

    match (op, details) {
        ("unlock", Some(_)) => style(op).red().bold().to_string(),
        ("init", _) => style(op).green().to_string(),
        ("add", _) => style(op).blue().to_string(),
        ("get", _) => style(op).yellow().to_string(),
        ("list", _) => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
