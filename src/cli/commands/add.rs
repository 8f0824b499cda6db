//! `pwvault add` — add or update the password for an account.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{audit, open_service, settings, unlock, Cli, PolicyArgs};
use crate::errors::{Result, VaultError};

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    account: &str,
    password: Option<&str>,
    generate: bool,
    policy_args: &PolicyArgs,
) -> Result<()> {
    if password.is_some() && policy_args.is_set() {
        return Err(VaultError::InvalidInput(
            "generation flags cannot be combined with --password".into(),
        ));
    }
    // Any policy flag asks for a generated password.
    let generate = generate || policy_args.is_set();

    let settings = settings()?;
    let service = open_service(cli, &settings)?;

    // Determine the password from one of four sources.
    let supplied = if generate {
        None
    } else if let Some(v) = password {
        // Source 1: Inline value on the command line.
        output::warning("Password provided on the command line may appear in shell history.");
        Some(Zeroizing::new(v.to_string()))
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Some(Zeroizing::new(buf.trim_end().to_string()))
    } else {
        // Source 3: Interactive secure prompt (default).
        let v = dialoguer::Password::new()
            .with_prompt(format!("Password for {account}"))
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
        Some(Zeroizing::new(v))
    };
    // Source 4: generated with the configured policy plus flags.
    let policy = policy_args.apply(settings.generator);
    if generate {
        policy.validate()?;
    }

    unlock(&service)?;

    let existed = service.list()?.iter().any(|a| a == account);
    match supplied.as_deref() {
        Some(pw) => service.add(account, Some(pw.as_str()), None)?,
        None => service.add(account, None, Some(&policy))?,
    }

    let op_detail = if existed { "updated" } else { "added" };
    audit(&service, "add", Some(account), Some(op_detail));

    output::success(&format!("Password for '{account}' {op_detail}."));
    if supplied.is_none() {
        let generated = service.get(account)?;
        output::info("Generated password:");
        println!("{}", generated.as_str());
    }

    service.lock()?;
    Ok(())
}
