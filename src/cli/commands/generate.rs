//! `pwvault generate` — print a random password; no vault involved.

use crate::cli::{settings, PolicyArgs};
use crate::errors::Result;
use crate::generator;

/// Execute the `generate` command.
pub fn execute(policy_args: &PolicyArgs) -> Result<()> {
    let settings = settings()?;
    let policy = policy_args.apply(settings.generator);
    println!("{}", generator::generate(&policy)?);
    Ok(())
}
