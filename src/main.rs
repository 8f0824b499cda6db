use clap::Parser;
use pwvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_tracing("warn");
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => pwvault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref account,
            ref password,
            generate,
            ref policy,
        } => pwvault::cli::commands::add::execute(
            &cli,
            account,
            password.as_deref(),
            generate,
            policy,
        ),
        Commands::Get { ref account, copy } => {
            pwvault::cli::commands::get::execute(&cli, account, copy)
        }
        Commands::List => pwvault::cli::commands::list::execute(&cli),
        Commands::Generate { ref policy } => pwvault::cli::commands::generate::execute(policy),
        Commands::Audit { last } => pwvault::cli::commands::audit_cmd::execute(&cli, last),
    };

    if let Err(e) = result {
        pwvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
