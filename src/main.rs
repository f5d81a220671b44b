mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

const LOG_ENV: &str = "TAXON_SUGGEST_LOG";

fn main() -> ExitCode {
    init_tracing();

    match dispatch(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let causes = err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();
            error!(error = %err, ?causes, "taxon-suggest command failed");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest(args) => commands::ingest::run(args),
        Commands::Suggest(args) => commands::suggest::run(args),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}

/// Log filter comes from `TAXON_SUGGEST_LOG`, then `RUST_LOG`, then `info`.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
