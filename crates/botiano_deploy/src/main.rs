mod cli;
mod error;
mod output;
mod pm2;
mod remote;
mod retry;
mod runner;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Action, Cli};
use crate::error::{DeployError, Result};
use crate::output::Report;
use crate::remote::ssh::SshShell;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    match real_main(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            error!(error = %err, "Operation failed");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the requested action succeeded.
fn real_main(cli: &Cli) -> Result<bool> {
    cli.validate().map_err(DeployError::InvalidArg)?;

    let connection = cli.connection();
    let mut shell = cli
        .retry_policy()
        .run("Connecting over SSH", |_| SshShell::connect(&connection))?;
    let target = cli.target();

    let report = match &cli.action {
        Action::Deploy { files } => {
            Report::Deploy(runner::deploy(&mut shell, &target, &cli::manifest(files))?)
        }
        Action::Monitor => Report::Monitor(runner::monitor(&mut shell, &target)?),
        Action::Restart => Report::Restart(runner::restart(&mut shell, &target)?),
    };
    output::print_report(&cli.output, &report)?;

    Ok(match report {
        Report::Restart(outcome) => outcome.restarted,
        _ => true,
    })
}
