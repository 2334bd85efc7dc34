#![cfg_attr(all(target_os = "windows", not(debug_assertions)), windows_subsystem = "windows")]

mod cli;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use selectbrowser_core::{Outcome, ProcessLauncher, RegistryStore, execute};
use tracing::{error, info};

fn main() -> Result<()> {
    let parsed = Args::try_parse();
    let log_dir = cli::log_dir(&parsed, std::env::var_os(cli::LOG_DIR_ENV).map(PathBuf::from));
    logging::init(log_dir.as_deref());

    let args = match parsed {
        Ok(args) => args,
        Err(e) => {
            if cli::is_usage_error(&e) {
                error!("Invalid arguments: {}", e);
            }
            e.exit();
        }
    };

    if let Err(e) = run(args) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let invocation = args.into_invocation()?;
    let mut store = RegistryStore::new();
    let launcher = ProcessLauncher::new();

    match execute(invocation, &mut store, &launcher)? {
        Outcome::Registered => info!("Registration complete"),
        Outcome::Unregistered => info!("Unregistration complete"),
        Outcome::Dispatched(report) if !report.launched => {
            info!("{} could not be started", report.choice)
        }
        Outcome::Dispatched(_) | Outcome::Idle => {}
    }
    Ok(())
}
