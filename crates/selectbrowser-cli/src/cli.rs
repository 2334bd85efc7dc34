//! CLI argument definitions for selectbrowser.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use selectbrowser_core::{Invocation, PolicyKind, RegistrationOptions};

/// Environment variable naming the log directory.
pub const LOG_DIR_ENV: &str = "SELECTBROWSER_LOG_DIR";

#[derive(Debug, Parser)]
#[command(name = "selectbrowser")]
#[command(about = "Open URLs in IE or Chrome depending on their host", version)]
#[command(group(ArgGroup::new("mode").args(["register", "unregister", "url"])))]
pub struct Args {
    /// Register as a handler for http and https URLs
    #[arg(long)]
    pub register: bool,

    /// Remove the handler registration
    #[arg(long)]
    pub unregister: bool,

    /// URL to open
    pub url: Option<String>,

    /// Routing policy (static-list or configurable-host)
    #[arg(long, env = "SELECTBROWSER_POLICY")]
    pub policy: Option<PolicyKind>,

    /// Browser used for hosts not in the exception list (with --register)
    #[arg(long, requires = "register")]
    pub default_browser: Option<String>,

    /// Comma-separated exception hosts (with --register)
    #[arg(long, requires = "register")]
    pub non_default_hosts: Option<String>,

    /// Directory for the daily log file (default: temp directory)
    #[arg(long, env = "SELECTBROWSER_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Map parsed arguments to the invocation to execute.
    pub fn into_invocation(self) -> Result<Invocation> {
        if self.register {
            let executable =
                std::env::current_exe().context("Failed to get current executable path")?;
            let defaults = RegistrationOptions::default();
            return Ok(Invocation::Register {
                executable,
                options: RegistrationOptions {
                    default_browser: self.default_browser.unwrap_or(defaults.default_browser),
                    non_default_hosts: self
                        .non_default_hosts
                        .unwrap_or(defaults.non_default_hosts),
                    policy: self.policy,
                },
            });
        }
        if self.unregister {
            return Ok(Invocation::Unregister);
        }
        Ok(match self.url {
            Some(url) => Invocation::Dispatch {
                url,
                policy: self.policy,
            },
            None => Invocation::Idle,
        })
    }
}

/// Log directory to use, even when argument parsing failed.
pub fn log_dir(
    parsed: &std::result::Result<Args, clap::Error>,
    env_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    match parsed {
        Ok(args) => args.log_dir.clone(),
        Err(_) => env_dir,
    }
}

/// True for real argument errors, false for `--help`/`--version` output.
pub fn is_usage_error(error: &clap::Error) -> bool {
    !matches!(
        error.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}
