//! Executing one invocation of the handler.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{PolicyKind, RegistrationOptions};
use crate::dispatch::{DispatchReport, dispatch};
use crate::error::Result;
use crate::launcher::Launcher;
use crate::registrar::{register, unregister};
use crate::store::ConfigStore;

/// What the handler was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Install the handler registration pointing at `executable`.
    Register {
        executable: PathBuf,
        options: RegistrationOptions,
    },
    /// Remove the handler registration.
    Unregister,
    /// Open `url` in the browser the routing policy picks.
    Dispatch {
        url: String,
        policy: Option<PolicyKind>,
    },
    /// Started without a URL; nothing to do.
    Idle,
}

/// Result of a successful invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Registered,
    Unregistered,
    Dispatched(DispatchReport),
    Idle,
}

/// Run `invocation` against `store` and `launcher`.
///
/// Errors are returned to the caller, which alone decides the exit status.
pub fn execute(
    invocation: Invocation,
    store: &mut impl ConfigStore,
    launcher: &impl Launcher,
) -> Result<Outcome> {
    match invocation {
        Invocation::Register {
            executable,
            options,
        } => {
            register(store, &executable, &options)?;
            Ok(Outcome::Registered)
        }
        Invocation::Unregister => {
            unregister(store)?;
            Ok(Outcome::Unregistered)
        }
        Invocation::Dispatch { url, policy } => {
            dispatch(&*store, launcher, &url, policy).map(Outcome::Dispatched)
        }
        Invocation::Idle => {
            debug!("No url given, nothing to do");
            Ok(Outcome::Idle)
        }
    }
}
