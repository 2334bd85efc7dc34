//! # selectbrowser-core
//!
//! Core library for the SelectBrowser URL handler.
//!
//! This crate provides:
//! - A configuration store abstraction over the Windows registry
//! - Routing policies deciding between IE and Chrome for a URL
//! - Detached browser process launch
//! - Installing and removing the `http`/`https` handler registration

pub mod browser;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod invocation;
pub mod launcher;
pub mod policy;
pub mod registrar;
pub mod store;

pub use browser::{BrowserChoice, BrowserPath, trim_quotes};
pub use config::{
    BrowserPaths, DispatchConfig, PolicyKind, PolicyParameters, RegistrationOptions,
    resolve_browser_paths, resolve_policy_kind, resolve_policy_parameters,
};
pub use dispatch::{DispatchReport, dispatch, dispatch_with};
pub use error::{Error, Result, UnregisterFailure};
pub use invocation::{Invocation, Outcome, execute};
pub use launcher::{Launcher, ProcessLauncher, RecordedLaunch, RecordingLauncher};
pub use policy::{ConfigurableHostPolicy, RoutingPolicy, StaticListPolicy};
pub use registrar::{register, registration_entries, unregister};
pub use store::{ConfigStore, MemoryStore, RegistryStore};
