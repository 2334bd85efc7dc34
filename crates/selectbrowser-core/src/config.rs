//! Store layout, defaults and per-invocation configuration.
//!
//! This module contains:
//! - Store paths read and written by the handler
//! - Built-in policy defaults used when the handler is not registered
//! - `DispatchConfig` - browser paths and routing policy for one invocation
//! - `RegistrationOptions` - values written by `register`

use std::str::FromStr;

use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::browser::BrowserPath;
use crate::error::Result;
use crate::policy::{ConfigurableHostPolicy, RoutingPolicy, StaticListPolicy};
use crate::store::ConfigStore;

/// Browser open commands under the start-menu internet clients.
pub const CHROME_OPEN_COMMAND_KEY: &str =
    r"SOFTWARE\Clients\StartMenuInternet\Google Chrome\shell\open\command";
pub const IE_OPEN_COMMAND_KEY: &str =
    r"SOFTWARE\Clients\StartMenuInternet\IEXPLORE.EXE\shell\open\command";

/// Handler identifier referenced by the URL associations.
pub const HANDLER_ID: &str = "SBUrl";
pub const HANDLER_KEY: &str = r"SOFTWARE\Classes\SBUrl";
pub const HANDLER_APPLICATION_KEY: &str = r"SOFTWARE\Classes\SBUrl\Application";
pub const HANDLER_SHELL_KEY: &str = r"SOFTWARE\Classes\SBUrl\shell";
pub const HANDLER_OPEN_KEY: &str = r"SOFTWARE\Classes\SBUrl\shell\open";
pub const HANDLER_COMMAND_KEY: &str = r"SOFTWARE\Classes\SBUrl\shell\open\command";

/// Client registration advertising the URL associations.
pub const CLIENT_NAME: &str = "selectbrowser";
pub const CLIENT_KEY: &str = r"SOFTWARE\Clients\StartMenuInternet\selectbrowser";
pub const CAPABILITIES_KEY: &str = r"SOFTWARE\Clients\StartMenuInternet\selectbrowser\Capabilities";
pub const URL_ASSOCIATIONS_KEY: &str =
    r"SOFTWARE\Clients\StartMenuInternet\selectbrowser\Capabilities\UrlAssociations";

pub const REGISTERED_APPLICATIONS_KEY: &str = r"SOFTWARE\RegisteredApplications";
/// Value stored under `RegisteredApplications`; the OS resolves it relative to HKLM.
pub const REGISTERED_CAPABILITIES_PATH: &str =
    r"Software\Clients\StartMenuInternet\selectbrowser\Capabilities";

pub const HANDLER_DESCRIPTION: &str = "MaxOffice SelectBrowser URL Handler";
pub const APPLICATION_NAME: &str = "MaxOffice SelectBrowser";
pub const APPLICATION_DESCRIPTION: &str = "Open specified sites in IE or Chrome";

/// URL schemes the handler claims.
pub const URL_SCHEMES: [&str; 2] = ["http", "https"];

/// Value names under the application key.
pub mod values {
    pub const APPLICATION_NAME: &str = "ApplicationName";
    pub const APPLICATION_DESCRIPTION: &str = "ApplicationDescription";
    pub const DEFAULT_BROWSER: &str = "DefaultBrowser";
    pub const NON_DEFAULT_HOSTS: &str = "NonDefaultHosts";
    pub const ROUTING_POLICY: &str = "RoutingPolicy";
}

/// Browser routed to when a URL is not an exception.
pub const DEFAULT_BROWSER: &str = "IE";

/// Exception hosts used when the handler's application key is absent.
pub const FALLBACK_NON_DEFAULT_HOSTS: &str =
    "outlook.office.com,sharepoint.com,teams.microsoft.com,www.onenote.com,admin.microsoft.com";

/// Exception hosts written by `register` unless overridden.
pub const REGISTERED_NON_DEFAULT_HOSTS: &str = "www.office.com,outlook.office.com,sharepoint.com,teams.microsoft.com,www.onenote.com,admin.microsoft.com";

/// Which routing policy governs an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PolicyKind {
    /// Fixed allow-list of exact URLs opened in IE.
    StaticList,
    /// `DefaultBrowser` plus `NonDefaultHosts` exceptions.
    #[default]
    ConfigurableHost,
}

/// Launch commands of the two installed browsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserPaths {
    pub ie: BrowserPath,
    pub chrome: BrowserPath,
}

/// Parameters of the configurable-host policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyParameters {
    pub default_browser: String,
    pub non_default_hosts: String,
}

impl Default for PolicyParameters {
    fn default() -> Self {
        Self {
            default_browser: DEFAULT_BROWSER.to_string(),
            non_default_hosts: FALLBACK_NON_DEFAULT_HOSTS.to_string(),
        }
    }
}

/// Read both browsers' open commands. Either one missing is an error.
pub fn resolve_browser_paths(store: &impl ConfigStore) -> Result<BrowserPaths> {
    let chrome = store.get_string(CHROME_OPEN_COMMAND_KEY, "")?;
    let ie = store.get_string(IE_OPEN_COMMAND_KEY, "")?;

    let paths = BrowserPaths {
        ie: BrowserPath::from_open_command(&ie, false),
        chrome: BrowserPath::from_open_command(&chrome, true),
    };
    info!("IE path: {}", paths.ie);
    info!("Chrome path: {}", paths.chrome);
    Ok(paths)
}

/// Read the handler's policy parameters, falling back to built-in defaults.
pub fn resolve_policy_parameters(store: &impl ConfigStore) -> Result<PolicyParameters> {
    let mut params = PolicyParameters::default();
    if !store.key_exists(HANDLER_APPLICATION_KEY)? {
        debug!("Handler application key absent, using default policy parameters");
        return Ok(params);
    }

    if let Some(value) = optional_value(store, values::DEFAULT_BROWSER)? {
        params.default_browser = value;
    }
    if let Some(value) = optional_value(store, values::NON_DEFAULT_HOSTS)? {
        params.non_default_hosts = value;
    }
    Ok(params)
}

/// Pick the policy kind: explicit override, then the stored value, then the default.
pub fn resolve_policy_kind(
    store: &impl ConfigStore,
    override_kind: Option<PolicyKind>,
) -> Result<PolicyKind> {
    if let Some(kind) = override_kind {
        return Ok(kind);
    }
    if !store.key_exists(HANDLER_APPLICATION_KEY)? {
        return Ok(PolicyKind::default());
    }
    match optional_value(store, values::ROUTING_POLICY)? {
        Some(raw) => match PolicyKind::from_str(raw.trim()) {
            Ok(kind) => Ok(kind),
            Err(_) => {
                warn!("Unknown routing policy '{}', using default", raw);
                Ok(PolicyKind::default())
            }
        },
        None => Ok(PolicyKind::default()),
    }
}

fn optional_value(store: &impl ConfigStore, name: &str) -> Result<Option<String>> {
    match store.get_string(HANDLER_APPLICATION_KEY, name) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Everything a dispatch needs, read once from the store.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub browsers: BrowserPaths,
    pub policy: RoutingPolicy,
}

impl DispatchConfig {
    pub fn load(store: &impl ConfigStore, policy_override: Option<PolicyKind>) -> Result<Self> {
        let browsers = resolve_browser_paths(store)?;
        let policy = match resolve_policy_kind(store, policy_override)? {
            PolicyKind::StaticList => RoutingPolicy::StaticList(StaticListPolicy::default()),
            PolicyKind::ConfigurableHost => {
                let params = resolve_policy_parameters(store)?;
                info!(
                    "Default browser: {}, non-default hosts: {}",
                    params.default_browser, params.non_default_hosts
                );
                RoutingPolicy::ConfigurableHost(ConfigurableHostPolicy::new(
                    params.default_browser,
                    params.non_default_hosts,
                ))
            }
        };
        Ok(Self { browsers, policy })
    }
}

/// Values `register` writes into the application key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOptions {
    pub default_browser: String,
    pub non_default_hosts: String,
    /// Stored as `RoutingPolicy` only when set.
    pub policy: Option<PolicyKind>,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            default_browser: DEFAULT_BROWSER.to_string(),
            non_default_hosts: REGISTERED_NON_DEFAULT_HOSTS.to_string(),
            policy: None,
        }
    }
}
