//! Routing a URL to a browser and launching it.

use tracing::{info, warn};

use crate::browser::BrowserChoice;
use crate::config::{DispatchConfig, PolicyKind};
use crate::error::Result;
use crate::launcher::Launcher;
use crate::store::ConfigStore;

/// What happened to a dispatched URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub choice: BrowserChoice,
    /// False when the browser process could not be started.
    pub launched: bool,
}

/// Load configuration from the store, then route and launch `url`.
pub fn dispatch(
    store: &impl ConfigStore,
    launcher: &impl Launcher,
    url: &str,
    policy_override: Option<PolicyKind>,
) -> Result<DispatchReport> {
    let config = DispatchConfig::load(store, policy_override)?;
    dispatch_with(&config, launcher, url)
}

/// Route and launch `url` with an already loaded configuration.
///
/// Routing errors propagate. Launch errors are logged and reported through
/// [`DispatchReport::launched`] only.
pub fn dispatch_with(
    config: &DispatchConfig,
    launcher: &impl Launcher,
    url: &str,
) -> Result<DispatchReport> {
    let choice = config.policy.decide(url)?;
    info!("Invoking {} for url: {}", choice, url);

    let browser = match choice {
        BrowserChoice::Ie => &config.browsers.ie,
        BrowserChoice::Chrome => &config.browsers.chrome,
    };
    let launched = match launcher.launch(browser, url) {
        Ok(()) => true,
        Err(e) => {
            warn!("Error invoking {}: {}", choice, e);
            false
        }
    };

    Ok(DispatchReport { choice, launched })
}
