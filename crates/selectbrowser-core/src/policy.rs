//! Routing policies: which browser opens a given URL.
//!
//! Two policies exist. [`StaticListPolicy`] sends a fixed set of exact URLs
//! to IE and everything else to Chrome. [`ConfigurableHostPolicy`] routes by
//! the URL's hostname against a configured exception list. Both are pure.

use url::{Host, Url};

use crate::browser::BrowserChoice;
use crate::error::{Error, Result};

/// URLs the static-list policy opens in IE.
pub const STATIC_IE_URLS: [&str; 2] = [
    "https://outlook.office.com/owa/",
    "https://portal.office.com/",
];

/// Fixed allow-list of exact URLs routed to IE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticListPolicy {
    ie_urls: Vec<String>,
}

impl StaticListPolicy {
    pub fn new<I, S>(ie_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ie_urls: ie_urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-sensitive, whole-string comparison; the URL is never parsed.
    pub fn decide(&self, url: &str) -> BrowserChoice {
        if self.ie_urls.iter().any(|u| u == url) {
            BrowserChoice::Ie
        } else {
            BrowserChoice::Chrome
        }
    }
}

impl Default for StaticListPolicy {
    fn default() -> Self {
        Self::new(STATIC_IE_URLS)
    }
}

/// Default browser plus a list of hosts that go to the other one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurableHostPolicy {
    default_browser: String,
    non_default_hosts: String,
}

impl ConfigurableHostPolicy {
    pub fn new(default_browser: impl Into<String>, non_default_hosts: impl Into<String>) -> Self {
        Self {
            default_browser: default_browser.into(),
            non_default_hosts: non_default_hosts.into(),
        }
    }

    /// Route `url` by hostname.
    ///
    /// The lower-cased host is looked up as a substring of the raw
    /// `NonDefaultHosts` string, not as an element of the comma-separated
    /// list, so `office.com` matches an entry of `www.office.com`.
    pub fn decide(&self, url: &str) -> Result<BrowserChoice> {
        let host = hostname(url)?;
        let default = if self.default_browser == "IE" {
            BrowserChoice::Ie
        } else {
            BrowserChoice::Chrome
        };

        Ok(if self.non_default_hosts.contains(host.as_str()) {
            default.other()
        } else {
            default
        })
    }
}

/// The policy active for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingPolicy {
    StaticList(StaticListPolicy),
    ConfigurableHost(ConfigurableHostPolicy),
}

impl RoutingPolicy {
    pub fn decide(&self, url: &str) -> Result<BrowserChoice> {
        match self {
            RoutingPolicy::StaticList(policy) => Ok(policy.decide(url)),
            RoutingPolicy::ConfigurableHost(policy) => policy.decide(url),
        }
    }
}

/// Lower-cased hostname of `url`, without IPv6 brackets.
fn hostname(url: &str) -> Result<String> {
    let malformed = |reason: String| Error::MalformedUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| malformed(e.to_string()))?;
    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(malformed("missing host".to_string())),
    };
    Ok(host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTS: &str = "outlook.office.com,sharepoint.com";

    #[test]
    fn static_list_matches_exact_urls_only() {
        let policy = StaticListPolicy::default();
        assert_eq!(policy.decide("https://portal.office.com/"), BrowserChoice::Ie);
        assert_eq!(
            policy.decide("https://outlook.office.com/owa/"),
            BrowserChoice::Ie
        );
        assert_eq!(
            policy.decide("https://portal.office.com"),
            BrowserChoice::Chrome
        );
        assert_eq!(
            policy.decide("HTTPS://PORTAL.OFFICE.COM/"),
            BrowserChoice::Chrome
        );
        assert_eq!(policy.decide("not a url"), BrowserChoice::Chrome);
    }

    #[test]
    fn host_policy_default_ie() {
        let policy = ConfigurableHostPolicy::new("IE", HOSTS);
        assert_eq!(
            policy.decide("https://sharepoint.com/x").unwrap(),
            BrowserChoice::Chrome
        );
        assert_eq!(
            policy.decide("https://example.com/x").unwrap(),
            BrowserChoice::Ie
        );
    }

    #[test]
    fn host_policy_inverts_for_other_default() {
        for default in ["Chrome", "ie", ""] {
            let policy = ConfigurableHostPolicy::new(default, HOSTS);
            assert_eq!(
                policy.decide("https://sharepoint.com/x").unwrap(),
                BrowserChoice::Ie,
                "default browser {default:?}"
            );
            assert_eq!(
                policy.decide("https://example.com/x").unwrap(),
                BrowserChoice::Chrome,
                "default browser {default:?}"
            );
        }
    }

    #[test]
    fn host_match_is_substring_containment() {
        let policy = ConfigurableHostPolicy::new("IE", "www.office.com");
        // Host shorter than the listed entry still matches.
        assert_eq!(
            policy.decide("https://office.com/").unwrap(),
            BrowserChoice::Chrome
        );
        assert_eq!(
            policy.decide("https://ice.co/").unwrap(),
            BrowserChoice::Chrome
        );

        // A longer host containing the entry does not.
        let policy = ConfigurableHostPolicy::new("IE", "office.com");
        assert_eq!(
            policy.decide("https://www.office.com/").unwrap(),
            BrowserChoice::Ie
        );
    }

    #[test]
    fn host_is_lower_cased() {
        let policy = ConfigurableHostPolicy::new("IE", HOSTS);
        assert_eq!(
            policy.decide("https://SharePoint.COM/Site").unwrap(),
            BrowserChoice::Chrome
        );
    }

    #[test]
    fn host_ignores_port_and_userinfo() {
        let policy = ConfigurableHostPolicy::new("IE", HOSTS);
        assert_eq!(
            policy
                .decide("https://user:pw@outlook.office.com:8443/mail")
                .unwrap(),
            BrowserChoice::Chrome
        );
    }

    #[test]
    fn malformed_urls_are_errors() {
        let policy = ConfigurableHostPolicy::new("IE", HOSTS);
        for url in ["", "sharepoint.com", "https://", "mailto:someone@example.com"] {
            let err = policy.decide(url).unwrap_err();
            assert!(
                matches!(err, Error::MalformedUrl { .. }),
                "expected MalformedUrl for {url:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn ipv6_host_has_no_brackets() {
        assert_eq!(hostname("http://[::1]:8080/").unwrap(), "::1");
        assert_eq!(hostname("http://127.0.0.1/").unwrap(), "127.0.0.1");
    }

    #[test]
    fn routing_policy_delegates() {
        let policy = RoutingPolicy::StaticList(StaticListPolicy::new(["https://a/"]));
        assert_eq!(policy.decide("https://a/").unwrap(), BrowserChoice::Ie);
        assert_eq!(policy.decide("::").unwrap(), BrowserChoice::Chrome);

        let policy = RoutingPolicy::ConfigurableHost(ConfigurableHostPolicy::new("IE", "a.com"));
        assert_eq!(
            policy.decide("https://a.com/").unwrap(),
            BrowserChoice::Chrome
        );
        assert!(policy.decide("::").is_err());
    }
}
