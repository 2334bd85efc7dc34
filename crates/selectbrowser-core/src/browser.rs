//! Installed browsers and how to hand them a URL.

use std::fmt;

use strum::Display;

/// The browser a URL is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BrowserChoice {
    #[strum(serialize = "IE")]
    Ie,
    #[strum(serialize = "Chrome")]
    Chrome,
}

impl BrowserChoice {
    /// The other browser.
    pub fn other(self) -> Self {
        match self {
            BrowserChoice::Ie => BrowserChoice::Chrome,
            BrowserChoice::Chrome => BrowserChoice::Ie,
        }
    }
}

/// Absolute path to a browser executable plus its argument convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserPath {
    pub executable: String,
    /// Pass `--` before the URL so a URL starting with `-` is not read as a flag.
    pub url_separator: bool,
}

impl BrowserPath {
    /// Build from a registered open-command string.
    pub fn from_open_command(command: &str, url_separator: bool) -> Self {
        Self {
            executable: trim_quotes(command).to_string(),
            url_separator,
        }
    }

    /// Arguments to start this browser on `url`.
    pub fn launch_args<'a>(&self, url: &'a str) -> Vec<&'a str> {
        if self.url_separator {
            vec!["--", url]
        } else {
            vec![url]
        }
    }
}

impl fmt::Display for BrowserPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.executable)
    }
}

/// Strip one pair of wrapping double quotes.
pub fn trim_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}
