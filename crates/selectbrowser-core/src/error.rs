use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration key not found: {0}")]
    NotFound(String),

    #[error("Access denied to configuration key: {0}")]
    AccessDenied(String),

    #[error("Invalid url '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("Failed to start {path}: {source}")]
    SpawnFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unregister left {} entries behind: {}", .failures.len(), join_failures(.failures))]
    PartialUnregister { failures: Vec<UnregisterFailure> },

    #[error("Registry error at {path}: {message}")]
    Registry { path: String, message: String },

    #[error("{0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the "key or value does not exist" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// One registration entry that `unregister` could not remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterFailure {
    /// Store path of the key, or `key\value` for a named value.
    pub target: String,
    pub reason: String,
}

impl fmt::Display for UnregisterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.reason)
    }
}

fn join_failures(failures: &[UnregisterFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_unregister_lists_every_failure() {
        let err = Error::PartialUnregister {
            failures: vec![
                UnregisterFailure {
                    target: r"SOFTWARE\Classes\SBUrl".to_string(),
                    reason: "access denied".to_string(),
                },
                UnregisterFailure {
                    target: r"SOFTWARE\RegisteredApplications\selectbrowser".to_string(),
                    reason: "still present".to_string(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("Unregister left 2 entries behind"));
        assert!(message.contains(r"SOFTWARE\Classes\SBUrl (access denied)"));
        assert!(message.contains("selectbrowser (still present)"));
    }

    #[test]
    fn not_found_is_detected() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(!Error::AccessDenied("x".into()).is_not_found());
    }
}
