//! Browser process launch.

use std::cell::RefCell;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::browser::BrowserPath;
use crate::error::{Error, Result};

/// Trait for starting a browser on a URL.
///
/// Implementations return once the OS has accepted the new process; they
/// never wait for it to exit.
pub trait Launcher {
    fn launch(&self, browser: &BrowserPath, url: &str) -> Result<()>;
}

/// Spawns the browser as a detached child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, browser: &BrowserPath, url: &str) -> Result<()> {
        let mut command = Command::new(&browser.executable);
        command
            .args(browser.launch_args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            use windows::Win32::System::Threading::DETACHED_PROCESS;
            command.creation_flags(DETACHED_PROCESS.0);
        }

        // The child handle is dropped without waiting.
        let child = command.spawn().map_err(|source| Error::SpawnFailed {
            path: browser.executable.clone(),
            source,
        })?;
        debug!("Started {} (PID: {})", browser, child.id());
        Ok(())
    }
}

/// A launch observed by [`RecordingLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLaunch {
    pub executable: String,
    pub args: Vec<String>,
}

/// Launcher that records requests instead of starting processes.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launches: RefCell<Vec<RecordedLaunch>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every request, then report it as a spawn failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn launches(&self) -> Vec<RecordedLaunch> {
        self.launches.borrow().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, browser: &BrowserPath, url: &str) -> Result<()> {
        self.launches.borrow_mut().push(RecordedLaunch {
            executable: browser.executable.clone(),
            args: browser.launch_args(url).into_iter().map(String::from).collect(),
        });
        if self.fail {
            return Err(Error::SpawnFailed {
                path: browser.executable.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "simulated failure"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_spawn_failure() {
        let browser = BrowserPath {
            executable: "/nonexistent/selectbrowser-test/browser.exe".to_string(),
            url_separator: false,
        };
        let err = ProcessLauncher::new()
            .launch(&browser, "https://example.com/")
            .unwrap_err();
        match err {
            Error::SpawnFailed { path, .. } => assert_eq!(path, browser.executable),
            other => panic!("Expected SpawnFailed, got {other:?}"),
        }
    }

    #[test]
    fn recording_launcher_records_args() {
        let launcher = RecordingLauncher::new();
        let chrome = BrowserPath {
            executable: "chrome.exe".to_string(),
            url_separator: true,
        };
        launcher.launch(&chrome, "https://a/").unwrap();

        assert_eq!(
            launcher.launches(),
            vec![RecordedLaunch {
                executable: "chrome.exe".to_string(),
                args: vec!["--".to_string(), "https://a/".to_string()],
            }]
        );
    }

    #[test]
    fn failing_launcher_still_records() {
        let launcher = RecordingLauncher::failing();
        let ie = BrowserPath {
            executable: "iexplore.exe".to_string(),
            url_separator: false,
        };
        assert!(launcher.launch(&ie, "https://a/").is_err());
        assert_eq!(launcher.launches().len(), 1);
    }
}
