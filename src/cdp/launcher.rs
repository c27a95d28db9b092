//! Chrome process launcher
//!
//! Starts a dedicated Chrome with its own throwaway profile and a DevTools
//! port picked by the browser itself, then waits for the endpoint to answer.

use super::browser::DevToolsEndpoint;
use crate::Error;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Executable names tried on `PATH` when no explicit path is configured
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

#[cfg(target_os = "macos")]
const MACOS_CHROME: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// File Chrome writes into the profile directory once DevTools is listening
const ACTIVE_PORT_FILE: &str = "DevToolsActivePort";

/// A running Chrome owned by one session
#[derive(Debug)]
pub struct ChromeProcess {
    child: Child,
    endpoint: DevToolsEndpoint,
    // Held so the profile directory lives exactly as long as the browser
    _user_data_dir: TempDir,
}

impl ChromeProcess {
    /// Resolve the Chrome executable
    pub fn find_executable(configured: Option<&str>) -> Result<PathBuf, Error> {
        if let Some(path) = configured {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
            return which::which(&path)
                .map_err(|_| Error::launch(format!("Chrome executable not found: {}", path.display())));
        }

        for candidate in CHROME_CANDIDATES {
            if let Ok(path) = which::which(candidate) {
                debug!("Found Chrome executable: {}", path.display());
                return Ok(path);
            }
        }

        #[cfg(target_os = "macos")]
        {
            let path = PathBuf::from(MACOS_CHROME);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(Error::launch(
            "No Chrome executable found; set chrome_path or SNULINKS_CHROME_PATH",
        ))
    }

    /// Spawn Chrome and wait until its DevTools endpoint responds
    ///
    /// `args` must not contain `--user-data-dir` or `--remote-debugging-port`;
    /// both are managed here.
    pub async fn spawn(executable: &Path, args: &[String], startup_timeout: Duration) -> Result<Self, Error> {
        let user_data_dir = tempfile::Builder::new()
            .prefix("snulinks-chrome-")
            .tempdir()
            .map_err(|e| Error::launch(format!("Failed to create profile directory: {}", e)))?;

        info!("Launching Chrome: {}", executable.display());
        debug!("Chrome arguments: {:?}", args);

        let mut child = Command::new(executable)
            .args(args)
            .arg("--remote-debugging-port=0")
            .arg(format!("--user-data-dir={}", user_data_dir.path().display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::launch(format!("Failed to start {}: {}", executable.display(), e)))?;

        let endpoint = match Self::wait_for_endpoint(&mut child, user_data_dir.path(), startup_timeout).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                if let Err(kill_err) = child.kill().await {
                    warn!("Failed to stop Chrome after launch failure: {}", kill_err);
                }
                return Err(e);
            }
        };

        info!("Chrome DevTools listening at {}", endpoint.http_base());

        Ok(Self {
            child,
            endpoint,
            _user_data_dir: user_data_dir,
        })
    }

    /// DevTools endpoint of this browser
    pub fn endpoint(&self) -> &DevToolsEndpoint {
        &self.endpoint
    }

    /// Kill the browser and reap the process
    pub async fn shutdown(&mut self) -> Result<(), Error> {
        match self.child.try_wait()? {
            Some(status) => {
                debug!("Chrome already exited with {}", status);
                Ok(())
            }
            None => {
                self.child.kill().await?;
                info!("Chrome process stopped");
                Ok(())
            }
        }
    }

    /// Poll the profile directory for the active port, then the version route
    async fn wait_for_endpoint(
        child: &mut Child,
        user_data_dir: &Path,
        startup_timeout: Duration,
    ) -> Result<DevToolsEndpoint, Error> {
        let deadline = tokio::time::Instant::now() + startup_timeout;
        let port_file = user_data_dir.join(ACTIVE_PORT_FILE);

        loop {
            if let Some(status) = child.try_wait()? {
                return Err(Error::launch(format!("Chrome exited during startup with {}", status)));
            }

            if let Ok(contents) = tokio::fs::read_to_string(&port_file).await {
                if let Some(port) = parse_active_port(&contents) {
                    let endpoint = DevToolsEndpoint::local(port);
                    match endpoint.version().await {
                        Ok(version) => {
                            info!("Connected to {} (protocol {})", version.product, version.protocol_version);
                            return Ok(endpoint);
                        }
                        Err(e) => debug!("DevTools not ready yet: {}", e),
                    }
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::launch(format!(
                    "Chrome did not expose DevTools within {:?}",
                    startup_timeout
                )));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

/// First line of `DevToolsActivePort` is the port number
fn parse_active_port(contents: &str) -> Option<u16> {
    contents
        .lines()
        .next()
        .and_then(|line| line.trim().parse().ok())
        .filter(|port| *port != 0)
}
