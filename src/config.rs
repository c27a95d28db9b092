//! Configuration management for the smoke harness

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Portal under test
pub const DEFAULT_BASE_URL: &str = "https://snulinks.snu.edu.in/";

/// Harness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page every session starts on
    pub base_url: String,

    /// Wait timeout applied to every condition in a session, in seconds
    pub timeout_seconds: u64,

    /// Delay between condition polls, in milliseconds
    pub poll_interval_ms: u64,

    /// Run Chrome without a window
    pub headless: bool,

    /// Pass `--remote-allow-origins=*` to Chrome
    pub allow_remote_origins: bool,

    /// Chrome executable path
    pub chrome_path: Option<String>,

    /// Attach to an already running Chrome instead of launching one
    pub cdp_endpoint: Option<String>,

    /// Directory evidence screenshots are written to
    pub screenshot_dir: PathBuf,

    /// How long to wait for a launched Chrome to expose its DevTools endpoint
    pub launch_timeout_seconds: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 20,
            poll_interval_ms: 500,
            headless: false,
            allow_remote_origins: true,
            chrome_path: None,
            cdp_endpoint: None,
            screenshot_dir: PathBuf::from("target/screenshots"),
            launch_timeout_seconds: 20,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the optional file, then `SNULINKS_*` overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `SNULINKS_*` environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(base_url) = env::var("SNULINKS_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(timeout) = env::var("SNULINKS_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SNULINKS_TIMEOUT_SECONDS"))?;
        }

        if let Ok(interval) = env::var("SNULINKS_POLL_INTERVAL_MS") {
            self.poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid SNULINKS_POLL_INTERVAL_MS"))?;
        }

        if let Ok(headless) = env::var("SNULINKS_HEADLESS") {
            self.headless = parse_flag("SNULINKS_HEADLESS", &headless)?;
        }

        if let Ok(allow) = env::var("SNULINKS_ALLOW_REMOTE_ORIGINS") {
            self.allow_remote_origins = parse_flag("SNULINKS_ALLOW_REMOTE_ORIGINS", &allow)?;
        }

        if let Ok(chrome_path) = env::var("SNULINKS_CHROME_PATH") {
            self.chrome_path = Some(chrome_path);
        }

        if let Ok(endpoint) = env::var("SNULINKS_CDP_ENDPOINT") {
            self.cdp_endpoint = Some(endpoint);
        }

        if let Ok(dir) = env::var("SNULINKS_SCREENSHOT_DIR") {
            self.screenshot_dir = PathBuf::from(dir);
        }

        if let Ok(timeout) = env::var("SNULINKS_LAUNCH_TIMEOUT_SECONDS") {
            self.launch_timeout_seconds = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SNULINKS_LAUNCH_TIMEOUT_SECONDS"))?;
        }

        if let Ok(log_level) = env::var("SNULINKS_LOG_LEVEL") {
            self.log_level = log_level;
        }

        self.validate()
    }

    /// Reject values the harness cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::configuration("base_url must not be empty"));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::configuration("timeout_seconds must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::configuration("poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Wait timeout shared by every condition in a session
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Interval between condition polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Budget for a launched browser to come up
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_seconds)
    }
}

/// Boolean environment value: `true`/`false`, `1`/`0`, `yes`/`no` or `on`/`off`
fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!("Invalid {}: {}", name, value))),
    }
}
