//! Session layer traits
//!
//! This module defines the abstract interfaces between the harness and the
//! automated browser: launching it and driving its single page.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub use crate::cdp::traits::EvaluationResult;
use crate::config::Config;
use crate::locator::Locator;

/// Window size of a headless browser, which has no screen to maximize to
pub const HEADLESS_WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Browser options for launching a browser
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Headless mode (no GUI)
    pub headless: bool,
    /// Pass `--remote-allow-origins=*`
    pub allow_remote_origins: bool,
    /// Additional arguments to pass to Chrome
    pub args: Vec<String>,
    /// Chrome executable path
    pub executable_path: Option<String>,
    /// CDP endpoint of an already running Chrome (e.g., "ws://localhost:9222")
    pub cdp_endpoint: Option<String>,
    /// Budget for a launched browser to come up
    pub launch_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            allow_remote_origins: true,
            args: vec![],
            executable_path: None,
            cdp_endpoint: None,
            launch_timeout: Duration::from_secs(20),
        }
    }
}

impl BrowserOptions {
    /// Launch options derived from the harness configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            headless: config.headless,
            allow_remote_origins: config.allow_remote_origins,
            args: vec![],
            executable_path: config.chrome_path.clone(),
            cdp_endpoint: config.cdp_endpoint.clone(),
            launch_timeout: config.launch_timeout(),
        }
    }

    /// Command line flags for a launched Chrome
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.allow_remote_origins {
            args.push("--remote-allow-origins=*".to_string());
        }

        if self.headless {
            let (width, height) = HEADLESS_WINDOW_SIZE;
            args.push("--headless=new".to_string());
            args.push(format!("--window-size={},{}", width, height));
        } else {
            args.push("--start-maximized".to_string());
        }

        args.push("--no-first-run".to_string());
        args.push("--no-default-browser-check".to_string());
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Reference to a located DOM node
///
/// Only valid on the page that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Driver-side object id
    pub id: String,
    /// Locator the element was found with, for logs
    pub description: String,
}

impl ElementHandle {
    /// Create a new handle
    pub fn new<I: Into<String>, D: Into<String>>(id: I, description: D) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Page context trait
///
/// Represents the one page a session drives.
#[async_trait]
pub trait PageContext: Send + Sync + std::fmt::Debug {
    /// Get page ID
    fn id(&self) -> &str;

    /// Navigate to URL
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Current document title
    async fn title(&self) -> Result<String, crate::Error>;

    /// Maximize the browser window holding this page
    async fn maximize_window(&self) -> Result<(), crate::Error>;

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str) -> Result<EvaluationResult, crate::Error>;

    /// First element matching the locator, `None` if there is none yet
    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementHandle>, crate::Error>;

    /// Call a function declaration with `this` bound to the element
    async fn call_function_on(
        &self,
        element: &ElementHandle,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<EvaluationResult, crate::Error>;

    /// Drop the driver-side reference behind a handle
    async fn release_element(&self, element: &ElementHandle) -> Result<(), crate::Error>;

    /// Whether this driver can capture screenshots at all
    fn supports_screenshots(&self) -> bool;

    /// Capture the current viewport as PNG
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// Close the page and release the browser behind it
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if page is active
    fn is_active(&self) -> bool;
}

/// Browser launcher trait
///
/// Produces a fresh browser page per call; nothing is pooled.
#[async_trait]
pub trait BrowserLauncher: Send + Sync + std::fmt::Debug {
    /// Launch (or attach to) a browser and open a page
    async fn launch(&self, options: &BrowserOptions) -> Result<Arc<dyn PageContext>, crate::Error>;
}
