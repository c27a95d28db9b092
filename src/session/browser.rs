//! Chrome launcher
//!
//! Launches a dedicated Chrome per session, or attaches to one that is
//! already running when a CDP endpoint is configured.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::cdp::{ChromeProcess, DevToolsEndpoint};
use crate::session::page::CdpPage;
use crate::session::traits::{BrowserLauncher, BrowserOptions, PageContext};
use crate::Error;

/// Launcher backed by a real Chrome
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    /// Create a new launcher
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<Arc<dyn PageContext>, Error> {
        if let Some(endpoint) = &options.cdp_endpoint {
            info!("Attaching to Chrome at {}", endpoint);
            let page = CdpPage::connect(DevToolsEndpoint::new(endpoint.as_str()), None).await?;
            return Ok(Arc::new(page));
        }

        let executable = ChromeProcess::find_executable(options.executable_path.as_deref())?;
        let process = ChromeProcess::spawn(&executable, &options.chrome_args(), options.launch_timeout).await?;
        let endpoint = process.endpoint().clone();

        // On failure the process is dropped here, which kills it
        let page = CdpPage::connect(endpoint, Some(process)).await?;
        Ok(Arc::new(page))
    }
}
