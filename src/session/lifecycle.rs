//! Session lifecycle
//!
//! A [`Session`] is one browser page plus the wait policy every condition in
//! a test uses. It is opened already sitting on the base page and is closed
//! exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::traits::{BrowserLauncher, BrowserOptions, PageContext};
use crate::config::Config;
use crate::locator::Locator;
use crate::wait::Waiter;
use crate::{Error, Result};

/// One browser page owned by one test
#[derive(Debug)]
pub struct Session {
    id: String,
    page: Arc<dyn PageContext>,
    waiter: Waiter,
    closed: AtomicBool,
}

impl Session {
    /// Launch a browser, maximize it, load the base page and wait for `body`
    ///
    /// Any failure is returned as [`Error::Setup`]; a page that was already
    /// launched is closed first.
    pub async fn open(launcher: &dyn BrowserLauncher, config: &Config) -> Result<Self> {
        let options = BrowserOptions::from_config(config);
        info!("Setting up browser session");

        let page = launcher
            .launch(&options)
            .await
            .map_err(|e| Error::setup(format!("browser launch failed: {}", e)))?;
        info!("Browser ready");

        let session = Self {
            id: Uuid::new_v4().to_string(),
            page,
            waiter: Waiter::from_config(config),
            closed: AtomicBool::new(false),
        };

        if let Err(e) = session.prepare(&options, &config.base_url).await {
            error!("Session setup failed: {}", e);
            session.close().await;
            return Err(Error::setup(e.to_string()));
        }

        info!("Base URL loaded: {}", config.base_url);
        Ok(session)
    }

    async fn prepare(&self, options: &BrowserOptions, base_url: &str) -> Result<()> {
        if options.cdp_endpoint.is_some() {
            // The attached browser may be headless or already sized by its owner
            if let Err(e) = self.page.maximize_window().await {
                warn!("Could not maximize attached browser window: {}", e);
            }
        } else if options.headless {
            debug!("Headless window sized by launch flags");
        } else {
            self.page.maximize_window().await?;
        }

        self.page.navigate(base_url).await?;
        self.waiter
            .presence_of_element_located(self.page.as_ref(), &Locator::tag_name("body"))
            .await?;
        Ok(())
    }

    /// Session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The page this session drives
    pub fn page(&self) -> &dyn PageContext {
        self.page.as_ref()
    }

    /// Wait policy of this session
    pub fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Release the browser
    ///
    /// Only the first call does anything. Errors are logged, never returned.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("Session {} already closed", self.id);
            return;
        }

        match self.page.close().await {
            Ok(()) => info!("Browser closed"),
            Err(e) => warn!("Error while closing browser: {}", e),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            warn!("Session {} dropped without being closed", self.id);
        }
    }
}
