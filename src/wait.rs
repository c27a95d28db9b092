//! Condition polling
//!
//! A [`Waiter`] re-evaluates a condition at a fixed interval until it yields
//! a value or the session timeout runs out. Only the expiry becomes
//! [`Error::Timeout`]; any error raised by the condition itself stops the
//! wait at once.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::Config;
use crate::locator::Locator;
use crate::session::{ElementHandle, ElementRef, PageContext};
use crate::{Error, Result};

/// Default delay between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wait policy of one session
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    /// Create a new waiter
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Waiter using the configured timeout and poll interval
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.wait_timeout(), config.poll_interval())
    }

    /// Timeout applied to every wait
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll `condition` until it returns `Some`
    ///
    /// The condition runs at least once, and once more when the deadline is
    /// reached. A poll still pending at the deadline is dropped and the wait
    /// times out.
    pub async fn until<T, F, Fut>(&self, description: &str, mut condition: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match tokio::time::timeout_at(deadline, condition()).await {
                Ok(outcome) => {
                    if let Some(value) = outcome? {
                        debug!("{} satisfied after {} poll(s)", description, attempts);
                        return Ok(value);
                    }
                }
                Err(_) => {
                    debug!("Poll {} for {} still pending at the deadline", attempts, description);
                    return Err(self.expired(description, attempts));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.expired(description, attempts));
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    fn expired(&self, description: &str, attempts: u32) -> Error {
        Error::timeout(format!(
            "waiting for {} ({:?}, {} polls)",
            description, self.timeout, attempts
        ))
    }

    /// Wait until an element matching `locator` is in the DOM
    pub async fn presence_of_element_located(
        &self,
        page: &dyn PageContext,
        locator: &Locator,
    ) -> Result<ElementHandle> {
        let description = format!("presence of element located by {}", locator);
        self.until(&description, || async move { page.find_element(locator).await })
            .await
    }

    /// Wait until an element matching `locator` is in the DOM and displayed
    pub async fn visibility_of_element_located(
        &self,
        page: &dyn PageContext,
        locator: &Locator,
    ) -> Result<ElementHandle> {
        let description = format!("visibility of element located by {}", locator);
        self.until(&description, || async move {
            match page.find_element(locator).await? {
                Some(element) => {
                    if ElementRef::new(page, &element).is_displayed().await? {
                        return Ok(Some(element));
                    }
                    if let Err(e) = page.release_element(&element).await {
                        debug!("Could not release {}: {}", element.description, e);
                    }
                    Ok(None)
                }
                None => Ok(None),
            }
        })
        .await
    }

    /// Wait until an already located element is displayed
    pub async fn visibility_of(&self, page: &dyn PageContext, element: &ElementHandle) -> Result<()> {
        let description = format!("visibility of {}", element.description);
        self.until(&description, || async move {
            let displayed = ElementRef::new(page, element).is_displayed().await?;
            Ok(displayed.then_some(()))
        })
        .await
    }

    /// Wait until the document title equals `expected` exactly
    pub async fn title_is(&self, page: &dyn PageContext, expected: &str) -> Result<()> {
        let description = format!("title to be \"{}\"", expected);
        self.until(&description, || async move {
            let title = page.title().await?;
            Ok((title == expected).then_some(()))
        })
        .await
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(20), DEFAULT_POLL_INTERVAL)
    }
}
