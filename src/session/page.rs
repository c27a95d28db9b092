//! Page context implementation
//!
//! Drives one Chrome page target over CDP. A page either owns the Chrome
//! process it runs in (launched mode) or only its target (attached mode).

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cdp::traits::{CdpClient, TargetInfo};
use crate::cdp::{CdpClientImpl, CdpWebSocketConnection, ChromeProcess, DevToolsEndpoint};
use crate::locator::Locator;
use crate::session::scripts;
use crate::session::traits::{ElementHandle, EvaluationResult, PageContext};
use crate::Error;

/// Page context implementation
#[derive(Debug)]
pub struct CdpPage {
    id: String,
    target: TargetInfo,
    endpoint: DevToolsEndpoint,
    cdp_client: Arc<dyn CdpClient>,
    process: Mutex<Option<ChromeProcess>>,
    is_active: AtomicBool,
}

impl CdpPage {
    /// Create a new page context
    pub fn new(
        target: TargetInfo,
        endpoint: DevToolsEndpoint,
        cdp_client: Arc<dyn CdpClient>,
        process: Option<ChromeProcess>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target,
            endpoint,
            cdp_client,
            process: Mutex::new(process),
            is_active: AtomicBool::new(true),
        }
    }

    /// Open a new page target on `endpoint` and attach a client to it
    ///
    /// When `process` is given, the page takes ownership of the browser and
    /// shuts it down on close.
    pub async fn connect(endpoint: DevToolsEndpoint, process: Option<ChromeProcess>) -> Result<Self, Error> {
        let target = endpoint.new_target("about:blank").await?;
        let connection = CdpWebSocketConnection::new(target.websocket_url.clone()).await?;
        let cdp_client: Arc<dyn CdpClient> = Arc::new(CdpClientImpl::new(connection));

        cdp_client.enable_domain("Page").await?;
        debug!("Attached to page target {}", target.target_id);

        Ok(Self::new(target, endpoint, cdp_client, process))
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.is_active.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::internal(format!("Page {} is closed", self.id)))
        }
    }
}

#[async_trait]
impl PageContext for CdpPage {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        self.ensure_active()?;
        self.cdp_client.navigate(url).await?;
        Ok(())
    }

    async fn title(&self) -> Result<String, Error> {
        self.ensure_active()?;
        let title = self
            .cdp_client
            .evaluate(scripts::DOCUMENT_TITLE, false)
            .await?
            .into_string()?;
        Ok(title.unwrap_or_default())
    }

    async fn maximize_window(&self) -> Result<(), Error> {
        self.ensure_active()?;

        let window = self
            .cdp_client
            .call_method(
                "Browser.getWindowForTarget",
                json!({ "targetId": self.target.target_id }),
            )
            .await?;

        let window_id = window
            .get("windowId")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::cdp("No windowId in Browser.getWindowForTarget result"))?;

        self.cdp_client
            .call_method(
                "Browser.setWindowBounds",
                json!({
                    "windowId": window_id,
                    "bounds": { "windowState": "maximized" },
                }),
            )
            .await?;

        debug!("Maximized window {}", window_id);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<EvaluationResult, Error> {
        self.ensure_active()?;
        self.cdp_client.evaluate(script, false).await
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementHandle>, Error> {
        self.ensure_active()?;
        let object_id = self
            .cdp_client
            .evaluate_handle(&locator.query_expression())
            .await?;
        Ok(object_id.map(|id| ElementHandle::new(id, locator.to_string())))
    }

    async fn call_function_on(
        &self,
        element: &ElementHandle,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<EvaluationResult, Error> {
        self.ensure_active()?;
        self.cdp_client
            .call_function_on(&element.id, function_declaration, args)
            .await
    }

    async fn release_element(&self, element: &ElementHandle) -> Result<(), Error> {
        self.ensure_active()?;
        self.cdp_client.release_object(&element.id).await
    }

    fn supports_screenshots(&self) -> bool {
        true
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.ensure_active()?;
        self.cdp_client.screenshot().await
    }

    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            warn!("Page {} is already closed", self.id);
            return Ok(());
        }

        info!("Closing page {}", self.id);
        let mut first_error = None;
        let mut process = self.process.lock().await;

        match process.as_mut() {
            Some(chrome) => {
                // Browser.close drops the socket before it can answer
                if let Err(e) = self.cdp_client.call_method("Browser.close", json!({})).await {
                    debug!("Browser.close did not complete cleanly: {}", e);
                }
                if let Err(e) = self.cdp_client.connection().close().await {
                    debug!("Closing CDP connection: {}", e);
                }
                if let Err(e) = chrome.shutdown().await {
                    first_error.get_or_insert(e);
                }
            }
            None => {
                if let Err(e) = self.cdp_client.connection().close().await {
                    debug!("Closing CDP connection: {}", e);
                }
                if let Err(e) = self.endpoint.close_target(&self.target.target_id).await {
                    first_error.get_or_insert(e);
                }
            }
        }
        *process = None;

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Page {} closed", self.id);
                Ok(())
            }
        }
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
