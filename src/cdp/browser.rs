//! DevTools HTTP endpoint
//!
//! Chrome exposes `/json/*` routes next to its WebSocket interface for
//! discovering the browser version and creating or closing page targets.

use super::traits::{BrowserVersion, TargetInfo};
use crate::Error;
use tracing::{debug, info};

/// HTTP side of a Chrome DevTools endpoint
#[derive(Debug, Clone)]
pub struct DevToolsEndpoint {
    /// Endpoint as configured (e.g., "ws://localhost:9222")
    endpoint: String,
    /// HTTP base derived from the endpoint
    http_base: String,
    client: reqwest::Client,
}

impl DevToolsEndpoint {
    /// Create a new endpoint handle
    ///
    /// # Arguments
    /// * `endpoint` - Browser endpoint, `ws://`, `wss://` or `http://` form
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        let endpoint = endpoint.into();
        let http_base = endpoint
            .replace("ws://", "http://")
            .replace("wss://", "https://")
            .trim_end_matches('/')
            .to_string();

        Self {
            endpoint,
            http_base,
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint for a browser listening on a local port
    pub fn local(port: u16) -> Self {
        Self::new(format!("http://127.0.0.1:{}", port))
    }

    /// Endpoint as configured
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP base URL
    pub fn http_base(&self) -> &str {
        &self.http_base
    }

    /// Get browser version
    pub async fn version(&self) -> Result<BrowserVersion, Error> {
        let url = format!("{}/json/version", self.http_base);
        debug!("Fetching browser version from {}", url);

        let version_json: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::launch(format!("Failed to connect to browser at {}: {}", url, e)))?
            .json()
            .await
            .map_err(|e| Error::launch(format!("Failed to parse version: {}", e)))?;

        let field = |name: &str| {
            version_json
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string()
        };

        Ok(BrowserVersion {
            protocol_version: field("Protocol-Version"),
            product: field("Browser"),
        })
    }

    /// Create a new page target
    ///
    /// Uses the /json/new endpoint which creates a new page and returns its WebSocket URL directly.
    pub async fn new_target(&self, url: &str) -> Result<TargetInfo, Error> {
        let new_url = format!("{}/json/new?{}", self.http_base, url);
        debug!("Creating new page via HTTP API: {}", new_url);

        let response = self.client.put(&new_url).send().await.map_err(|e| {
            Error::launch(format!(
                r#"Failed to connect to Chrome CDP endpoint at {}.
Please start Chrome with:
  Linux: google-chrome --remote-debugging-port=9222 --remote-allow-origins=* --user-data-dir=/tmp/chrome-debug
  macOS: /Applications/Google\ Chrome.app/Contents/MacOS/Google\ Chrome --remote-debugging-port=9222 --remote-allow-origins=* --user-data-dir=/tmp/chrome-debug
Original error: {}"#,
                self.endpoint, e
            ))
        })?;

        let response_text = response
            .text()
            .await
            .map_err(|e| Error::launch(format!("Failed to read response: {}", e)))?;

        let target = Self::parse_target(&response_text)?;
        info!("Created page target {}", target.target_id);
        Ok(target)
    }

    /// Close a page target
    pub async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        let url = format!("{}/json/close/{}", self.http_base, target_id);
        debug!("Closing target via HTTP API: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::internal(format!("Failed to close target {}: {}", target_id, e)))?;

        if !response.status().is_success() {
            return Err(Error::internal(format!(
                "Closing target {} returned HTTP {}",
                target_id,
                response.status()
            )));
        }
        Ok(())
    }

    /// Parse a /json/new response body
    fn parse_target(body: &str) -> Result<TargetInfo, Error> {
        let target_json: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            Error::launch(format!(
                "Failed to parse new target response: {} (response was: {})",
                e, body
            ))
        })?;

        let text = |name: &str| target_json.get(name).and_then(|v| v.as_str());

        let websocket_url = text("webSocketDebuggerUrl")
            .ok_or_else(|| Error::launch("No webSocketDebuggerUrl in new target response"))?;

        Ok(TargetInfo {
            target_id: text("id")
                .map(str::to_string)
                .unwrap_or_else(|| websocket_url.rsplit('/').next().unwrap_or("unknown").to_string()),
            url: text("url").unwrap_or("about:blank").to_string(),
            websocket_url: websocket_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_conversion() {
        let endpoint = DevToolsEndpoint::new("ws://localhost:9222/");
        assert_eq!(endpoint.http_base(), "http://localhost:9222");

        let endpoint = DevToolsEndpoint::new("wss://remote.example.com:9222");
        assert_eq!(endpoint.http_base(), "https://remote.example.com:9222");

        assert_eq!(DevToolsEndpoint::local(41234).http_base(), "http://127.0.0.1:41234");
    }

    #[test]
    fn test_parse_target() {
        let target = DevToolsEndpoint::parse_target(
            r#"{"id":"ABC","type":"page","url":"about:blank","webSocketDebuggerUrl":"ws://127.0.0.1:9222/devtools/page/ABC"}"#,
        )
        .unwrap();
        assert_eq!(target.target_id, "ABC");
        assert_eq!(target.websocket_url, "ws://127.0.0.1:9222/devtools/page/ABC");
    }

    #[test]
    fn test_parse_target_without_socket() {
        let result = DevToolsEndpoint::parse_target(r#"{"id":"ABC"}"#);
        assert!(matches!(result, Err(Error::Launch(_))));
    }
}
