//! Mock Chrome DevTools Protocol server
//!
//! Serves just enough of a page target's WebSocket protocol to drive the real
//! CDP connection, client and page against it without a browser.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use snulinks_smoke::cdp::traits::TargetInfo;
use snulinks_smoke::cdp::{CdpClient, CdpClientImpl, CdpConnection, CdpWebSocketConnection, DevToolsEndpoint};
use snulinks_smoke::evidence::{EvidenceRecorder, EvidenceTag};
use snulinks_smoke::locator::Locator;
use snulinks_smoke::session::{CdpPage, ElementRef, PageContext};
use snulinks_smoke::wait::Waiter;
use snulinks_smoke::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// 1x1 PNG, base64
const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Mock Chrome server
pub struct MockChromeServer {
    addr: String,
    requests: Arc<Mutex<Vec<Value>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockChromeServer {
    /// Start a new mock Chrome server
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                tokio::spawn(Self::handle_connection(stream, Arc::clone(&log)));
                            }
                            Err(_) => break,
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Ok(Self {
            addr: format!("ws://{}/devtools/page/MOCK", addr),
            requests,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Handle a WebSocket connection
    async fn handle_connection(stream: TcpStream, log: Arc<Mutex<Vec<Value>>>) {
        let Ok(ws_stream) = accept_async(stream).await else {
            return;
        };
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        while let Some(Ok(message)) = ws_receiver.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let Ok(req) = serde_json::from_str::<Value>(&text) else {
                continue;
            };
            log.lock().unwrap().push(req.clone());

            // Chrome emits events between responses; the client must skip them
            let event = json!({ "method": "Page.frameStartedLoading", "params": { "frameId": "MOCK" } });
            if ws_sender.send(Message::Text(event.to_string())).await.is_err() {
                break;
            }

            let response = Self::create_cdp_response(&req);
            if ws_sender.send(Message::Text(response.to_string())).await.is_err() {
                break;
            }
        }
    }

    /// Create a CDP response for a request
    fn create_cdp_response(req: &Value) -> Value {
        let method = req.get("method").and_then(|m| m.as_str()).unwrap_or("unknown");
        let id = req.get("id").and_then(|i| i.as_i64()).unwrap_or(0);
        let params = req.get("params").cloned().unwrap_or(Value::Null);
        let param = |name: &str| params.get(name).and_then(Value::as_str).unwrap_or("").to_string();

        let result = match method {
            "Page.enable" | "Runtime.releaseObject" | "Browser.setWindowBounds" => json!({}),
            "Page.navigate" if param("url").contains("unreachable") => json!({
                "frameId": "MOCK",
                "errorText": "net::ERR_NAME_NOT_RESOLVED"
            }),
            "Page.navigate" => json!({ "frameId": "MOCK", "loaderId": "LOADER" }),
            "Browser.getWindowForTarget" => json!({
                "windowId": 7,
                "bounds": { "windowState": "normal" }
            }),
            "Runtime.evaluate" => Self::evaluate(&param("expression"), params.get("returnByValue")),
            "Runtime.callFunctionOn" => Self::call_function_on(&param("functionDeclaration")),
            "Page.captureScreenshot" => json!({ "data": PNG_BASE64 }),
            _ => {
                return json!({
                    "id": id,
                    "error": { "code": -32601, "message": format!("'{}' wasn't found", method) }
                })
            }
        };

        json!({ "id": id, "result": result })
    }

    fn evaluate(expression: &str, return_by_value: Option<&Value>) -> Value {
        if expression == "document.title" {
            return json!({ "result": { "type": "string", "value": "SNULinks" } });
        }
        if expression.contains("throw") {
            return json!({
                "result": { "type": "object", "subtype": "error" },
                "exceptionDetails": {
                    "text": "Uncaught",
                    "exception": { "type": "object", "description": "Error: boom" }
                }
            });
        }
        if return_by_value == Some(&Value::Bool(false)) {
            if expression.contains("missing") {
                return json!({ "result": { "type": "object", "subtype": "null", "value": null } });
            }
            return json!({
                "result": { "type": "object", "subtype": "node", "objectId": "NODE-1" }
            });
        }
        json!({ "result": { "type": "undefined" } })
    }

    fn call_function_on(declaration: &str) -> Value {
        if declaration.contains("getComputedStyle") {
            json!({ "result": { "type": "boolean", "value": true } })
        } else if declaration.contains("innerText") {
            json!({ "result": { "type": "string", "value": "University ERP" } })
        } else if declaration.contains("getAttribute('style')") {
            json!({ "result": { "type": "object", "subtype": "null", "value": null } })
        } else {
            json!({ "result": { "type": "undefined" } })
        }
    }

    /// WebSocket URL of the mock page target
    pub fn ws_endpoint(&self) -> &str {
        &self.addr
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for one method
    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|req| req["method"] == method)
            .collect()
    }
}

impl Drop for MockChromeServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn client(server: &MockChromeServer) -> CdpClientImpl {
    let connection = CdpWebSocketConnection::new(server.ws_endpoint()).await.unwrap();
    CdpClientImpl::new(connection)
}

async fn page(server: &MockChromeServer) -> CdpPage {
    let client: Arc<dyn CdpClient> = Arc::new(client(server).await);
    let target = TargetInfo {
        target_id: "MOCK".to_string(),
        url: "about:blank".to_string(),
        websocket_url: server.ws_endpoint().to_string(),
    };
    // Nothing listens on the HTTP side; closing the target is expected to fail
    CdpPage::new(target, DevToolsEndpoint::new("http://127.0.0.1:1"), client, None)
}

#[tokio::test]
async fn test_navigate_and_title() {
    let server = MockChromeServer::start().await.unwrap();
    let client = client(&server).await;

    let nav = client.navigate("https://snulinks.snu.edu.in/").await.unwrap();
    assert_eq!(nav.frame_id.as_deref(), Some("MOCK"));

    let title = client.evaluate("document.title", false).await.unwrap();
    assert_eq!(title.into_string().unwrap().as_deref(), Some("SNULinks"));
}

#[tokio::test]
async fn test_navigation_error_text() {
    let server = MockChromeServer::start().await.unwrap();
    let client = client(&server).await;

    let result = client.navigate("https://unreachable.invalid/").await;
    assert!(matches!(result, Err(Error::NavigationFailed(msg)) if msg.contains("ERR_NAME_NOT_RESOLVED")));
}

#[tokio::test]
async fn test_page_exception_is_script_error() {
    let server = MockChromeServer::start().await.unwrap();
    let client = client(&server).await;

    let result = client.evaluate("(() => { throw new Error('boom') })()", false).await;
    assert!(matches!(result, Err(Error::ScriptExecutionFailed(msg)) if msg == "Error: boom"));
}

#[tokio::test]
async fn test_unknown_method_is_cdp_error() {
    let server = MockChromeServer::start().await.unwrap();
    let client = client(&server).await;

    let result = client.call_method("Page.bogus", json!({})).await;
    assert!(matches!(result, Err(Error::Cdp(_))));
}

#[tokio::test]
async fn test_find_element_and_element_calls() {
    let server = MockChromeServer::start().await.unwrap();
    let page = page(&server).await;

    let missing = page.find_element(&Locator::css("#missing")).await.unwrap();
    assert!(missing.is_none());

    let locator = Locator::xpath("//a[contains(normalize-space(), 'University ERP')]");
    let element = page.find_element(&locator).await.unwrap().unwrap();
    assert_eq!(element.id, "NODE-1");

    let element_ref = ElementRef::new(&page, &element);
    assert!(element_ref.is_displayed().await.unwrap());
    assert_eq!(element_ref.text().await.unwrap(), "University ERP");
    assert_eq!(element_ref.style().await.unwrap(), None);
    element_ref.set_style("border: 3px solid green; background: yellow;").await.unwrap();

    let calls = server.requests_for("Runtime.callFunctionOn");
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[3]["params"]["objectId"], "NODE-1");
    assert_eq!(
        calls[3]["params"]["arguments"][0]["value"],
        "border: 3px solid green; background: yellow;"
    );
}

#[tokio::test]
async fn test_maximize_window() {
    let server = MockChromeServer::start().await.unwrap();
    let page = page(&server).await;

    page.maximize_window().await.unwrap();

    let bounds = server.requests_for("Browser.setWindowBounds");
    assert_eq!(bounds.len(), 1);
    assert_eq!(bounds[0]["params"]["windowId"], 7);
    assert_eq!(bounds[0]["params"]["bounds"]["windowState"], "maximized");
}

#[tokio::test]
async fn test_waiter_over_cdp() {
    let server = MockChromeServer::start().await.unwrap();
    let page = page(&server).await;
    let waiter = Waiter::new(Duration::from_secs(2), Duration::from_millis(50));

    page.navigate("https://snulinks.snu.edu.in/").await.unwrap();
    waiter.title_is(&page, "SNULinks").await.unwrap();
    waiter
        .visibility_of_element_located(&page, &Locator::link_text("Academic Research"))
        .await
        .unwrap();

    let result = waiter.presence_of_element_located(&page, &Locator::css("#missing")).await;
    assert!(matches!(result, Err(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn test_capture_over_cdp() {
    let server = MockChromeServer::start().await.unwrap();
    let page = page(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let recorder = EvidenceRecorder::new(dir.path().join("screenshots"));

    let element = page.find_element(&Locator::css("a.login-btn")).await.unwrap().unwrap();
    let artifact = recorder
        .capture(&page, "testLoginLinkIsPresent", Some(&element), Some("green"))
        .await
        .unwrap();

    assert_eq!(artifact.tag, EvidenceTag::Pass);
    let bytes = std::fs::read(&artifact.path).unwrap();
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

    // highlight set, then the attribute removed since there was none
    let calls: Vec<String> = server
        .requests_for("Runtime.callFunctionOn")
        .iter()
        .map(|c| c["params"]["functionDeclaration"].as_str().unwrap_or("").to_string())
        .collect();
    assert_eq!(calls.len(), 3);
    assert!(calls[1].contains("setAttribute"));
    assert!(calls[2].contains("removeAttribute"));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let server = MockChromeServer::start().await.unwrap();
    let page = page(&server).await;

    // the target close goes to an HTTP endpoint that is not there
    assert!(page.close().await.is_err());
    assert!(!page.is_active());
    assert!(page.close().await.is_ok());
    assert!(matches!(page.title().await, Err(Error::Internal(_))));
}

#[tokio::test]
async fn test_connection_close() {
    let server = MockChromeServer::start().await.unwrap();
    let connection = CdpWebSocketConnection::new(server.ws_endpoint()).await.unwrap();

    assert!(connection.is_active());
    connection.close().await.unwrap();
    assert!(!connection.is_active());
    connection.close().await.unwrap();

    let result = connection.send_command("Page.enable", json!({})).await;
    assert!(matches!(result, Err(Error::WebSocket(_))));
}
