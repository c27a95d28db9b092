//! CDP client implementation
//!
//! This module provides a high-level CDP client with typed methods for common operations.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::Arc;
use tracing::{debug, info};

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => EvaluationResult::Number(
                obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0),
            ),
            "boolean" => EvaluationResult::Bool(
                obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false),
            ),
            "undefined" => EvaluationResult::Null,
            "object" if obj.subtype.as_deref() == Some("null") => EvaluationResult::Null,
            "object" | "function" | "bigint" | "symbol" => {
                EvaluationResult::Object(obj.value.clone().unwrap_or(serde_json::Value::Null))
            }
            other => {
                debug!("parse_remote_object: unknown type '{}', returning Null", other);
                EvaluationResult::Null
            }
        }
    }

    /// Turn a `Runtime.*` response into its remote object, surfacing page exceptions
    fn into_remote_object(result: serde_json::Value) -> Result<RemoteObject, Error> {
        let response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse EvaluateResponse: {}", e)))?;

        if let Some(exception) = response.exception_details {
            return Err(Error::script_execution_failed(exception.message()));
        }

        Ok(response.result)
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("Navigating to {}", url);

        let params = NavigateParams {
            url: url.to_string(),
        };

        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await?;

        let response: NavigateResponse = serde_json::from_value(result).unwrap_or_default();

        if let Some(error_text) = response.error_text.filter(|t| !t.is_empty()) {
            return Err(Error::navigation_failed(format!("{}: {}", url, error_text)));
        }

        Ok(NavigationResult {
            frame_id: response.frame_id,
            loader_id: response.loader_id,
            url: url.to_string(),
        })
    }

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        debug!("Evaluating script: {}", script);

        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let remote_obj = Self::into_remote_object(result)?;
        Ok(Self::parse_remote_object(&remote_obj))
    }

    /// Evaluate JavaScript and keep the result as a remote object
    async fn evaluate_handle(&self, script: &str) -> Result<Option<String>, Error> {
        debug!("Evaluating handle: {}", script);

        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(false),
            return_by_value: Some(false),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let remote_obj = Self::into_remote_object(result)?;
        if remote_obj.subtype.as_deref() == Some("null") {
            return Ok(None);
        }
        Ok(remote_obj.object_id)
    }

    /// Call a function with `this` bound to a remote object
    async fn call_function_on(
        &self,
        object_id: &str,
        function_declaration: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<EvaluationResult, Error> {
        let params = CallFunctionOnParams {
            function_declaration: function_declaration.to_string(),
            object_id: object_id.to_string(),
            arguments: args.into_iter().map(|value| CallArgument { value }).collect(),
            return_by_value: true,
            await_promise: false,
        };

        let result = self
            .call_method("Runtime.callFunctionOn", serde_json::to_value(params)?)
            .await?;

        let remote_obj = Self::into_remote_object(result)?;
        Ok(Self::parse_remote_object(&remote_obj))
    }

    /// Release a remote object
    async fn release_object(&self, object_id: &str) -> Result<(), Error> {
        self.call_method(
            "Runtime.releaseObject",
            serde_json::json!({ "objectId": object_id }),
        )
        .await?;
        Ok(())
    }

    /// Capture a PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        debug!("Capturing screenshot");

        let params = ScreenshotParams {
            format: "png".to_string(),
        };

        let result = self
            .call_method("Page.captureScreenshot", serde_json::to_value(params)?)
            .await?;

        let data = result
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No data in screenshot result"))?;

        BASE64
            .decode(data)
            .map_err(|e| Error::cdp(format!("Failed to decode screenshot: {}", e)))
    }

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        debug!("Enabling domain: {}", domain);

        let method = format!("{}.enable", domain);
        self.call_method(&method, serde_json::json!({})).await?;

        Ok(())
    }

    /// Call a raw CDP method
    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;

        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }
}
