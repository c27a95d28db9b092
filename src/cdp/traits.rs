//! CDP (Chrome DevTools Protocol) layer traits
//!
//! This module defines the abstract interfaces for CDP communication.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<CdpError>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

/// CDP connection trait
///
/// Represents a WebSocket connection to a Chrome DevTools Protocol target.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpResponse, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// CDP client trait
///
/// High-level CDP client that provides typed methods for the operations the
/// harness drives: navigation, script execution against the page or a single
/// remote object, and viewport capture.
#[async_trait]
pub trait CdpClient: Send + Sync + std::fmt::Debug {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection>;

    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<NavigationResult, crate::Error>;

    /// Evaluate JavaScript in the page and return the value
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, crate::Error>;

    /// Evaluate JavaScript and keep the result as a remote object
    ///
    /// Returns `None` when the expression yields `null` or `undefined`.
    async fn evaluate_handle(&self, script: &str) -> Result<Option<String>, crate::Error>;

    /// Call a function with `this` bound to a remote object
    async fn call_function_on(
        &self,
        object_id: &str,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<EvaluationResult, crate::Error>;

    /// Release a remote object
    async fn release_object(&self, object_id: &str) -> Result<(), crate::Error>;

    /// Capture a PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), crate::Error>;

    /// Call a raw CDP method (returns JSON Value)
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, crate::Error>;
}

/// Navigation result
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// Frame that navigated
    pub frame_id: Option<String>,
    /// Loader ID (absent for same-document navigations)
    pub loader_id: Option<String>,
    /// URL requested
    pub url: String,
}

/// JavaScript evaluation result
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// String value
    String(String),
    /// Number value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Null value
    Null,
    /// Object/Array (as JSON)
    Object(Value),
}

impl EvaluationResult {
    /// String payload, `None` for `null`
    pub fn into_string(self) -> Result<Option<String>, crate::Error> {
        match self {
            EvaluationResult::String(s) => Ok(Some(s)),
            EvaluationResult::Null => Ok(None),
            other => Err(crate::Error::script_execution_failed(format!(
                "Expected a string result, got {:?}",
                other
            ))),
        }
    }

    /// Boolean payload
    pub fn into_bool(self) -> Result<bool, crate::Error> {
        match self {
            EvaluationResult::Bool(b) => Ok(b),
            other => Err(crate::Error::script_execution_failed(format!(
                "Expected a boolean result, got {:?}",
                other
            ))),
        }
    }
}

/// Browser version information
#[derive(Debug, Clone)]
pub struct BrowserVersion {
    /// Protocol version
    pub protocol_version: String,
    /// Product name
    pub product: String,
}

/// Page target created over the DevTools HTTP interface
#[derive(Debug, Clone)]
pub struct TargetInfo {
    /// Target ID
    pub target_id: String,
    /// Target URL
    pub url: String,
    /// WebSocket URL to attach a client to
    pub websocket_url: String,
}
