//! # Chrome DevTools Protocol (CDP) layer
//!
//! Talks to Chrome over its DevTools WebSocket and HTTP interfaces.
//!
//! ## Module structure
//! - `traits`: core trait definitions for CDP operations
//! - `types`: CDP wire types
//! - `connection`: WebSocket connection
//! - `client`: typed CDP client
//! - `browser`: DevTools HTTP endpoint (version, targets)
//! - `launcher`: Chrome process management
//!
//! ## Example
//! ```rust,no_run
//! use snulinks_smoke::cdp::{CdpClient, CdpClientImpl, CdpWebSocketConnection, DevToolsEndpoint};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let endpoint = DevToolsEndpoint::new("ws://localhost:9222");
//! let target = endpoint.new_target("about:blank").await?;
//! let connection = CdpWebSocketConnection::new(target.websocket_url).await?;
//! let client = CdpClientImpl::new(connection);
//!
//! let result = client.navigate("https://snulinks.snu.edu.in/").await?;
//! println!("Navigated to: {}", result.url);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod launcher;

pub use traits::{
    CdpConnection, CdpClient, CdpResponse, CdpError,
    NavigationResult, EvaluationResult,
    BrowserVersion, TargetInfo,
};

// Re-export implementation structs
pub use connection::CdpWebSocketConnection;
pub use client::CdpClientImpl;
pub use browser::DevToolsEndpoint;
pub use launcher::ChromeProcess;
