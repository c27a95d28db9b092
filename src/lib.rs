//! SNULinks smoke: browser smoke tests for the SNULinks university portal
//!
//! This library drives Chrome over the DevTools Protocol, waits for portal
//! elements, checks them and records highlighted screenshots as evidence.

pub mod error;
pub mod config;

pub mod cdp;
pub mod locator;
pub mod wait;
pub mod session;
pub mod evidence;
pub mod runner;
pub mod portal;

// Re-exports
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
