//! # Browser session layer
//!
//! Opens one browser page per test, keeps it on the portal's base page and
//! tears it down exactly once.
//!
//! ## Core concepts
//! - **BrowserLauncher**: produces a fresh page per session
//! - **PageContext**: the page a session drives (navigation, lookup, scripts, screenshots)
//! - **ElementHandle** / **ElementRef**: a located DOM node and the operations on it
//! - **Session**: a page plus the wait policy shared by every condition in a test
//!
//! ## Module structure
//! - `traits`: core trait definitions
//! - `lifecycle`: session open/close
//! - `browser`: Chrome launcher
//! - `page`: CDP page implementation
//! - `element`: element operations
//! - `scripts`: JavaScript run inside the page
//! - `mock`: scripted in-memory page for testing
//!
//! ## Example
//! ```rust,no_run
//! use snulinks_smoke::config::Config;
//! use snulinks_smoke::session::{ChromeLauncher, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::open(&ChromeLauncher::new(), &Config::default()).await?;
//! println!("Title: {}", session.page().title().await?);
//! session.close().await;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod lifecycle;
pub mod browser;
pub mod page;
pub mod element;
pub mod scripts;
pub mod mock;

pub use traits::{
    BrowserLauncher, PageContext, BrowserOptions, ElementHandle, EvaluationResult,
};

// Re-export implementation structs
pub use lifecycle::Session;
pub use browser::ChromeLauncher;
pub use page::CdpPage;
pub use element::ElementRef;
