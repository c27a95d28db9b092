//! Mock session implementation for testing
//!
//! A scripted in-memory page. Elements and the title can be set to appear
//! some time after navigation, footer content can require scrolling before it
//! counts as displayed, and individual driver calls can be made to fail.
//! Timing follows the tokio clock, so tests can run it paused.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use super::scripts;
use super::traits::{BrowserLauncher, BrowserOptions, ElementHandle, EvaluationResult, PageContext};
use crate::locator::Locator;
use crate::Error;

/// Minimal 1x1 PNG returned by mock screenshots
pub const MOCK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, // IHDR length
    0x49, 0x48, 0x44, 0x52, // IHDR
    0x00, 0x00, 0x00, 0x01, // Width: 1
    0x00, 0x00, 0x00, 0x01, // Height: 1
    0x08, 0x02, 0x00, 0x00, 0x00, // Bit depth: 8, Color type: 2 (RGB)
    0x90, 0x77, 0x53, 0xDE, // CRC
];

/// One scripted DOM node
#[derive(Debug, Clone)]
pub struct MockNode {
    locator: Locator,
    text: String,
    style: Option<String>,
    appears_after: Duration,
    visible_after: Option<Duration>,
    below_fold: bool,
}

impl MockNode {
    /// Node present and displayed as soon as the page loads
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            text: String::new(),
            style: None,
            appears_after: Duration::ZERO,
            visible_after: Some(Duration::ZERO),
            below_fold: false,
        }
    }

    /// Rendered text
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Initial inline style attribute
    pub fn style<S: Into<String>>(mut self, style: S) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Insert the node into the DOM this long after navigation
    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    /// Report the node displayed only this long after navigation
    pub fn visible_after(mut self, delay: Duration) -> Self {
        self.visible_after = Some(delay);
        self
    }

    /// Never report the node displayed
    pub fn hidden(mut self) -> Self {
        self.visible_after = None;
        self
    }

    /// Lazily rendered until the page is scrolled to it
    pub fn below_fold(mut self) -> Self {
        self.below_fold = true;
        self
    }
}

/// What a mock page contains and which calls fail
#[derive(Debug, Clone)]
pub struct MockPageScript {
    /// Title once loaded
    pub title: String,
    /// Delay after navigation before the title is set
    pub title_after: Duration,
    /// DOM nodes, in document order
    pub nodes: Vec<MockNode>,
    /// `navigate` fails
    pub fail_navigation: bool,
    /// `maximize_window` fails
    pub fail_maximize: bool,
    /// The driver has no screenshot capability
    pub screenshots_unsupported: bool,
    /// `screenshot` fails
    pub fail_screenshot: bool,
    /// Reading an inline style raises a script error
    pub fail_style_read: bool,
    /// `close` fails after releasing the page
    pub fail_close: bool,
    /// Each element lookup stalls this long before answering
    pub lookup_delay: Duration,
}

impl MockPageScript {
    /// Page with the given title and an immediately present `body`
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            title_after: Duration::ZERO,
            nodes: vec![MockNode::new(Locator::tag_name("body"))],
            fail_navigation: false,
            fail_maximize: false,
            screenshots_unsupported: false,
            fail_screenshot: false,
            fail_style_read: false,
            fail_close: false,
            lookup_delay: Duration::ZERO,
        }
    }

    /// Add a node
    pub fn node(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Drop every node matching the locator
    pub fn without(mut self, locator: &Locator) -> Self {
        self.nodes.retain(|node| &node.locator != locator);
        self
    }

    /// Set the title only this long after navigation
    pub fn title_after(mut self, delay: Duration) -> Self {
        self.title_after = delay;
        self
    }
}

/// One captured screenshot
#[derive(Debug, Clone, Default)]
pub struct ScreenshotRecord {
    /// Inline style of every node at capture time, in document order
    pub styles: Vec<Option<String>>,
}

#[derive(Debug)]
struct PageState {
    loaded_at: Option<Instant>,
    url: Option<String>,
    maximized: bool,
    scrolled_to_bottom: bool,
    scrolled_into_view: Vec<bool>,
    styles: Vec<Option<String>>,
    screenshots: Vec<ScreenshotRecord>,
}

/// Mock page context
#[derive(Debug)]
pub struct MockPage {
    id: String,
    script: MockPageScript,
    state: Mutex<PageState>,
    is_active: AtomicBool,
    close_calls: AtomicUsize,
    closed_total: Arc<AtomicUsize>,
}

impl MockPage {
    /// Create a new mock page
    pub fn new(script: MockPageScript) -> Self {
        Self::with_close_counter(script, Arc::new(AtomicUsize::new(0)))
    }

    fn with_close_counter(script: MockPageScript, closed_total: Arc<AtomicUsize>) -> Self {
        let node_count = script.nodes.len();
        let styles = script.nodes.iter().map(|node| node.style.clone()).collect();
        Self {
            id: Uuid::new_v4().to_string(),
            state: Mutex::new(PageState {
                loaded_at: None,
                url: None,
                maximized: false,
                scrolled_to_bottom: false,
                scrolled_into_view: vec![false; node_count],
                styles,
                screenshots: Vec::new(),
            }),
            script,
            is_active: AtomicBool::new(true),
            close_calls: AtomicUsize::new(0),
            closed_total,
        }
    }

    /// URL of the last navigation
    pub fn url(&self) -> Option<String> {
        self.state().url.clone()
    }

    /// Whether `maximize_window` succeeded
    pub fn is_maximized(&self) -> bool {
        self.state().maximized
    }

    /// Current inline style of the first node matching the locator
    pub fn style_of(&self, locator: &Locator) -> Option<String> {
        let index = self.script.nodes.iter().position(|node| &node.locator == locator)?;
        self.state().styles[index].clone()
    }

    /// Current inline style of a located element
    pub fn style_of_element(&self, element: &ElementHandle) -> Option<String> {
        let index = Self::node_index(element).ok()?;
        self.state().styles.get(index).cloned().flatten()
    }

    /// Screenshots taken so far
    pub fn screenshots(&self) -> Vec<ScreenshotRecord> {
        self.state().screenshots.clone()
    }

    /// Number of times `close` was called on this page
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        // A panicking check must not wedge later assertions on the mock
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.is_active.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::internal(format!("Page {} is closed", self.id)))
        }
    }

    fn elapsed(&self) -> Option<Duration> {
        self.state().loaded_at.map(|at| at.elapsed())
    }

    fn node_index(element: &ElementHandle) -> Result<usize, Error> {
        element
            .id
            .strip_prefix("mock-node-")
            .and_then(|index| index.parse().ok())
            .ok_or_else(|| Error::element_not_found(element.id.clone()))
    }

    fn is_displayed(&self, index: usize) -> bool {
        let node = &self.script.nodes[index];
        let Some(elapsed) = self.elapsed() else {
            return false;
        };
        let state = self.state();
        let rendered = !node.below_fold || state.scrolled_to_bottom || state.scrolled_into_view[index];
        rendered
            && elapsed >= node.appears_after
            && node.visible_after.is_some_and(|after| elapsed >= after)
    }
}

#[async_trait]
impl PageContext for MockPage {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        self.ensure_active()?;
        if self.script.fail_navigation {
            return Err(Error::navigation_failed(format!("{}: net::ERR_NAME_NOT_RESOLVED", url)));
        }

        let mut state = self.state();
        state.loaded_at = Some(Instant::now());
        state.url = Some(url.to_string());
        state.scrolled_to_bottom = false;
        Ok(())
    }

    async fn title(&self) -> Result<String, Error> {
        self.ensure_active()?;
        match self.elapsed() {
            Some(elapsed) if elapsed >= self.script.title_after => Ok(self.script.title.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn maximize_window(&self) -> Result<(), Error> {
        self.ensure_active()?;
        if self.script.fail_maximize {
            return Err(Error::cdp("Browser window not found"));
        }
        self.state().maximized = true;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<EvaluationResult, Error> {
        self.ensure_active()?;
        match script {
            scripts::SCROLL_TO_BOTTOM => {
                self.state().scrolled_to_bottom = true;
                Ok(EvaluationResult::Null)
            }
            scripts::DOCUMENT_TITLE => Ok(EvaluationResult::String(self.title().await?)),
            other => Err(Error::script_execution_failed(format!(
                "Mock page cannot evaluate: {}",
                other
            ))),
        }
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementHandle>, Error> {
        self.ensure_active()?;
        if !self.script.lookup_delay.is_zero() {
            tokio::time::sleep(self.script.lookup_delay).await;
        }
        let Some(elapsed) = self.elapsed() else {
            return Ok(None);
        };

        Ok(self
            .script
            .nodes
            .iter()
            .position(|node| &node.locator == locator && elapsed >= node.appears_after)
            .map(|index| ElementHandle::new(format!("mock-node-{}", index), locator.to_string())))
    }

    async fn call_function_on(
        &self,
        element: &ElementHandle,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<EvaluationResult, Error> {
        self.ensure_active()?;
        let index = Self::node_index(element)?;
        if index >= self.script.nodes.len() {
            return Err(Error::element_not_found(element.id.clone()));
        }

        match function_declaration {
            scripts::IS_DISPLAYED => Ok(EvaluationResult::Bool(self.is_displayed(index))),
            scripts::INNER_TEXT => Ok(EvaluationResult::String(self.script.nodes[index].text.clone())),
            scripts::GET_STYLE => {
                if self.script.fail_style_read {
                    return Err(Error::script_execution_failed("Cannot read style of detached node"));
                }
                Ok(match &self.state().styles[index] {
                    Some(style) => EvaluationResult::String(style.clone()),
                    None => EvaluationResult::Null,
                })
            }
            scripts::SET_STYLE => {
                let style = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::script_execution_failed("setAttribute needs a style string"))?;
                self.state().styles[index] = Some(style.to_string());
                Ok(EvaluationResult::Null)
            }
            scripts::REMOVE_STYLE => {
                self.state().styles[index] = None;
                Ok(EvaluationResult::Null)
            }
            scripts::SCROLL_INTO_VIEW => {
                self.state().scrolled_into_view[index] = true;
                Ok(EvaluationResult::Null)
            }
            other => Err(Error::script_execution_failed(format!(
                "Mock page cannot call: {}",
                other
            ))),
        }
    }

    async fn release_element(&self, element: &ElementHandle) -> Result<(), Error> {
        self.ensure_active()?;
        Self::node_index(element).map(|_| ())
    }

    fn supports_screenshots(&self) -> bool {
        !self.script.screenshots_unsupported
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.ensure_active()?;
        if self.script.screenshots_unsupported {
            return Err(Error::internal("Driver does not support screenshots"));
        }
        if self.script.fail_screenshot {
            return Err(Error::cdp("Unable to capture screenshot"));
        }

        let mut state = self.state();
        let record = ScreenshotRecord {
            styles: state.styles.clone(),
        };
        state.screenshots.push(record);
        Ok(MOCK_PNG.to_vec())
    }

    async fn close(&self) -> Result<(), Error> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed_total.fetch_add(1, Ordering::SeqCst);
        self.is_active.store(false, Ordering::SeqCst);

        if self.script.fail_close {
            return Err(Error::internal("Browser process did not exit cleanly"));
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

/// Mock browser launcher
///
/// Hands out a fresh [`MockPage`] per launch and counts opens and closes.
#[derive(Debug)]
pub struct MockLauncher {
    script: MockPageScript,
    fail_launch: bool,
    launched: AtomicUsize,
    closed: Arc<AtomicUsize>,
    pages: Mutex<Vec<Arc<MockPage>>>,
    last_options: Mutex<Option<BrowserOptions>>,
}

impl MockLauncher {
    /// Launcher producing pages that follow `script`
    pub fn new(script: MockPageScript) -> Self {
        Self {
            script,
            fail_launch: false,
            launched: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            pages: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        }
    }

    /// Launcher whose browser never starts
    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(MockPageScript::new(""))
        }
    }

    /// Pages successfully launched
    pub fn launch_count(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    /// `close` calls across every launched page
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Most recently launched page
    pub fn last_page(&self) -> Option<Arc<MockPage>> {
        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }

    /// Options passed to the most recent launch
    pub fn last_options(&self) -> Option<BrowserOptions> {
        self.last_options
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<Arc<dyn PageContext>, Error> {
        *self
            .last_options
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(options.clone());

        if self.fail_launch {
            return Err(Error::launch("session not created: Chrome failed to start"));
        }

        let page = Arc::new(MockPage::with_close_counter(
            self.script.clone(),
            Arc::clone(&self.closed),
        ));
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::clone(&page));
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timed_appearance() {
        let locator = Locator::css("#late");
        let page = MockPage::new(
            MockPageScript::new("SNULinks").node(MockNode::new(locator.clone()).appears_after(Duration::from_secs(2))),
        );

        page.navigate("https://snulinks.snu.edu.in/").await.unwrap();
        assert!(page.find_element(&locator).await.unwrap().is_none());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(page.find_element(&locator).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_nothing_before_navigation() {
        let page = MockPage::new(MockPageScript::new("SNULinks"));
        assert!(page.find_element(&Locator::tag_name("body")).await.unwrap().is_none());
        assert_eq!(page.title().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_below_fold_needs_scroll() {
        let locator = Locator::link_text("Academic Research");
        let page = MockPage::new(MockPageScript::new("SNULinks").node(MockNode::new(locator.clone()).below_fold()));
        page.navigate("about:blank").await.unwrap();

        let element = page.find_element(&locator).await.unwrap().unwrap();
        let displayed = page.call_function_on(&element, scripts::IS_DISPLAYED, vec![]).await.unwrap();
        assert_eq!(displayed, EvaluationResult::Bool(false));

        page.evaluate(scripts::SCROLL_TO_BOTTOM).await.unwrap();
        let displayed = page.call_function_on(&element, scripts::IS_DISPLAYED, vec![]).await.unwrap();
        assert_eq!(displayed, EvaluationResult::Bool(true));
    }

    #[tokio::test]
    async fn test_closed_page_rejects_calls() {
        let launcher = MockLauncher::new(MockPageScript::new("SNULinks"));
        let page = launcher.launch(&BrowserOptions::default()).await.unwrap();

        page.close().await.unwrap();
        assert!(!page.is_active());
        assert!(page.navigate("about:blank").await.is_err());
        assert_eq!(launcher.launch_count(), 1);
        assert_eq!(launcher.close_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_launcher() {
        let launcher = MockLauncher::failing();
        let result = launcher.launch(&BrowserOptions::default()).await;
        assert!(matches!(result, Err(Error::Launch(_))));
        assert_eq!(launcher.launch_count(), 0);
        assert!(launcher.last_options().is_some());
    }
}
