//! Per-test state
//!
//! A [`CheckContext`] is built once the session is up and threaded through
//! the check, the evidence capture and the teardown. It remembers the last
//! element the check located so failure evidence can point at it.

use tracing::debug;

use crate::locator::Locator;
use crate::session::{scripts, ElementHandle, ElementRef, PageContext, Session};
use crate::wait::Waiter;
use crate::Result;

/// State of one running test
#[derive(Debug)]
pub struct CheckContext {
    test_name: String,
    session: Session,
    examined: Option<ElementHandle>,
}

impl CheckContext {
    /// Context for `test_name` running on `session`
    pub fn new<S: Into<String>>(test_name: S, session: Session) -> Self {
        Self {
            test_name: test_name.into(),
            session,
            examined: None,
        }
    }

    /// Page the test drives
    pub fn page(&self) -> &dyn PageContext {
        self.session.page()
    }

    /// Wait policy of the session
    pub fn waiter(&self) -> &Waiter {
        self.session.waiter()
    }

    /// Last element the check located
    pub fn examined(&self) -> Option<&ElementHandle> {
        self.examined.as_ref()
    }

    /// Record the element the check is looking at
    pub fn examine(&mut self, element: &ElementHandle) {
        debug!(test = %self.test_name, "Examining {}", element.description);
        self.examined = Some(element.clone());
    }

    /// Operations on a located element
    pub fn element<'a>(&'a self, element: &'a ElementHandle) -> ElementRef<'a> {
        ElementRef::new(self.page(), element)
    }

    /// Current document title
    pub async fn title(&self) -> Result<String> {
        self.page().title().await
    }

    /// Scroll the window to the bottom of the page
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.page().evaluate(scripts::SCROLL_TO_BOTTOM).await?;
        Ok(())
    }

    /// Wait for an element to be in the DOM and remember it
    pub async fn presence_of(&mut self, locator: &Locator) -> Result<ElementHandle> {
        let element = self
            .session
            .waiter()
            .presence_of_element_located(self.session.page(), locator)
            .await?;
        self.examine(&element);
        Ok(element)
    }

    /// Wait for an element to be displayed and remember it
    pub async fn visibility_of_located(&mut self, locator: &Locator) -> Result<ElementHandle> {
        let element = self
            .session
            .waiter()
            .visibility_of_element_located(self.session.page(), locator)
            .await?;
        self.examine(&element);
        Ok(element)
    }

    /// Wait for an already located element to be displayed
    pub async fn visibility_of(&self, element: &ElementHandle) -> Result<()> {
        self.waiter().visibility_of(self.page(), element).await
    }

    /// Wait for the exact document title
    pub async fn title_is(&self, expected: &str) -> Result<()> {
        self.waiter().title_is(self.page(), expected).await
    }

    /// Hand the session back for teardown
    pub fn into_session(self) -> Session {
        self.session
    }
}
