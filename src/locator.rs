//! Element locators
//!
//! A [`Locator`] is a strategy plus a selector string. It renders to a single
//! JavaScript expression that evaluates to the first matching element or
//! `null`, so every driver can resolve it the same way.

use std::fmt;

/// Lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Exact visible text of an `<a>` element
    LinkText,
    /// Tag name
    TagName,
}

/// Immutable description of how to find a DOM element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    /// Locate by CSS selector
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// Locate by XPath expression
    pub fn xpath<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    /// Locate a link by its exact visible text
    pub fn link_text<S: Into<String>>(text: S) -> Self {
        Self::new(Strategy::LinkText, text)
    }

    /// Locate by tag name
    pub fn tag_name<S: Into<String>>(tag: S) -> Self {
        Self::new(Strategy::TagName, tag)
    }

    fn new<S: Into<String>>(strategy: Strategy, selector: S) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    /// Lookup strategy
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Selector string
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// JavaScript expression yielding the first match or `null`
    pub fn query_expression(&self) -> String {
        let literal = js_string(&self.selector);
        match self.strategy {
            Strategy::Css => format!("document.querySelector({})", literal),
            Strategy::XPath => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                literal
            ),
            Strategy::LinkText => format!(
                "(() => {{ const text = {}; \
                 for (const a of document.querySelectorAll('a')) {{ \
                 if ((a.innerText || a.textContent || '').trim() === text) return a; \
                 }} return null; }})()",
                literal
            ),
            Strategy::TagName => format!("document.getElementsByTagName({}).item(0)", literal),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            Strategy::Css => "By.cssSelector",
            Strategy::XPath => "By.xpath",
            Strategy::LinkText => "By.linkText",
            Strategy::TagName => "By.tagName",
        };
        write!(f, "{}: {}", strategy, self.selector)
    }
}

/// Quote a string as a JavaScript literal
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
