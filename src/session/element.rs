//! Element operations
//!
//! Thin wrapper binding an [`ElementHandle`] to the page it came from.

use serde_json::json;

use super::scripts;
use super::traits::{ElementHandle, PageContext};
use crate::Error;

/// Element reference
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    page: &'a dyn PageContext,
    handle: &'a ElementHandle,
}

impl<'a> ElementRef<'a> {
    /// Bind a handle to its page
    pub fn new(page: &'a dyn PageContext, handle: &'a ElementHandle) -> Self {
        Self { page, handle }
    }

    /// Whether the element is rendered
    pub async fn is_displayed(&self) -> Result<bool, Error> {
        self.page
            .call_function_on(self.handle, scripts::IS_DISPLAYED, vec![])
            .await?
            .into_bool()
    }

    /// Rendered text
    pub async fn text(&self) -> Result<String, Error> {
        let text = self
            .page
            .call_function_on(self.handle, scripts::INNER_TEXT, vec![])
            .await?
            .into_string()?;
        Ok(text.unwrap_or_default())
    }

    /// Inline `style` attribute, `None` when the element has none
    pub async fn style(&self) -> Result<Option<String>, Error> {
        self.page
            .call_function_on(self.handle, scripts::GET_STYLE, vec![])
            .await?
            .into_string()
    }

    /// Overwrite the inline `style` attribute
    pub async fn set_style(&self, style: &str) -> Result<(), Error> {
        self.page
            .call_function_on(self.handle, scripts::SET_STYLE, vec![json!(style)])
            .await?;
        Ok(())
    }

    /// Remove the inline `style` attribute
    pub async fn remove_style(&self) -> Result<(), Error> {
        self.page
            .call_function_on(self.handle, scripts::REMOVE_STYLE, vec![])
            .await?;
        Ok(())
    }

    /// Scroll the element into view
    pub async fn scroll_into_view(&self) -> Result<(), Error> {
        self.page
            .call_function_on(self.handle, scripts::SCROLL_INTO_VIEW, vec![])
            .await?;
        Ok(())
    }
}
