//! Element highlighting
//!
//! Both directions are best-effort: failures are logged and never returned.

use tracing::{debug, warn};

use crate::session::{ElementHandle, ElementRef, PageContext};

/// Inline style applied while an element is highlighted
pub fn highlight_style(color: &str) -> String {
    format!("border: 3px solid {}; background: yellow;", color)
}

/// Inline style of an element before it was highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSnapshot {
    /// `None` when the element had no `style` attribute
    pub previous: Option<String>,
}

/// Replace the element's inline style with the highlight style
///
/// Returns the style it had before, or `None` if it could not be read.
pub async fn highlight(page: &dyn PageContext, element: &ElementHandle, color: &str) -> Option<StyleSnapshot> {
    let element_ref = ElementRef::new(page, element);

    let snapshot = match element_ref.style().await {
        Ok(previous) => Some(StyleSnapshot { previous }),
        Err(e) => {
            warn!("Could not read style of {}: {}", element.description, e);
            None
        }
    };

    match element_ref.set_style(&highlight_style(color)).await {
        Ok(()) => debug!("Highlighted {} with {}", element.description, color),
        Err(e) => warn!("Could not highlight {} with {}: {}", element.description, color, e),
    }

    snapshot
}

/// Put back the style captured by [`highlight`]
///
/// Without a captured style the attribute is removed.
pub async fn unhighlight(page: &dyn PageContext, element: &ElementHandle, snapshot: Option<&StyleSnapshot>) {
    let element_ref = ElementRef::new(page, element);

    let result = match snapshot.and_then(|s| s.previous.as_deref()) {
        Some(previous) => element_ref.set_style(previous).await,
        None => element_ref.remove_style().await,
    };

    match result {
        Ok(()) => debug!("Unhighlighted {}", element.description),
        Err(e) => warn!("Could not unhighlight {}: {}", element.description, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use crate::session::mock::{MockNode, MockPage, MockPageScript};

    async fn page_with(node: MockNode, script: impl FnOnce(MockPageScript) -> MockPageScript) -> (MockPage, ElementHandle) {
        let locator = Locator::css("#target");
        let page = MockPage::new(script(MockPageScript::new("SNULinks").node(node)));
        page.navigate("about:blank").await.unwrap();
        let element = page.find_element(&locator).await.unwrap().unwrap();
        (page, element)
    }

    #[tokio::test]
    async fn test_round_trip_restores_style_exactly() {
        let original = "color:  red;font-weight:bold ";
        let (page, element) = page_with(MockNode::new(Locator::css("#target")).style(original), |s| s).await;

        let snapshot = highlight(&page, &element, "green").await;
        assert_eq!(
            page.style_of_element(&element).as_deref(),
            Some("border: 3px solid green; background: yellow;")
        );

        unhighlight(&page, &element, snapshot.as_ref()).await;
        assert_eq!(page.style_of_element(&element).as_deref(), Some(original));
    }

    #[tokio::test]
    async fn test_round_trip_keeps_empty_style() {
        let (page, element) = page_with(MockNode::new(Locator::css("#target")).style(""), |s| s).await;

        let snapshot = highlight(&page, &element, "red").await;
        unhighlight(&page, &element, snapshot.as_ref()).await;
        assert_eq!(page.style_of_element(&element).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_round_trip_removes_added_style() {
        let (page, element) = page_with(MockNode::new(Locator::css("#target")), |s| s).await;

        let snapshot = highlight(&page, &element, "red").await;
        assert_eq!(snapshot, Some(StyleSnapshot { previous: None }));

        unhighlight(&page, &element, snapshot.as_ref()).await;
        assert_eq!(page.style_of_element(&element), None);
    }

    #[tokio::test]
    async fn test_unreadable_style_still_highlights() {
        let (page, element) = page_with(MockNode::new(Locator::css("#target")).style("color: red"), |s| MockPageScript {
            fail_style_read: true,
            ..s
        })
        .await;

        let snapshot = highlight(&page, &element, "red").await;
        assert!(snapshot.is_none());
        assert_eq!(
            page.style_of_element(&element).as_deref(),
            Some("border: 3px solid red; background: yellow;")
        );

        unhighlight(&page, &element, None).await;
        assert_eq!(page.style_of_element(&element), None);
    }

    #[tokio::test]
    async fn test_failures_do_not_propagate() {
        let (page, element) = page_with(MockNode::new(Locator::css("#target")), |s| s).await;
        page.close().await.unwrap();

        assert!(highlight(&page, &element, "green").await.is_none());
        unhighlight(&page, &element, None).await;
    }
}
