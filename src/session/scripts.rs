//! JavaScript run inside the page
//!
//! Element functions are called with `this` bound to the element.

/// Document title
pub const DOCUMENT_TITLE: &str = "document.title";

/// Scroll the window to the bottom of the document
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Whether the element is rendered with a non-empty box
pub const IS_DISPLAYED: &str = r#"function() {
    if (!this.isConnected) return false;
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || style.visibility === 'collapse') return false;
    if (Number(style.opacity) === 0) return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

/// Rendered text of the element
pub const INNER_TEXT: &str = "function() { return this.innerText ?? this.textContent ?? ''; }";

/// Raw `style` attribute, `null` when absent
pub const GET_STYLE: &str = "function() { return this.getAttribute('style'); }";

/// Replace the `style` attribute
pub const SET_STYLE: &str = "function(style) { this.setAttribute('style', style); }";

/// Drop the `style` attribute
pub const REMOVE_STYLE: &str = "function() { this.removeAttribute('style'); }";

/// Align the element to the top of the viewport
pub const SCROLL_INTO_VIEW: &str = "function() { this.scrollIntoView(true); }";
