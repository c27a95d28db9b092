//! Common test utilities
//!
//! This module provides shared test helpers and fixtures for all integration tests.

#![allow(dead_code)]

use snulinks_smoke::config::Config;
use snulinks_smoke::evidence::EvidenceArtifact;
use snulinks_smoke::locator::Locator;
use snulinks_smoke::portal::locators;
use snulinks_smoke::session::mock::{MockNode, MockPageScript};
use std::path::Path;
use std::time::Duration;

/// Footer copyright line as the portal renders it
pub const COPYRIGHT_LINE: &str = "© 2025 Shiv Nadar (Institution of Eminence Deemed to be University)";

/// In-memory copy of the SNULinks home page
///
/// The title is set two seconds after load, the ERP link shows up after one
/// second and the footer only renders once scrolled to.
pub fn snulinks_portal() -> MockPageScript {
    MockPageScript::new("SNULinks")
        .title_after(Duration::from_secs(2))
        .node(MockNode::new(locators::login_link()).text("Login").style("color: #fff;"))
        .node(
            MockNode::new(locators::university_erp_link())
                .text("University ERP")
                .appears_after(Duration::from_secs(1)),
        )
        .node(
            MockNode::new(locators::academic_research_link())
                .text("Academic Research")
                .below_fold(),
        )
        .node(copyright_node(&format!("\n  {}  \n", COPYRIGHT_LINE)))
}

/// Footer copyright paragraph with the given text
pub fn copyright_node(text: &str) -> MockNode {
    MockNode::new(locators::copyright_text()).text(text).below_fold()
}

/// Portal whose footer copyright reads `text`
pub fn portal_with_copyright(text: &str) -> MockPageScript {
    snulinks_portal()
        .without(&locators::copyright_text())
        .node(copyright_node(text))
}

/// Portal without the element `locator` finds
pub fn portal_without(locator: &Locator) -> MockPageScript {
    snulinks_portal().without(locator)
}

/// Default configuration writing evidence into `dir`
pub fn test_config(dir: &Path) -> Config {
    Config {
        screenshot_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

/// File name of an artifact
pub fn file_name(artifact: &EvidenceArtifact) -> String {
    artifact
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `name` is `<prefix><yyyyMMdd_HHmmss>.png`
pub fn is_artifact_name(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".png"))
        .is_some_and(is_timestamp)
}

/// Whether `s` looks like `yyyyMMdd_HHmmss`
pub fn is_timestamp(s: &str) -> bool {
    s.len() == 15
        && s.char_indices()
            .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
}

/// Names of the files in `dir`
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_pattern() {
        assert!(is_artifact_name(
            "testHomePageTitle_PASS_20250307_090502.png",
            "testHomePageTitle_PASS_"
        ));
        assert!(!is_artifact_name(
            "testHomePageTitle_PASS_20250307_090502.png",
            "testHomePageTitle_"
        ));
        assert!(!is_artifact_name("testHomePageTitle_2025.png", "testHomePageTitle_"));
    }
}
