//! # SNULinks portal checks
//!
//! The five smoke checks run against the portal home page, and the locators
//! they use.

pub mod checks;

use crate::runner::SmokeCheck;

pub use checks::{
    FooterAcademicResearchLinkIsPresent, FooterCopyrightText, HomePageTitle, LoginLinkIsPresent,
    UniversityErpLinkIsPresent,
};

/// Portal home page title
pub const EXPECTED_TITLE: &str = "SNULinks";

/// Fragments the footer copyright line must contain, checked in this order
pub const COPYRIGHT_FRAGMENTS: [&str; 3] = [
    "Shiv Nadar (Institution of Eminence Deemed to be University)",
    "2025",
    "©",
];

/// Locators for portal elements
pub mod locators {
    use crate::locator::Locator;

    /// Header login link
    pub fn login_link() -> Locator {
        Locator::xpath("//a[contains(@class, 'login-btn') or contains(normalize-space(), 'Login')]")
    }

    /// "University ERP" link
    pub fn university_erp_link() -> Locator {
        Locator::xpath("//a[contains(normalize-space(), 'University ERP')]")
    }

    /// Footer "Academic Research" link
    pub fn academic_research_link() -> Locator {
        Locator::link_text("Academic Research")
    }

    /// Footer copyright paragraph
    pub fn copyright_text() -> Locator {
        Locator::css("footer p.text-center.text-white")
    }
}

/// Every portal check, in suite order
pub fn all_checks() -> Vec<Box<dyn SmokeCheck>> {
    vec![
        Box::new(HomePageTitle),
        Box::new(LoginLinkIsPresent),
        Box::new(UniversityErpLinkIsPresent),
        Box::new(FooterAcademicResearchLinkIsPresent),
        Box::new(FooterCopyrightText),
    ]
}
