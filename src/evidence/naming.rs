//! Evidence file naming
//!
//! `<test name>[_PASS|_FAIL]_<yyyyMMdd_HHmmss>.png`

use chrono::{DateTime, TimeZone};
use std::fmt;

/// Timestamp layout used in artifact names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Artifact extension
pub const EXTENSION: &str = "png";

/// Outcome marker carried in an artifact name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceTag {
    /// No highlight color, e.g. after a timeout
    Untagged,
    /// Green highlight
    Pass,
    /// Any other highlight color
    Fail,
}

impl EvidenceTag {
    /// Tag implied by a highlight color
    pub fn from_color(color: Option<&str>) -> Self {
        match color {
            None => EvidenceTag::Untagged,
            Some(c) if c.eq_ignore_ascii_case("green") => EvidenceTag::Pass,
            Some(_) => EvidenceTag::Fail,
        }
    }

    /// Suffix appended to the test name
    pub fn suffix(&self) -> &'static str {
        match self {
            EvidenceTag::Untagged => "",
            EvidenceTag::Pass => "_PASS",
            EvidenceTag::Fail => "_FAIL",
        }
    }
}

impl fmt::Display for EvidenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvidenceTag::Untagged => "none",
            EvidenceTag::Pass => "PASS",
            EvidenceTag::Fail => "FAIL",
        };
        write!(f, "{}", name)
    }
}

/// Format a capture time for an artifact name
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// File stem without extension or disambiguator
pub fn artifact_stem(test_name: &str, tag: EvidenceTag, timestamp: &str) -> String {
    format!("{}{}_{}", test_name, tag.suffix(), timestamp)
}

/// File name for the `attempt`-th try at creating an artifact
///
/// The first try uses the plain stem, later ones append `_<attempt>`.
pub fn artifact_file_name(stem: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}.{}", stem, EXTENSION)
    } else {
        format!("{}_{}.{}", stem, attempt, EXTENSION)
    }
}
