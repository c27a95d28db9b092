//! Test outcomes and the evidence each one calls for

use std::fmt;

use crate::Error;

/// Highlight color for passing evidence
pub const PASS_COLOR: &str = "green";

/// Highlight color for failing evidence
pub const FAIL_COLOR: &str = "red";

/// How a test ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Check completed
    Passed,
    /// A wait ran out of time
    FailedTimeout(String),
    /// A content check did not hold
    FailedAssertion(String),
    /// Script error, lost connection or panic
    FailedError(String),
    /// No session could be opened
    SetupFailed(String),
}

/// Screenshot to take for an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidencePlan {
    /// Highlight color, `None` for an untagged capture
    pub color: Option<&'static str>,
    /// Highlight the element the check last located
    pub include_element: bool,
}

impl Outcome {
    /// Classify the error a check failed with
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Timeout(_) => Outcome::FailedTimeout(error.to_string()),
            Error::Assertion(_) => Outcome::FailedAssertion(error.to_string()),
            _ => Outcome::FailedError(error.to_string()),
        }
    }

    /// Whether the test passed
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Short label for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::FailedTimeout(_) => "failed-timeout",
            Outcome::FailedAssertion(_) => "failed-assertion",
            Outcome::FailedError(_) => "failed-error",
            Outcome::SetupFailed(_) => "setup-failed",
        }
    }

    /// Failure detail, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Passed => None,
            Outcome::FailedTimeout(msg)
            | Outcome::FailedAssertion(msg)
            | Outcome::FailedError(msg)
            | Outcome::SetupFailed(msg) => Some(msg),
        }
    }

    /// Evidence to capture; `None` when there is no session to capture from
    pub fn evidence_plan(&self) -> Option<EvidencePlan> {
        match self {
            Outcome::Passed => Some(EvidencePlan {
                color: Some(PASS_COLOR),
                include_element: true,
            }),
            Outcome::FailedTimeout(_) => Some(EvidencePlan {
                color: None,
                include_element: false,
            }),
            Outcome::FailedAssertion(_) | Outcome::FailedError(_) => Some(EvidencePlan {
                color: Some(FAIL_COLOR),
                include_element: true,
            }),
            Outcome::SetupFailed(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}: {}", self.label(), msg),
            None => write!(f, "{}", self.label()),
        }
    }
}
