//! # Test case runner
//!
//! Every check runs the same way: open a session, execute the check, record
//! evidence for the outcome, close the session. The session is closed exactly
//! once whether the check passes, fails or panics.
//!
//! ## Module structure
//! - `outcome`: outcomes and their evidence plan
//! - `context`: per-test state handed to checks
//! - `assertions`: assertion helpers

pub mod outcome;
pub mod context;
pub mod assertions;

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::evidence::{EvidenceArtifact, EvidenceRecorder};
use crate::session::{BrowserLauncher, Session};
use crate::Result;

pub use context::CheckContext;
pub use outcome::{EvidencePlan, Outcome};

/// One functional check
#[async_trait]
pub trait SmokeCheck: Send + Sync {
    /// Test name, also the evidence file base name
    fn name(&self) -> &str;

    /// Run the check against a session sitting on the base page
    ///
    /// Elements recorded with [`CheckContext::examine`] are highlighted in the
    /// evidence.
    async fn execute(&self, ctx: &mut CheckContext) -> Result<()>;
}

/// Result of one test
#[derive(Debug, Clone)]
pub struct TestReport {
    /// Test name
    pub name: String,
    /// How it ended
    pub outcome: Outcome,
    /// Screenshot written for it, if any
    pub artifact: Option<EvidenceArtifact>,
    /// Wall time from setup to teardown
    pub duration: Duration,
}

/// Results of a suite run
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    /// One report per test, in run order
    pub reports: Vec<TestReport>,
}

impl SuiteReport {
    /// Tests that passed
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_success()).count()
    }

    /// Tests that did not pass
    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    /// Whether every test passed
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Runs checks, one fresh session each
#[derive(Debug, Clone)]
pub struct TestRunner {
    launcher: Arc<dyn BrowserLauncher>,
    config: Config,
    recorder: EvidenceRecorder,
}

impl TestRunner {
    /// Create a runner
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: Config) -> Self {
        let recorder = EvidenceRecorder::from_config(&config);
        Self {
            launcher,
            config,
            recorder,
        }
    }

    /// Evidence recorder used for every test
    pub fn recorder(&self) -> &EvidenceRecorder {
        &self.recorder
    }

    /// Run one check
    pub async fn run(&self, check: &dyn SmokeCheck) -> TestReport {
        let name = check.name();
        let started = Instant::now();

        let session = match Session::open(self.launcher.as_ref(), &self.config).await {
            Ok(session) => session,
            Err(e) => {
                error!(test = name, outcome = "setup-failed", "Could not open session: {}", e);
                return TestReport {
                    name: name.to_string(),
                    outcome: Outcome::SetupFailed(e.to_string()),
                    artifact: None,
                    duration: started.elapsed(),
                };
            }
        };

        let mut ctx = CheckContext::new(name, session);
        info!(test = name, "Running test");

        let outcome = match AssertUnwindSafe(check.execute(&mut ctx)).catch_unwind().await {
            Ok(Ok(())) => Outcome::Passed,
            Ok(Err(e)) => Outcome::from_error(&e),
            Err(panic) => Outcome::FailedError(format!("check panicked: {}", panic_message(panic.as_ref()))),
        };

        match &outcome {
            Outcome::Passed => info!(test = name, outcome = outcome.label(), "Test passed"),
            Outcome::FailedTimeout(msg) => {
                warn!(test = name, outcome = outcome.label(), "Test failed: {}", msg)
            }
            other => error!(test = name, outcome = other.label(), "Test failed: {}", other),
        }

        let artifact = match outcome.evidence_plan() {
            Some(plan) => {
                let element = if plan.include_element { ctx.examined() } else { None };
                self.recorder.capture(ctx.page(), name, element, plan.color).await
            }
            None => None,
        };

        ctx.into_session().close().await;

        TestReport {
            name: name.to_string(),
            outcome,
            artifact,
            duration: started.elapsed(),
        }
    }

    /// Run every check whose name contains `filter`, in order
    pub async fn run_all(&self, checks: &[Box<dyn SmokeCheck>], filter: Option<&str>) -> SuiteReport {
        let mut report = SuiteReport::default();

        for check in checks.iter().filter(|c| matches_filter(c.name(), filter)) {
            report.reports.push(self.run(check.as_ref()).await);
        }

        info!(
            passed = report.passed(),
            failed = report.failed(),
            "Suite finished"
        );
        report
    }
}

/// Whether a test name is selected by a name-substring filter
pub fn matches_filter(name: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| name.contains(f))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
