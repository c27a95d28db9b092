//! # SNULinks smoke suite
//!
//! Runs the portal checks against a real Chrome and exits non-zero if any
//! of them fails.
//!
//! ## Environment variables
//! - `SNULINKS_BASE_URL`: page every test starts on (default: https://snulinks.snu.edu.in/)
//! - `SNULINKS_HEADLESS`: run Chrome without a window, `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off` (default: false)
//! - `SNULINKS_CDP_ENDPOINT`: attach to a running Chrome instead of launching one
//! - `SNULINKS_SCREENSHOT_DIR`: evidence directory (default: target/screenshots)
//! - `RUST_LOG`: log filter, overrides the configured level

use anyhow::Context;
use clap::Parser;
use snulinks_smoke::{
    config::Config,
    portal,
    runner::{matches_filter, TestRunner},
    session::ChromeLauncher,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Browser smoke tests for the SNULinks portal
#[derive(Debug, Parser)]
#[command(name = "snulinks-smoke", version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SNULINKS_CONFIG")]
    config: Option<PathBuf>,

    /// Page every test starts on
    #[arg(long)]
    base_url: Option<String>,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Wait timeout per condition, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory evidence screenshots are written to
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    /// Attach to a running Chrome (e.g. ws://localhost:9222)
    #[arg(long)]
    cdp_endpoint: Option<String>,

    /// Only run tests whose name contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// List tests without running them
    #[arg(long)]
    list: bool,
}

impl Args {
    /// Overlay command line flags onto the loaded configuration
    fn apply(&self, config: &mut Config) -> snulinks_smoke::Result<()> {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.headless {
            config.headless = true;
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_seconds = timeout;
        }
        if let Some(dir) = &self.screenshot_dir {
            config.screenshot_dir = dir.clone();
        }
        if let Some(endpoint) = &self.cdp_endpoint {
            config.cdp_endpoint = Some(endpoint.clone());
        }
        config.validate()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config).context("applying command line flags")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let checks = portal::all_checks();

    if args.list {
        for check in checks.iter().filter(|c| matches_filter(c.name(), args.filter.as_deref())) {
            println!("{}", check.name());
        }
        return Ok(ExitCode::SUCCESS);
    }

    info!(
        "SNULinks smoke suite v{} against {} (headless: {})",
        snulinks_smoke::VERSION,
        config.base_url,
        config.headless
    );

    let runner = TestRunner::new(Arc::new(ChromeLauncher::new()), config);

    let report = tokio::select! {
        report = runner.run_all(&checks, args.filter.as_deref()) => report,
        _ = tokio::signal::ctrl_c() => {
            // Dropping the suite kills any browser it launched
            warn!("Interrupted, aborting suite");
            return Ok(ExitCode::from(130));
        }
    };

    for test in &report.reports {
        match &test.artifact {
            Some(artifact) => println!("{:<45} {:<17} {}", test.name, test.outcome.label(), artifact.path.display()),
            None => println!("{:<45} {}", test.name, test.outcome.label()),
        }
    }
    println!("{} passed, {} failed", report.passed(), report.failed());

    Ok(ExitCode::from(report.exit_code() as u8))
}
