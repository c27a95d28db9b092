//! Screenshot evidence
//!
//! Writes the current viewport to the evidence directory, optionally with an
//! element highlighted for the duration of the capture.

use chrono::Local;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::highlight::{highlight, unhighlight};
use super::naming::{artifact_file_name, artifact_stem, format_timestamp, EvidenceTag};
use crate::config::Config;
use crate::session::{ElementHandle, PageContext};
use crate::{Error, Result};

/// Disambiguators tried before giving up on a file name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A written screenshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceArtifact {
    /// Where the image was written
    pub path: PathBuf,
    /// Test the screenshot belongs to
    pub test_name: String,
    /// Outcome tag in the file name
    pub tag: EvidenceTag,
    /// Capture time, `yyyyMMdd_HHmmss`
    pub timestamp: String,
}

/// Writes screenshots into one evidence directory
#[derive(Debug, Clone)]
pub struct EvidenceRecorder {
    dir: PathBuf,
}

impl EvidenceRecorder {
    /// Create a recorder writing into `dir`
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Recorder for the configured screenshot directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.screenshot_dir.clone())
    }

    /// Capture the viewport for `test_name`
    ///
    /// With both `element` and `color`, the element is highlighted during the
    /// capture and restored afterwards whether or not the write succeeded.
    /// Failures are logged and yield `None`.
    pub async fn capture(
        &self,
        page: &dyn PageContext,
        test_name: &str,
        element: Option<&ElementHandle>,
        color: Option<&str>,
    ) -> Option<EvidenceArtifact> {
        if !page.supports_screenshots() {
            warn!(test = test_name, "Driver does not support screenshots");
            return None;
        }

        let highlighted = match (element, color) {
            (Some(element), Some(color)) => Some((element, highlight(page, element, color).await)),
            _ => None,
        };

        let result = self.write_screenshot(page, test_name, EvidenceTag::from_color(color)).await;

        if let Some((element, snapshot)) = highlighted {
            unhighlight(page, element, snapshot.as_ref()).await;
        }

        match result {
            Ok(artifact) => {
                info!(test = test_name, tag = %artifact.tag, "Screenshot saved: {}", artifact.path.display());
                Some(artifact)
            }
            Err(e) => {
                warn!(test = test_name, "Failed to capture screenshot: {}", e);
                None
            }
        }
    }

    async fn write_screenshot(&self, page: &dyn PageContext, test_name: &str, tag: EvidenceTag) -> Result<EvidenceArtifact> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let bytes = page.screenshot().await?;
        let timestamp = format_timestamp(&Local::now());
        let stem = artifact_stem(test_name, tag, &timestamp);
        let path = self.create_exclusive(&stem, &bytes).await?;

        Ok(EvidenceArtifact {
            path,
            test_name: test_name.to_string(),
            tag,
            timestamp,
        })
    }

    /// Create a new file for `stem`, never overwriting an existing one
    async fn create_exclusive(&self, stem: &str, bytes: &[u8]) -> Result<PathBuf> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(artifact_file_name(stem, attempt));

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    write_or_discard(&path, file, bytes).await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next name", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::internal(format!(
            "No free file name for {} after {} attempts",
            stem, MAX_NAME_ATTEMPTS
        )))
    }
}

/// Write `bytes` to the freshly created `path`, removing it if the write fails
///
/// A truncated image must not be left behind under a valid artifact name.
async fn write_or_discard<W>(path: &Path, mut writer: W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(bytes).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };
    drop(writer);

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!("Could not remove partial {}: {}", path.display(), remove_err);
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use crate::session::mock::{MockNode, MockPage, MockPageScript, MOCK_PNG};

    async fn loaded(script: MockPageScript) -> MockPage {
        let page = MockPage::new(script);
        page.navigate("about:blank").await.unwrap();
        page
    }

    #[tokio::test]
    async fn test_capture_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("target").join("screenshots");
        let recorder = EvidenceRecorder::new(&dir);
        let page = loaded(MockPageScript::new("SNULinks")).await;

        let artifact = recorder.capture(&page, "testHomePageTitle", None, None).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(artifact.path.parent(), Some(dir.as_path()));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), MOCK_PNG);
        assert_eq!(artifact.tag, EvidenceTag::Untagged);
    }

    #[tokio::test]
    async fn test_highlight_is_visible_in_capture_and_restored() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = EvidenceRecorder::new(dir.path());
        let locator = Locator::css("a.login-btn");
        let page = loaded(MockPageScript::new("SNULinks").node(MockNode::new(locator.clone()).style("color: white;"))).await;
        let element = page.find_element(&locator).await.unwrap().unwrap();

        let artifact = recorder
            .capture(&page, "testLoginLinkIsPresent", Some(&element), Some("green"))
            .await
            .unwrap();

        let file_name = artifact.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("testLoginLinkIsPresent_PASS_"));

        let shots = page.screenshots();
        assert_eq!(shots.len(), 1);
        assert_eq!(
            shots[0].styles[1].as_deref(),
            Some("border: 3px solid green; background: yellow;")
        );
        assert_eq!(page.style_of(&locator).as_deref(), Some("color: white;"));
    }

    #[tokio::test]
    async fn test_restores_style_when_capture_fails() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = EvidenceRecorder::new(dir.path());
        let locator = Locator::css("footer p");
        let page = loaded(MockPageScript {
            fail_screenshot: true,
            ..MockPageScript::new("SNULinks").node(MockNode::new(locator.clone()))
        })
        .await;
        let element = page.find_element(&locator).await.unwrap().unwrap();

        let artifact = recorder.capture(&page, "testFooterCopyrightText", Some(&element), Some("red")).await;

        assert!(artifact.is_none());
        assert_eq!(page.style_of(&locator), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_driver_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("shots");
        let recorder = EvidenceRecorder::new(&dir);
        let page = loaded(MockPageScript {
            screenshots_unsupported: true,
            ..MockPageScript::new("SNULinks")
        })
        .await;

        assert!(recorder.capture(&page, "testHomePageTitle", None, Some("green")).await.is_none());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_same_second_captures_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = EvidenceRecorder::new(dir.path());

        let first = recorder.create_exclusive("testHomePageTitle_PASS_20250101_000000", MOCK_PNG).await.unwrap();
        let second = recorder.create_exclusive("testHomePageTitle_PASS_20250101_000000", MOCK_PNG).await.unwrap();

        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("_20250101_000000_1.png"));
    }

    /// Accepts nothing, like a full disk
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::Error::other("No space left on device")))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testHomePageTitle_PASS_20250101_000000.png");
        std::fs::write(&path, b"").unwrap();

        let result = write_or_discard(&path, FullDisk, MOCK_PNG).await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_write_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testHomePageTitle_20250101_000000.png");
        let file = tokio::fs::File::create(&path).await.unwrap();

        write_or_discard(&path, file, MOCK_PNG).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), MOCK_PNG);
    }
}
