//! OCR stage: turn an image into raw text.
//!
//! The crate does no character recognition of its own. [`OcrEngine`] is
//! the seam: the default [`TesseractEngine`] shells out to the
//! `tesseract` executable, and tests or embedders can plug in anything
//! that produces text for an image path.

use crate::error::GradeSenseError;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info};

/// Boxed future returned by [`OcrEngine::recognize`].
pub type OcrFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GradeSenseError>> + Send + 'a>>;

/// Something that reads text off an image.
pub trait OcrEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Recognise the text in `image` using the given language pack(s),
    /// e.g. `"eng"` or `"eng+tam"`.
    fn recognize<'a>(&'a self, image: &'a Path, language: &'a str) -> OcrFuture<'a>;
}

/// Runs `tesseract <image> stdout -l <language>` as a subprocess.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    async fn run(&self, image: &Path, language: &str) -> Result<String, GradeSenseError> {
        let start = Instant::now();
        debug!("Running {} on {} (lang={})", self.command, image.display(), language);

        let child = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GradeSenseError::OcrUnavailable {
                command: self.command.clone(),
                detail: e.to_string(),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GradeSenseError::OcrTimeout {
                path: image.to_path_buf(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| GradeSenseError::OcrFailed {
                path: image.to_path_buf(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GradeSenseError::OcrFailed {
                path: image.to_path_buf(),
                detail: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(
            "OCR produced {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", Duration::from_secs(60))
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        &self.command
    }

    fn recognize<'a>(&'a self, image: &'a Path, language: &'a str) -> OcrFuture<'a> {
        Box::pin(self.run(image, language))
    }
}
