//! Configuration for scanning and planning.
//!
//! All behaviour is controlled through [`PlannerConfig`], built via its
//! [`PlannerConfigBuilder`]. Callers set only what they care about and rely
//! on the defaults for the rest.

use crate::error::GradeSenseError;
use crate::grade::ScaleVariant;
use crate::pipeline::extract::DEFAULT_MIN_SUBJECT_LEN;
use crate::pipeline::ocr::{OcrEngine, TesseractEngine};
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Highest internal-assessment mark.
pub const MAX_INTERNAL: u8 = 30;

/// Configuration for a scan and the plan built on it.
///
/// Built via [`PlannerConfig::builder()`] or using
/// [`PlannerConfig::default()`].
///
/// # Example
/// ```rust
/// use gradesense::{PlannerConfig, ScaleVariant};
///
/// let config = PlannerConfig::builder()
///     .variant(ScaleVariant::Letter)
///     .ocr_language("eng")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PlannerConfig {
    /// Grade scale. Default: [`ScaleVariant::Classic`].
    pub variant: ScaleVariant,

    /// Tesseract language pack(s), e.g. `"eng"` or `"eng+tam"`. Default: `"eng"`.
    pub ocr_language: String,

    /// Tesseract executable. Default: `"tesseract"` (looked up on `PATH`).
    pub tesseract_cmd: String,

    /// Seconds before the OCR subprocess is killed. Default: 60.
    pub ocr_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Convert the scan to grayscale before OCR. Default: false.
    pub grayscale: bool,

    /// Extracted subjects must be longer than this. Default: 5.
    pub min_subject_len: usize,

    /// Internal mark pre-filled for theory subjects. Default: 20.
    pub default_internal: u8,

    /// Expected grade pre-filled for non-theory subjects.
    /// If None, uses the second grade of the scale (`A`).
    pub default_expected: Option<String>,

    /// Pre-constructed OCR engine. Takes precedence over `tesseract_cmd`.
    pub engine: Option<Arc<dyn OcrEngine>>,

    /// Optional progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            variant: ScaleVariant::default(),
            ocr_language: "eng".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            ocr_timeout_secs: 60,
            download_timeout_secs: 120,
            grayscale: false,
            min_subject_len: DEFAULT_MIN_SUBJECT_LEN,
            default_internal: 20,
            default_expected: None,
            engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("variant", &self.variant)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("grayscale", &self.grayscale)
            .field("min_subject_len", &self.min_subject_len)
            .field("default_internal", &self.default_internal)
            .field("default_expected", &self.default_expected)
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

impl PlannerConfig {
    /// Create a new builder for `PlannerConfig`.
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured engine, or a tesseract subprocess engine.
    pub fn ocr_engine(&self) -> Arc<dyn OcrEngine> {
        match self.engine {
            Some(ref engine) => Arc::clone(engine),
            None => Arc::new(TesseractEngine::new(
                self.tesseract_cmd.clone(),
                Duration::from_secs(self.ocr_timeout_secs),
            )),
        }
    }

    /// Letter pre-filled for non-theory subjects.
    pub fn default_expected_letter(&self) -> &'static str {
        let scale = self.variant.scale();
        self.default_expected
            .as_deref()
            .and_then(|l| scale.get(l))
            .unwrap_or_else(|| scale.second())
            .letter
    }
}

/// Builder for [`PlannerConfig`].
#[derive(Debug)]
pub struct PlannerConfigBuilder {
    config: PlannerConfig,
}

impl PlannerConfigBuilder {
    pub fn variant(mut self, variant: ScaleVariant) -> Self {
        self.config.variant = variant;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn ocr_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ocr_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn grayscale(mut self, v: bool) -> Self {
        self.config.grayscale = v;
        self
    }

    pub fn min_subject_len(mut self, len: usize) -> Self {
        self.config.min_subject_len = len;
        self
    }

    pub fn default_internal(mut self, mark: u8) -> Self {
        self.config.default_internal = mark;
        self
    }

    pub fn default_expected(mut self, letter: impl Into<String>) -> Self {
        self.config.default_expected = Some(letter.into());
        self
    }

    pub fn engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PlannerConfig, GradeSenseError> {
        let c = &self.config;
        if c.ocr_language.trim().is_empty() {
            return Err(GradeSenseError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(GradeSenseError::InvalidConfig(
                "Tesseract command must not be empty".into(),
            ));
        }
        if c.ocr_timeout_secs == 0 {
            return Err(GradeSenseError::InvalidConfig(
                "OCR timeout must be ≥ 1 second".into(),
            ));
        }
        if c.default_internal > MAX_INTERNAL {
            return Err(GradeSenseError::InvalidConfig(format!(
                "Default internal mark must be 0–{}, got {}",
                MAX_INTERNAL, c.default_internal
            )));
        }
        if let Some(ref letter) = c.default_expected {
            if c.variant.scale().get(letter).is_none() {
                return Err(GradeSenseError::InvalidConfig(format!(
                    "Default expected grade '{}' is not on the {} scale",
                    letter, c.variant
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PlannerConfig::builder().build().unwrap();
        assert_eq!(config.variant, ScaleVariant::Classic);
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.default_internal, 20);
        assert_eq!(config.default_expected_letter(), "A");
    }

    #[test]
    fn rejects_out_of_range_internal() {
        let err = PlannerConfig::builder().default_internal(31).build().unwrap_err();
        assert!(err.to_string().contains("0–30"), "got: {err}");
    }

    #[test]
    fn rejects_grade_from_other_scale() {
        let err = PlannerConfig::builder()
            .variant(ScaleVariant::Classic)
            .default_expected("S")
            .build()
            .unwrap_err();
        assert!(matches!(err, GradeSenseError::InvalidConfig(_)));

        let ok = PlannerConfig::builder()
            .variant(ScaleVariant::Letter)
            .default_expected("s")
            .build()
            .unwrap();
        assert_eq!(ok.default_expected_letter(), "S");
    }

    #[test]
    fn rejects_zero_timeout_and_empty_language() {
        assert!(PlannerConfig::builder().ocr_timeout_secs(0).build().is_err());
        assert!(PlannerConfig::builder().ocr_language("  ").build().is_err());
    }

    #[test]
    fn debug_hides_engine_internals() {
        let config = PlannerConfig::default();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("PlannerConfig"));
        assert!(dbg.contains("engine: None"));
        assert_eq!(config.ocr_engine().name(), "tesseract");
    }
}
