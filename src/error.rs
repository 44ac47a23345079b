//! Error types for the gradesense library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GradeSenseError`] — **Fatal**: the operation cannot proceed at all
//!   (missing image, OCR engine not installed, invalid inputs). Returned as
//!   `Err(GradeSenseError)` from [`crate::scan`] and friends.
//!
//! * [`StepWarning`] — **Non-fatal**: a wizard transition was refused
//!   (e.g. proceeding without confirming edits). The session is left
//!   untouched and the caller shows the message and lets the user retry.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the gradesense library.
#[derive(Debug, Error)]
pub enum GradeSenseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is neither JPEG nor PNG.
    #[error("Unsupported image '{path}': expected JPEG or PNG\nFirst bytes: {magic:?}")]
    UnsupportedImage { path: PathBuf, magic: [u8; 4] },

    /// The image header looked right but decoding failed.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR executable could not be started.
    #[error(
        "OCR engine '{command}' is not available: {detail}\n\n\
Install tesseract (e.g. `apt install tesseract-ocr` or `brew install tesseract`)\n\
or point --tesseract at an existing binary."
    )]
    OcrUnavailable { command: String, detail: String },

    /// The OCR engine ran but reported failure.
    #[error("OCR failed for '{path}': {detail}")]
    OcrFailed { path: PathBuf, detail: String },

    /// The OCR engine did not finish in time.
    #[error("OCR timed out after {secs}s for '{path}'\nIncrease --ocr-timeout.")]
    OcrTimeout { path: PathBuf, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output report file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config / input errors ─────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Planning inputs are out of range (target CGPA, internal mark, grade letter).
    #[error("Invalid planning inputs: {0}")]
    InvalidInputs(String),

    /// A wizard transition was refused.
    #[error(transparent)]
    Step(#[from] StepWarning),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A refused wizard transition.
///
/// Returned by [`crate::session::Session`] when the user tries to move
/// somewhere the current step does not allow. The session is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum StepWarning {
    /// Proceeding from the upload step before anything was scanned.
    #[error("Upload an almanac image first.")]
    NothingScanned,

    /// The subject table was edited but the edits were never confirmed.
    #[error("Please confirm your changes before proceeding.")]
    UnconfirmedEdits,

    /// The requested action is not available at this step.
    #[error("Cannot {action} from step {step}")]
    InvalidTransition { action: String, step: u8 },
}
