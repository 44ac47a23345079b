//! Pipeline stages for almanac scanning.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ preprocess ──▶ ocr ──▶ extract
//! (path/URL)  (decode)     (text)  (rows)
//! ```
//!
//! 1. [`input`]      — canonicalise the user-supplied path or URL to a local
//!    JPEG/PNG file
//! 2. [`preprocess`] — read dimensions and optionally convert to grayscale;
//!    runs in `spawn_blocking`
//! 3. [`ocr`]        — run the OCR engine; the only stage with a subprocess
//! 4. [`extract`]    — regex rules that turn OCR lines into subject rows

pub mod extract;
pub mod input;
pub mod ocr;
pub mod preprocess;
