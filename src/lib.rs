//! # gradesense
//!
//! Scan a semester almanac (the printed list of subjects and credits),
//! turn it into an editable subject table, and work out which grades are
//! needed to reach a target CGPA.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JPEG/PNG
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Prepare    validate + optional grayscale (spawn_blocking)
//!  ├─ 3. OCR        tesseract subprocess (or any OcrEngine)
//!  ├─ 4. Extract    regex rules → SubjectTable
//!  ├─ 5. Session    upload → edit & confirm → inputs → analysis
//!  └─ 6. Plan       heuristic + back-solved grades, rendered as Markdown/JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gradesense::{analyze, render_markdown, scan, PlanInputs, PlannerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlannerConfig::default();
//!     let scanned = scan("almanac.jpg", &config).await?;
//!     let inputs = PlanInputs::prefilled(&scanned.table, &config, 9.0);
//!     let analysis = analyze(&scanned.table, &inputs, config.variant)?;
//!     println!("{}", render_markdown(&analysis));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gradesense` binary (clap + dialoguer + indicatif + tracing-subscriber) |
//!
//! ## Grade Scales
//!
//! | Variant   | Grades (points)                      | Internals |
//! |-----------|--------------------------------------|-----------|
//! | `classic` | A+ 10, A 9, B 8, C 7, D 6            | collected |
//! | `letter`  | S 10, A 9, B 8, C 7, D 6             | skipped   |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod grade;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod report;
pub mod scan;
pub mod session;
pub mod subject;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PlannerConfig, PlannerConfigBuilder, MAX_INTERNAL};
pub use error::{GradeSenseError, StepWarning};
pub use grade::{Grade, GradeScale, ScaleVariant};
pub use output::{ImageMetadata, ScanOutput, ScanStats};
pub use pipeline::ocr::{OcrEngine, OcrFuture, TesseractEngine};
pub use plan::{analyze, backsolve_plan, heuristic_plan, Analysis, PlanInputs};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use report::{render_markdown, render_subject_table, write_report};
pub use scan::{inspect, scan, scan_from_bytes, scan_sync, scan_text};
pub use session::{Session, Step};
pub use subject::{Category, SubjectRow, SubjectTable, TableSummary};
