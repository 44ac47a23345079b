//! Result types produced by a scan.

use crate::pipeline::input::ImageKind;
use crate::subject::SubjectTable;
use serde::Serialize;
use std::path::PathBuf;

/// Basic facts about the scanned image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub path: PathBuf,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    pub file_size_bytes: u64,
}

/// Counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Non-blank lines in the OCR text.
    pub text_lines: usize,
    /// Lines that became subject rows.
    pub extracted_rows: usize,
    /// Non-blank lines the extraction rules discarded.
    pub discarded_lines: usize,
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a scan produces: the raw text, kept so the user can
/// re-run extraction after fixing it, and the extracted table.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutput {
    pub text: String,
    pub table: SubjectTable,
    /// `None` when the scan started from text rather than an image.
    pub metadata: Option<ImageMetadata>,
    pub stats: ScanStats,
}
