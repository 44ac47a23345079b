//! Scan entry points: image (or text) in, subject table out.

use crate::config::PlannerConfig;
use crate::error::GradeSenseError;
use crate::output::{ImageMetadata, ScanOutput, ScanStats};
use crate::pipeline::{extract, input, preprocess};
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

/// Scan an almanac image (local path or HTTP/HTTPS URL) into a subject table.
///
/// # Errors
/// Returns `Err(GradeSenseError)` when the image cannot be resolved or
/// decoded, or when the OCR engine fails. OCR text that yields no rows is
/// **not** an error: the table is simply empty and the user can add rows
/// by hand.
pub async fn scan(input_str: impl AsRef<str>, config: &PlannerConfig) -> Result<ScanOutput, GradeSenseError> {
    let input_str = input_str.as_ref();
    let result = scan_inner(input_str, config).await;
    if let (Err(e), Some(cb)) = (&result, &config.progress_callback) {
        cb.on_scan_error(e.to_string());
    }
    result
}

async fn scan_inner(input_str: &str, config: &PlannerConfig) -> Result<ScanOutput, GradeSenseError> {
    let total_start = Instant::now();
    info!("Starting scan: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;

    // ── Step 2: Prepare image ────────────────────────────────────────────
    let prepared = preprocess::prepare(resolved.path(), resolved.kind(), config.grayscale).await?;
    info!(
        "Image is {}x{} {:?}",
        prepared.metadata.width, prepared.metadata.height, prepared.metadata.kind
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_start(input_str);
    }

    // ── Step 3: OCR ──────────────────────────────────────────────────────
    let engine = config.ocr_engine();
    let ocr_start = Instant::now();
    let text = engine
        .recognize(&prepared.path, &config.ocr_language)
        .await?;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_ocr_complete(text.chars().count());
    }

    // ── Step 4: Extract rows ─────────────────────────────────────────────
    let mut output = extract_output(text, Some(prepared.metadata), config);
    output.stats.ocr_duration_ms = ocr_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Scan complete: {} rows from {} lines, {}ms total",
        output.stats.extracted_rows, output.stats.text_lines, output.stats.total_duration_ms
    );
    Ok(output)
}

/// Run only the extraction rules on text the caller already has, e.g. OCR
/// output the user corrected by hand.
pub fn scan_text(text: impl Into<String>, config: &PlannerConfig) -> ScanOutput {
    let start = Instant::now();
    let mut output = extract_output(text.into(), None, config);
    output.stats.total_duration_ms = start.elapsed().as_millis() as u64;
    output
}

/// Synchronous wrapper around [`scan`].
///
/// Creates a temporary tokio runtime internally.
pub fn scan_sync(input_str: impl AsRef<str>, config: &PlannerConfig) -> Result<ScanOutput, GradeSenseError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GradeSenseError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(scan(input_str, config))
}

/// Read image metadata without running OCR.
///
/// Does not require tesseract to be installed.
pub async fn inspect(input_str: impl AsRef<str>, config: &PlannerConfig) -> Result<ImageMetadata, GradeSenseError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let path = resolved.path().to_path_buf();
    let kind = resolved.kind();
    let mut meta = tokio::task::spawn_blocking(move || preprocess::read_metadata(&path, kind))
        .await
        .map_err(|e| GradeSenseError::Internal(format!("Inspect task panicked: {}", e)))??;
    // A downloaded file lives in a temp dir that is about to vanish.
    if input::is_url(input_str.as_ref()) {
        meta.path = input_str.as_ref().into();
    }
    Ok(meta)
}

/// Scan image bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed when
/// the scan returns.
pub async fn scan_from_bytes(bytes: &[u8], config: &PlannerConfig) -> Result<ScanOutput, GradeSenseError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| GradeSenseError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| GradeSenseError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    scan(&path, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn extract_output(text: String, metadata: Option<ImageMetadata>, config: &PlannerConfig) -> ScanOutput {
    let table = extract::extract_rows_with(&text, config.min_subject_len);
    let text_lines = text.lines().filter(|l| !l.trim().is_empty()).count();

    if text_lines == 0 {
        warn!("OCR text is empty; the subject table will be empty");
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_rows_extracted(table.len());
    }

    let stats = ScanStats {
        text_lines,
        extracted_rows: table.len(),
        discarded_lines: text_lines.saturating_sub(table.len()),
        ..Default::default()
    };

    ScanOutput {
        text,
        table,
        metadata,
        stats,
    }
}
