//! Image preparation ahead of OCR.
//!
//! By default the scan is handed to the OCR engine untouched. With
//! `grayscale` enabled the image is decoded, converted to 8-bit luma and
//! re-encoded as PNG in a temp directory; phone photos of almanacs are
//! often colour-cast and tesseract binarises luma more reliably.
//!
//! Decoding is CPU-bound, so it runs in `spawn_blocking`.

use crate::error::GradeSenseError;
use crate::output::ImageMetadata;
use crate::pipeline::input::ImageKind;
use image::{ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// The image the OCR engine should read.
pub struct PreparedImage {
    pub path: PathBuf,
    pub metadata: ImageMetadata,
    _temp_dir: Option<TempDir>,
}

/// Read image dimensions without decoding the full image.
pub fn read_metadata(path: &Path, kind: ImageKind) -> Result<ImageMetadata, GradeSenseError> {
    let (width, height) = open_reader(path, kind)?
        .into_dimensions()
        .map_err(|e| decode_error(path, e))?;
    let file_size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    Ok(ImageMetadata {
        path: path.to_path_buf(),
        kind,
        width,
        height,
        file_size_bytes,
    })
}

/// Prepare the image for OCR, optionally converting it to grayscale.
pub async fn prepare(path: &Path, kind: ImageKind, grayscale: bool) -> Result<PreparedImage, GradeSenseError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || prepare_blocking(&path, kind, grayscale))
        .await
        .map_err(|e| GradeSenseError::Internal(format!("Preprocess task panicked: {}", e)))?
}

fn prepare_blocking(path: &Path, kind: ImageKind, grayscale: bool) -> Result<PreparedImage, GradeSenseError> {
    let metadata = read_metadata(path, kind)?;

    if !grayscale {
        return Ok(PreparedImage {
            path: path.to_path_buf(),
            metadata,
            _temp_dir: None,
        });
    }

    let img = open_reader(path, kind)?
        .decode()
        .map_err(|e| decode_error(path, e))?;
    let luma = img.to_luma8();

    let temp_dir = TempDir::new().map_err(|e| GradeSenseError::Internal(e.to_string()))?;
    let out = temp_dir.path().join("almanac-gray.png");
    luma.save_with_format(&out, ImageFormat::Png)
        .map_err(|e| decode_error(path, e))?;

    debug!(
        "Converted {}x{} scan to grayscale: {}",
        metadata.width,
        metadata.height,
        out.display()
    );

    Ok(PreparedImage {
        path: out,
        metadata,
        _temp_dir: Some(temp_dir),
    })
}

// The format comes from the sniffed magic bytes, not the extension, so
// extension-less temp files decode too.
fn open_reader(path: &Path, kind: ImageKind) -> Result<ImageReader<BufReader<File>>, GradeSenseError> {
    let mut reader = ImageReader::open(path).map_err(|e| GradeSenseError::ImageDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    reader.set_format(match kind {
        ImageKind::Jpeg => ImageFormat::Jpeg,
        ImageKind::Png => ImageFormat::Png,
    });
    Ok(reader)
}

fn decode_error(path: &Path, e: image::ImageError) -> GradeSenseError {
    GradeSenseError::ImageDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}
