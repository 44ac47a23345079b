//! Input resolution: normalise a user-supplied path or URL to a local image.
//!
//! ## Why download to a temp file?
//!
//! tesseract reads images from the file system. Downloading to a `TempDir`
//! gives us a path it can open while ensuring cleanup happens automatically
//! when `ResolvedInput` is dropped. We validate the JPEG/PNG magic bytes
//! before returning so callers get a meaningful error rather than an
//! opaque OCR failure.

use crate::error::GradeSenseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Image container formats accepted as almanac scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Sniff the format from the first bytes of the file.
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        if magic.len() >= 3 && magic[..3] == [0xFF, 0xD8, 0xFF] {
            Some(ImageKind::Jpeg)
        } else if magic.len() >= 4 && magic[..4] == [0x89, b'P', b'N', b'G'] {
            Some(ImageKind::Png)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }
}

/// The resolved input — either a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local { path: PathBuf, kind: ImageKind },
    /// Input was a URL; image downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded {
        path: PathBuf,
        kind: ImageKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Get the path to the image regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ImageKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local image path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, GradeSenseError> {
    if input.trim().is_empty() {
        return Err(GradeSenseError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and image magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, GradeSenseError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(GradeSenseError::FileNotFound { path });
    }

    let kind = match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            let read = f.read(&mut magic).unwrap_or(0);
            ImageKind::from_magic(&magic[..read])
                .ok_or(GradeSenseError::UnsupportedImage { path: path.clone(), magic })?
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(GradeSenseError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(GradeSenseError::FileNotFound { path });
        }
    };

    debug!("Resolved local {:?} image: {}", kind, path.display());
    Ok(ResolvedInput::Local { path, kind })
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, GradeSenseError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GradeSenseError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            GradeSenseError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            GradeSenseError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(GradeSenseError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| GradeSenseError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let kind = ImageKind::from_magic(&bytes).ok_or_else(|| {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        GradeSenseError::UnsupportedImage {
            path: PathBuf::from(url),
            magic,
        }
    })?;

    let temp_dir = TempDir::new().map_err(|e| GradeSenseError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(extract_filename(url, kind));

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| GradeSenseError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Pick a filename from the URL path, falling back to `almanac.<ext>`.
fn extract_filename(url: &str, kind: ImageKind) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    format!("almanac.{}", kind.extension())
}
