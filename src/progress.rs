//! Progress-callback trait for scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::PlannerConfigBuilder::progress_callback`] to hear about
//! each stage as it finishes. The binary uses this to drive its spinner.
//!
//! # Example
//!
//! ```rust
//! use gradesense::{PlannerConfig, ScanProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ScanProgressCallback for Printer {
//!     fn on_rows_extracted(&self, rows: usize) {
//!         eprintln!("{rows} subjects found");
//!     }
//! }
//!
//! let config = PlannerConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ScanProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by [`crate::scan`] as it moves through the pipeline.
///
/// All methods have default no-op implementations so callers only
/// override what they care about.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once the input has been resolved, before OCR starts.
    fn on_scan_start(&self, source: &str) {
        let _ = source;
    }

    /// Called when the OCR engine returns.
    ///
    /// # Arguments
    /// * `chars` — length of the recognised text
    fn on_ocr_complete(&self, chars: usize) {
        let _ = chars;
    }

    /// Called after the extraction rules have run.
    fn on_rows_extracted(&self, rows: usize) {
        let _ = rows;
    }

    /// Called when the scan fails; the error is also returned to the caller.
    fn on_scan_error(&self, error: String) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PlannerConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        chars: AtomicUsize,
        rows: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl ScanProgressCallback for TrackingCallback {
        fn on_ocr_complete(&self, chars: usize) {
            self.chars.store(chars, Ordering::SeqCst);
        }

        fn on_rows_extracted(&self, rows: usize) {
            self.rows.store(rows, Ordering::SeqCst);
        }

        fn on_scan_error(&self, error: String) {
            self.errors.lock().unwrap().push(error);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_scan_start("almanac.png");
        cb.on_ocr_complete(120);
        cb.on_rows_extracted(7);
        cb.on_scan_error("boom".into());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_ocr_complete(512);
        tracker.on_rows_extracted(6);
        tracker.on_scan_error("OCR timed out".into());

        assert_eq!(tracker.chars.load(Ordering::SeqCst), 512);
        assert_eq!(tracker.rows.load(Ordering::SeqCst), 6);
        assert_eq!(*tracker.errors.lock().unwrap(), vec!["OCR timed out"]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_scan_start("scan.jpg");
        cb.on_rows_extracted(3);
    }
}
