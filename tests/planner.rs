//! Integration tests for the scan → session → plan flow.
//!
//! OCR is replaced by a fake [`OcrEngine`] that returns canned text, so
//! these run without tesseract installed.

use gradesense::{
    inspect, render_markdown, scan, scan_from_bytes, scan_text, write_report, Category, GradeSenseError,
    OcrEngine, OcrFuture, PlanInputs, PlannerConfig, ScaleVariant, ScanProgressCallback, Session,
    Step, StepWarning,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const ALMANAC_TEXT: &str = "\
SEMESTER VI ALMANAC
S.No Course Code Course Title Credit
1 U19CS601 Compiler Design 4
2 U19CS602 Cryptography and Network Security 3
3 U19CS603 Software Testing 2
4 U19CS6L1 Compiler Design Laboratory 2
Total Credits 11
";

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Returns fixed text and remembers which image it was given.
struct FakeOcr {
    text: String,
    seen: Mutex<Vec<PathBuf>>,
}

impl FakeOcr {
    fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl OcrEngine for FakeOcr {
    fn name(&self) -> &str {
        "fake"
    }

    fn recognize<'a>(&'a self, image: &'a Path, _language: &'a str) -> OcrFuture<'a> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(image.to_path_buf());
            Ok(self.text.clone())
        })
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl ScanProgressCallback for Recorder {
    fn on_scan_start(&self, _source: &str) {
        self.events.lock().unwrap().push("start".into());
    }
    fn on_ocr_complete(&self, chars: usize) {
        self.events.lock().unwrap().push(format!("ocr:{chars}"));
    }
    fn on_rows_extracted(&self, rows: usize) {
        self.events.lock().unwrap().push(format!("rows:{rows}"));
    }
    fn on_scan_error(&self, _error: String) {
        self.events.lock().unwrap().push("error".into());
    }
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([240, 240, 240]))
        .save(&path)
        .unwrap();
    path
}

fn config_with(engine: Arc<FakeOcr>) -> PlannerConfig {
    PlannerConfig::builder().engine(engine).build().unwrap()
}

// ── Scanning ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scan_png_with_fake_engine() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 64, 32);
    let engine = FakeOcr::new(ALMANAC_TEXT);

    let out = scan(png.to_str().unwrap(), &config_with(engine.clone()))
        .await
        .unwrap();

    let subjects: Vec<_> = out.table.iter().map(|r| (r.subject.as_str(), r.credit)).collect();
    assert_eq!(
        subjects,
        vec![
            ("Compiler Design", 4),
            ("Cryptography and Network Security", 3),
            ("Software Testing", 2),
            ("Compiler Design Laboratory", 2),
        ]
    );
    assert!(out.table.iter().all(|r| r.category == Category::Theory));
    assert_eq!(out.table.rows()[3].sequence_number, 4);

    let meta = out.metadata.unwrap();
    assert_eq!((meta.width, meta.height), (64, 32));
    assert_eq!(out.stats.text_lines, 7);
    assert_eq!(out.stats.extracted_rows, 4);
    assert_eq!(engine.seen.lock().unwrap().as_slice(), &[png]);
}

#[tokio::test]
async fn grayscale_hands_engine_a_converted_copy() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 16, 16);
    let engine = FakeOcr::new(ALMANAC_TEXT);
    let config = PlannerConfig::builder()
        .engine(engine.clone())
        .grayscale(true)
        .build()
        .unwrap();

    scan(png.to_str().unwrap(), &config).await.unwrap();

    let seen = engine.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_ne!(seen[0], png);
    // The converted copy lives only for the duration of the scan.
    assert!(!seen[0].exists());
}

#[tokio::test]
async fn empty_ocr_text_gives_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "blank.png", 8, 8);
    let out = scan(png.to_str().unwrap(), &config_with(FakeOcr::new("")))
        .await
        .unwrap();
    assert!(out.table.is_empty());
    assert_eq!(out.stats.text_lines, 0);
}

#[tokio::test]
async fn progress_events_arrive_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 8, 8);
    let recorder = Arc::new(Recorder::default());
    let config = PlannerConfig::builder()
        .engine(FakeOcr::new("U19CS601 Compiler Design 4\n"))
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    scan(png.to_str().unwrap(), &config).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events, vec!["start", "ocr:27", "rows:1"]);
}

#[tokio::test]
async fn missing_file_reports_error_event() {
    let recorder = Arc::new(Recorder::default());
    let config = PlannerConfig::builder()
        .engine(FakeOcr::new(ALMANAC_TEXT))
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let err = scan("/definitely/not/here.png", &config).await.unwrap_err();
    assert!(matches!(err, GradeSenseError::FileNotFound { .. }));
    assert_eq!(*recorder.events.lock().unwrap(), vec!["error".to_string()]);
}

#[tokio::test]
async fn gif_is_rejected_before_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let gif = dir.path().join("almanac.gif");
    std::fs::write(&gif, b"GIF89a\x01\x00\x01\x00").unwrap();
    let engine = FakeOcr::new(ALMANAC_TEXT);

    let err = scan(gif.to_str().unwrap(), &config_with(engine.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, GradeSenseError::UnsupportedImage { .. }), "got: {err}");
    assert!(engine.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scan_from_in_memory_png() {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::new(12, 10))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let out = scan_from_bytes(&bytes, &config_with(FakeOcr::new(ALMANAC_TEXT)))
        .await
        .unwrap();
    assert_eq!(out.table.len(), 4);
    assert_eq!(out.metadata.map(|m| m.width), Some(12));
}

#[test]
fn inspect_needs_no_ocr_engine() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 30, 20);
    let meta = tokio_test::block_on(inspect(png.to_str().unwrap(), &PlannerConfig::default())).unwrap();
    assert_eq!((meta.width, meta.height), (30, 20));
    assert!(meta.file_size_bytes > 0);
}

// ── Full wizard flow ─────────────────────────────────────────────────────────

#[tokio::test]
async fn corrected_ocr_text_replaces_rows_at_upload() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 8, 8);
    let config = config_with(FakeOcr::new(
        "U19CS601 Compiler Design 4\nU19CS603 Software Testinq Z\n",
    ));
    let out = scan(png.to_str().unwrap(), &config).await.unwrap();
    assert_eq!(out.table.len(), 1);

    let mut session = Session::new(ScaleVariant::Classic);
    session.load_rows(out.table).unwrap();

    // The misread credit and typo are fixed in the raw text, not the grid.
    let corrected = out.text.replace("Testinq Z", "Testing 2");
    let again = scan_text(corrected, &config);
    assert_eq!(again.stats.extracted_rows, 2);
    assert!(again.metadata.is_none());

    session.load_rows(again.table).unwrap();
    assert_eq!(session.table().len(), 2);
    assert_eq!(session.table().find("Software Testing").map(|r| r.credit), Some(2));
    assert_eq!(session.proceed().unwrap(), Step::EditSubjects);
}

#[tokio::test]
async fn scan_edit_confirm_analyze_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 8, 8);
    let config = config_with(FakeOcr::new(ALMANAC_TEXT));
    let out = scan(png.to_str().unwrap(), &config).await.unwrap();

    let mut session = Session::new(ScaleVariant::Classic);
    session.load_rows(out.table).unwrap();
    assert_eq!(session.proceed().unwrap(), Step::EditSubjects);

    // Fix up the lab's type and add an internship the OCR missed.
    let mut draft = session.table().clone();
    assert!(draft.set_category(4, Category::Lab));
    draft.push("Industrial Internship", 1, Category::Internship);
    assert_eq!(session.proceed(), Err(StepWarning::UnconfirmedEdits));

    let summary = session.confirm(draft).unwrap();
    assert_eq!(summary.subjects, 5);
    assert_eq!(summary.total_credits, 12);
    assert_eq!(summary.theory, 3);
    assert_eq!(session.proceed().unwrap(), Step::EnterInputs);

    let mut inputs = PlanInputs::prefilled(session.table(), &config, 9.0);
    assert_eq!(inputs.internals.len(), 3);
    assert_eq!(inputs.expected.get("Industrial Internship").map(String::as_str), Some("A"));
    inputs.expected.insert("Compiler Design Laboratory".into(), "A+".into());

    let analysis = session.analyze(inputs).unwrap().clone();
    // 12 credits × 9.0 = 108; lab A+ (2×10) + internship A (1×9) = 29
    // → (108 − 29) / 9 = 8.78 → B
    let req = analysis.backsolve.requirement;
    assert_eq!(req.total_credits, 12);
    assert_eq!(req.remaining_credits, 9);
    assert!((req.required_average - 79.0 / 9.0).abs() < 1e-9);
    assert_eq!(analysis.backsolve.required_grade, "B");
    assert_eq!(session.step(), Step::Analysis);

    let md = render_markdown(&analysis);
    assert!(md.contains("Achievable with strong performance"));
    assert!(md.contains("| Compiler Design | 4 | A+ | 60+ |"));

    let report = dir.path().join("out/plan.md");
    write_report(&report, &md).await.unwrap();
    assert_eq!(std::fs::read_to_string(&report).unwrap(), md);

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["variant"], "classic");
    assert_eq!(json["verdict"]["difficulty"], "achievable");
    assert_eq!(json["backsolve"]["rows"][3]["source"], "expected");

    session.start_over().unwrap();
    assert_eq!(session.step(), Step::Upload);
    assert_eq!(session.proceed(), Err(StepWarning::NothingScanned));
}

#[tokio::test]
async fn letter_scale_skips_internals() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "almanac.png", 8, 8);
    let config = PlannerConfig::builder()
        .engine(FakeOcr::new(ALMANAC_TEXT))
        .variant(ScaleVariant::Letter)
        .build()
        .unwrap();
    let out = scan(png.to_str().unwrap(), &config).await.unwrap();

    let inputs = PlanInputs::prefilled(&out.table, &config, 9.5);
    assert!(inputs.internals.is_empty());

    let analysis = gradesense::analyze(&out.table, &inputs, config.variant).unwrap();
    assert!(analysis.verdict.message.ends_with('S'));
    assert_eq!(analysis.heuristic[0].grade, "S");
    assert!(analysis.backsolve.rows.iter().all(|r| r.internal.is_none()));
}
