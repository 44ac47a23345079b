//! CLI binary for gradesense.
//!
//! Scans an almanac, then walks the four planning steps either
//! interactively or straight through with `--non-interactive`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use dialoguer::{theme::ColorfulTheme, Editor, Input, Select};
use gradesense::report::render_summary;
use gradesense::{
    inspect, render_markdown, render_subject_table, scan, scan_text, write_report, Analysis,
    Category, PlanInputs, PlannerConfig, ProgressCallback, ScaleVariant, ScanOutput,
    ScanProgressCallback, Session, Step, StepWarning, SubjectTable, MAX_INTERNAL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while an image is being scanned. A fresh bar is created
/// for every scan so the wizard can rescan as often as it likes.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn begin(&self, message: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Scanning");
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, source: &str) {
        if let Some(ref bar) = *self.bar.lock().unwrap() {
            bar.set_message(format!("running OCR on {source}"));
        }
    }

    fn on_ocr_complete(&self, chars: usize) {
        if let Some(ref bar) = *self.bar.lock().unwrap() {
            bar.println(format!(
                "  {} OCR read {}",
                style("✓").green(),
                style(format!("{chars} chars")).dim()
            ));
            bar.set_message("extracting subjects…");
        }
    }

    fn on_rows_extracted(&self, rows: usize) {
        self.finish();
        eprintln!("{} {} subjects found", style("✔").green(), style(rows).bold());
    }

    fn on_scan_error(&self, error: String) {
        self.finish();
        let msg = match error.lines().next() {
            Some(first) if first.chars().count() > 80 => {
                format!("{}\u{2026}", first.chars().take(79).collect::<String>())
            }
            Some(first) => first.to_string(),
            None => error.clone(),
        };
        eprintln!("{} {}", style("✘").red(), style(msg).red());
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan and plan interactively
  gradesense almanac.jpg

  # Letter scale (S, A, B, C, D)
  gradesense --variant letter almanac.png

  # Straight through, no prompts
  gradesense almanac.jpg --non-interactive --target 9.0 \
      --type "Compiler Laboratory=Lab" \
      --internal "Compiler Design=24" --expected "Compiler Laboratory=A+"

  # Skip OCR, use text you already have
  gradesense --text ocr.txt --non-interactive --target 8.5

  # JSON report to a file
  gradesense almanac.jpg -y --target 9.0 --json -o plan.json

  # Only show the extracted subject table
  gradesense --scan-only almanac.jpg

  # Image dimensions only (no tesseract needed)
  gradesense --inspect-only almanac.jpg

GRADE SCALES:
  classic   A+ 10  A 9  B 8  C 7  D 6   internals collected for theory subjects
  letter    S 10   A 9  B 8  C 7  D 6   no internals

SETUP:
  Install tesseract (apt install tesseract-ocr / brew install tesseract),
  or point --tesseract at an existing binary.
"#;

/// Scan a semester almanac and plan the grades for a target CGPA.
#[derive(Parser, Debug)]
#[command(
    name = "gradesense",
    version,
    about = "Scan a semester almanac and plan the grades needed for a target CGPA",
    long_about = "Scan a semester almanac image (local file or URL) with tesseract OCR, \
edit the extracted subject table, enter internal marks and expected grades, and get a \
subject-wise plan for reaching a target CGPA.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Almanac image (JPEG/PNG): local path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "text")]
    input: Option<String>,

    /// Read OCR text from this file instead of scanning an image.
    #[arg(long, env = "GRADESENSE_TEXT", conflicts_with = "inspect_only")]
    text: Option<PathBuf>,

    /// Write the report to this file instead of stdout.
    #[arg(short, long, env = "GRADESENSE_OUTPUT")]
    output: Option<PathBuf>,

    /// Grade scale: classic (A+ top) or letter (S top).
    #[arg(long, env = "GRADESENSE_VARIANT", default_value = "classic")]
    variant: ScaleVariant,

    /// Tesseract language pack(s), e.g. eng or eng+tam.
    #[arg(long, env = "GRADESENSE_LANG", default_value = "eng")]
    lang: String,

    /// Tesseract executable.
    #[arg(long, env = "GRADESENSE_TESSERACT", default_value = "tesseract")]
    tesseract: String,

    /// OCR timeout in seconds.
    #[arg(long, env = "GRADESENSE_OCR_TIMEOUT", default_value_t = 60)]
    ocr_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "GRADESENSE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Convert the image to grayscale before OCR.
    #[arg(long, env = "GRADESENSE_GRAYSCALE")]
    grayscale: bool,

    /// Extracted subject names must be longer than this many characters.
    #[arg(long, env = "GRADESENSE_MIN_SUBJECT_LEN", default_value_t = 5)]
    min_subject_len: usize,

    /// Internal mark (0–30) pre-filled for theory subjects.
    #[arg(long, env = "GRADESENSE_DEFAULT_INTERNAL", default_value_t = 20)]
    default_internal: u8,

    /// Expected grade pre-filled for labs, internships and projects.
    #[arg(long, env = "GRADESENSE_DEFAULT_EXPECTED")]
    default_expected: Option<String>,

    /// Target CGPA (0.0–10.0). Required with --non-interactive.
    #[arg(short, long, env = "GRADESENSE_TARGET")]
    target: Option<f64>,

    /// Subject type override, as "Subject=Lab". Repeatable. Rows not named
    /// here keep the Theory type the extractor gives them.
    #[arg(long = "type", value_name = "SUBJECT=TYPE", value_parser = parse_type)]
    types: Vec<(String, Category)>,

    /// Internal mark for a theory subject, as "Subject=25". Repeatable.
    #[arg(long = "internal", value_name = "SUBJECT=MARK", value_parser = parse_internal)]
    internals: Vec<(String, u8)>,

    /// Expected grade for a non-theory subject, as "Subject=A". Repeatable.
    #[arg(long = "expected", value_name = "SUBJECT=GRADE", value_parser = parse_expected)]
    expected: Vec<(String, String)>,

    /// Run without prompts: accept the extracted table and pre-filled inputs.
    #[arg(short = 'y', long, env = "GRADESENSE_NON_INTERACTIVE")]
    non_interactive: bool,

    /// Output the analysis as JSON instead of Markdown.
    #[arg(long, env = "GRADESENSE_JSON")]
    json: bool,

    /// Print the extracted subject table and stop.
    #[arg(long)]
    scan_only: bool,

    /// Print image metadata only, no OCR.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "GRADESENSE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GRADESENSE_VERBOSE", conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GRADESENSE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let spinner = show_progress.then(CliProgressCallback::new);
    let config = build_config(&cli, spinner.clone().map(|s| s as ProgressCallback))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let input = cli.input.as_deref().context("An image path or URL is required")?;
        let meta = inspect(input, &config)
            .await
            .context("Failed to inspect image")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", meta.path.display());
            println!("Format:       {:?}", meta.kind);
            println!("Dimensions:   {}x{}", meta.width, meta.height);
            println!("Size:         {} bytes", meta.file_size_bytes);
        }
        return Ok(());
    }

    // ── Scan ─────────────────────────────────────────────────────────────
    let scanned = initial_scan(&cli, &config, spinner.as_deref()).await?;
    if !cli.quiet && !show_progress {
        eprintln!(
            "Extracted {} subjects from {} lines in {}ms",
            scanned.stats.extracted_rows, scanned.stats.text_lines, scanned.stats.total_duration_ms
        );
    }

    if cli.scan_only {
        let rendered = if cli.json {
            serde_json::to_string_pretty(&scanned).context("Failed to serialise scan output")?
        } else {
            format!(
                "{}\n{}\n",
                render_subject_table(&scanned.table),
                render_summary(&scanned.table.summary())
            )
        };
        return emit(&cli, &rendered, false).await;
    }

    // ── Plan ─────────────────────────────────────────────────────────────
    let interactive = !cli.non_interactive && console::user_attended_stderr();
    let analysis = if interactive {
        let wizard = Wizard {
            cli: &cli,
            config: &config,
            spinner: spinner.as_deref(),
            theme: ColorfulTheme::default(),
        };
        match wizard.run(scanned).await? {
            Some(analysis) => analysis,
            None => return Ok(()),
        }
    } else {
        run_unattended(&cli, &config, scanned.table)?
    };

    let rendered = if cli.json {
        serde_json::to_string_pretty(&analysis).context("Failed to serialise analysis")?
    } else {
        render_markdown(&analysis)
    };
    // The wizard already showed the Markdown report on screen.
    emit(&cli, &rendered, interactive && !cli.json).await
}

/// Map CLI args to `PlannerConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PlannerConfig> {
    let mut builder = PlannerConfig::builder()
        .variant(cli.variant)
        .ocr_language(cli.lang.as_str())
        .tesseract_cmd(cli.tesseract.as_str())
        .ocr_timeout_secs(cli.ocr_timeout)
        .download_timeout_secs(cli.download_timeout)
        .grayscale(cli.grayscale)
        .min_subject_len(cli.min_subject_len)
        .default_internal(cli.default_internal);

    if let Some(ref letter) = cli.default_expected {
        builder = builder.default_expected(letter.as_str());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn initial_scan(
    cli: &Cli,
    config: &PlannerConfig,
    spinner: Option<&CliProgressCallback>,
) -> Result<ScanOutput> {
    if let Some(ref path) = cli.text {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read OCR text from {:?}", path))?;
        return Ok(scan_text(text, config));
    }

    let input = cli
        .input
        .as_deref()
        .context("An almanac image path or URL is required")?;
    if let Some(s) = spinner {
        s.begin("reading image…");
    }
    scan(input, config).await.context("Scan failed")
}

/// Drive the session without prompts, using the pre-filled inputs plus
/// any `--internal` / `--expected` overrides.
fn run_unattended(cli: &Cli, config: &PlannerConfig, table: SubjectTable) -> Result<Analysis> {
    let target = cli
        .target
        .context("--target is required when running non-interactively")?;

    let mut session = Session::new(config.variant);
    session.load_rows(table)?;
    session.proceed()?;
    let mut draft = session.table().clone();
    for (subject, category) in &cli.types {
        let seq = draft
            .find(subject)
            .map(|row| row.sequence_number)
            .with_context(|| format!("--type: no subject named '{subject}'"))?;
        draft.set_category(seq, *category);
    }
    let summary = session.confirm(draft)?;
    session.proceed()?;
    if !cli.quiet {
        eprintln!("{}", style(render_summary(&summary)).dim());
    }

    let mut inputs = PlanInputs::prefilled(session.table(), config, target);
    for (subject, mark) in &cli.internals {
        let row = session
            .table()
            .find(subject)
            .with_context(|| format!("--internal: no subject named '{subject}'"))?;
        if !config.variant.collects_internals() {
            bail!("--internal: the {} scale does not use internal marks", config.variant);
        }
        if !row.category.is_theory() {
            bail!(
                "--internal: '{subject}' is {}; internal marks apply to Theory subjects only",
                row.category
            );
        }
        inputs.internals.insert(subject.clone(), *mark);
    }
    for (subject, letter) in &cli.expected {
        let row = session
            .table()
            .find(subject)
            .with_context(|| format!("--expected: no subject named '{subject}'"))?;
        if row.category.is_theory() {
            bail!(
                "--expected: '{subject}' is a Theory subject; give it another type with \
                 --type \"{subject}=Lab\" first"
            );
        }
        inputs.expected.insert(subject.clone(), letter.clone());
    }

    let analysis = session.analyze(inputs).context("Analysis failed")?;
    Ok(analysis.clone())
}

/// Write to `--output` or stdout. `shown` skips stdout when the content
/// is already on screen.
async fn emit(cli: &Cli, rendered: &str, shown: bool) -> Result<()> {
    if let Some(ref path) = cli.output {
        write_report(path, rendered)
            .await
            .context("Failed to write report")?;
        if !cli.quiet {
            eprintln!(
                "{} report written  →  {}",
                style("✔").green(),
                style(path.display()).bold()
            );
        }
    } else if !shown {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }
    Ok(())
}

// ── Interactive wizard ───────────────────────────────────────────────────────

struct Wizard<'a> {
    cli: &'a Cli,
    config: &'a PlannerConfig,
    spinner: Option<&'a CliProgressCallback>,
    theme: ColorfulTheme,
}

impl Wizard<'_> {
    /// Returns `None` when the user quits before the analysis.
    async fn run(&self, first: ScanOutput) -> Result<Option<Analysis>> {
        let mut session = Session::new(self.config.variant);
        session.load_rows(first.table)?;
        let mut ocr_text = first.text;
        let mut draft: Option<SubjectTable> = None;

        loop {
            header(session.step());
            let keep_going = match session.step() {
                Step::Upload => self.upload(&mut session, &mut ocr_text).await?,
                Step::EditSubjects => {
                    let table = draft.get_or_insert_with(|| session.table().clone());
                    let keep_going = self.edit(&mut session, table)?;
                    if session.step() != Step::EditSubjects {
                        draft = None;
                    }
                    keep_going
                }
                Step::EnterInputs => self.inputs(&mut session)?,
                Step::Analysis => {
                    let Some(analysis) = session.analysis() else {
                        return Ok(None);
                    };
                    println!("{}", render_markdown(analysis));
                    let choice = Select::with_theme(&self.theme)
                        .with_prompt("What next?")
                        .items(&["Finish", "Start over"])
                        .default(0)
                        .interact()?;
                    if choice == 0 {
                        return Ok(Some(analysis.clone()));
                    }
                    session.start_over()?;
                    ocr_text.clear();
                    true
                }
            };
            if !keep_going {
                return Ok(None);
            }
        }
    }

    /// `ocr_text` is the text the current rows were extracted from.
    async fn upload(&self, session: &mut Session, ocr_text: &mut String) -> Result<bool> {
        if session.table().is_empty() {
            eprintln!("{}", style("No subjects extracted yet.").dim());
        } else {
            eprintln!("{}", render_subject_table(session.table()));
        }

        let items = [
            "Proceed",
            "Scan an image",
            "Load OCR text from a file",
            "Edit OCR text",
            "Quit",
        ];
        let choice = Select::with_theme(&self.theme)
            .with_prompt("Almanac")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                if let Err(w) = session.proceed() {
                    warn(w);
                }
            }
            1 => {
                let mut prompt = Input::<String>::with_theme(&self.theme)
                    .with_prompt("Image path or URL");
                if let Some(ref input) = self.cli.input {
                    prompt = prompt.default(input.clone());
                }
                let input = prompt.interact_text()?;
                if let Some(s) = self.spinner {
                    s.begin("reading image…");
                }
                match scan(&input, self.config).await {
                    Ok(out) => {
                        session.load_rows(out.table)?;
                        *ocr_text = out.text;
                    }
                    Err(e) if self.spinner.is_some() => tracing::debug!("scan failed: {e}"),
                    Err(e) => warn(e),
                }
            }
            2 => {
                let path: String = Input::with_theme(&self.theme)
                    .with_prompt("OCR text file")
                    .interact_text()?;
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => {
                        let out = scan_text(text, self.config);
                        session.load_rows(out.table)?;
                        *ocr_text = out.text;
                    }
                    Err(e) => warn(format!("Cannot read {path}: {e}")),
                }
            }
            3 => {
                // `None` means the editor was closed without saving.
                match Editor::new().extension(".txt").edit(ocr_text)? {
                    Some(edited) => {
                        let out = scan_text(edited, self.config);
                        eprintln!(
                            "{}",
                            style(format!("Re-extracted {} subjects", out.table.len())).dim()
                        );
                        session.load_rows(out.table)?;
                        *ocr_text = out.text;
                    }
                    None => warn("OCR text left unchanged"),
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn edit(&self, session: &mut Session, draft: &mut SubjectTable) -> Result<bool> {
        eprintln!("{}", render_subject_table(draft));
        eprintln!("{}", style(render_summary(&draft.summary())).dim());

        let items = [
            "Edit a subject",
            "Add a subject",
            "Remove a subject",
            "Change a subject's type",
            "Confirm changes",
            "Proceed",
            "Back",
            "Quit",
        ];
        let choice = Select::with_theme(&self.theme)
            .with_prompt("Subjects")
            .items(&items)
            .default(if session.is_confirmed() { 5 } else { 4 })
            .interact()?;

        match choice {
            0 => {
                if let Some(seq) = self.pick_row(draft)? {
                    let row = &draft.rows()[seq - 1];
                    let (name, credit) = (row.subject.clone(), row.credit);
                    let name = self.ask_subject(Some(name))?;
                    let credit = self.ask_credit(credit)?;
                    draft.edit(seq, name, credit);
                }
            }
            1 => {
                let name = self.ask_subject(None)?;
                let credit = self.ask_credit(3)?;
                let category = self.ask_category(Category::Theory)?;
                draft.push(name, credit, category);
            }
            2 => {
                if let Some(seq) = self.pick_row(draft)? {
                    draft.remove(seq);
                }
            }
            3 => {
                if let Some(seq) = self.pick_row(draft)? {
                    let current = draft.rows()[seq - 1].category;
                    let category = self.ask_category(current)?;
                    draft.set_category(seq, category);
                }
            }
            4 => {
                let summary = session.confirm(draft.clone())?;
                *draft = session.table().clone();
                eprintln!(
                    "{} Changes confirmed. {}",
                    style("✓").green(),
                    style(render_summary(&summary)).dim()
                );
            }
            5 => {
                if session.is_confirmed() && draft != session.table() {
                    warn(StepWarning::UnconfirmedEdits);
                } else if let Err(w) = session.proceed() {
                    warn(w);
                }
            }
            6 => {
                session.back()?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn inputs(&self, session: &mut Session) -> Result<bool> {
        let choice = Select::with_theme(&self.theme)
            .with_prompt("Known information")
            .items(&["Enter marks and analyze", "Back", "Quit"])
            .default(0)
            .interact()?;
        match choice {
            0 => {}
            1 => {
                session.back()?;
                return Ok(true);
            }
            _ => return Ok(false),
        }

        let scale = session.variant().scale();
        let letters = scale.letters();
        let default_target = session
            .inputs()
            .map(|i| i.target_cgpa)
            .or(self.cli.target)
            .unwrap_or(9.0);
        let mut inputs = PlanInputs::prefilled(session.table(), self.config, default_target);

        for row in session.table() {
            if let Some(current) = inputs.internals.get_mut(&row.subject) {
                *current = Input::with_theme(&self.theme)
                    .with_prompt(format!("{} – Internal (out of {MAX_INTERNAL})", row.subject))
                    .default(*current)
                    .validate_with(|m: &u8| {
                        if *m <= MAX_INTERNAL {
                            Ok(())
                        } else {
                            Err(format!("must be 0–{MAX_INTERNAL}"))
                        }
                    })
                    .interact_text()?;
            } else if let Some(current) = inputs.expected.get_mut(&row.subject) {
                let default_idx = letters.iter().position(|l| *l == current.as_str()).unwrap_or(1);
                let idx = Select::with_theme(&self.theme)
                    .with_prompt(format!("{} – Expected Grade", row.subject))
                    .items(&letters)
                    .default(default_idx)
                    .interact()?;
                *current = letters[idx].to_string();
            }
        }

        inputs.target_cgpa = Input::with_theme(&self.theme)
            .with_prompt("Target CGPA")
            .default(default_target)
            .validate_with(|t: &f64| {
                if (0.0..=10.0).contains(t) {
                    Ok(())
                } else {
                    Err("must be 0.0–10.0")
                }
            })
            .interact_text()?;

        if let Err(e) = session.analyze(inputs) {
            warn(e);
        }
        Ok(true)
    }

    fn pick_row(&self, table: &SubjectTable) -> Result<Option<usize>> {
        if table.is_empty() {
            warn("No subjects yet.");
            return Ok(None);
        }
        let labels: Vec<String> = table
            .iter()
            .map(|r| format!("{}. {} ({} cr, {})", r.sequence_number, r.subject, r.credit, r.category))
            .collect();
        let idx = Select::with_theme(&self.theme)
            .with_prompt("Which subject?")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(Some(idx + 1))
    }

    fn ask_subject(&self, current: Option<String>) -> Result<String> {
        let mut prompt = Input::<String>::with_theme(&self.theme).with_prompt("Subject");
        if let Some(name) = current {
            prompt = prompt.default(name);
        }
        Ok(prompt.interact_text()?.trim().to_string())
    }

    fn ask_credit(&self, current: u8) -> Result<u8> {
        Ok(Input::with_theme(&self.theme)
            .with_prompt("Credit")
            .default(current)
            .validate_with(|c: &u8| {
                if (1..=4).contains(c) {
                    Ok(())
                } else {
                    Err("credit must be 1–4")
                }
            })
            .interact_text()?)
    }

    fn ask_category(&self, current: Category) -> Result<Category> {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        let default_idx = Category::ALL.iter().position(|&c| c == current).unwrap_or(0);
        let idx = Select::with_theme(&self.theme)
            .with_prompt("Type")
            .items(&labels)
            .default(default_idx)
            .interact()?;
        Ok(Category::ALL[idx])
    }
}

fn header(step: Step) {
    eprintln!();
    eprintln!("{} {}", style("◆").cyan(), style(step).bold());
    eprintln!("{}", style("─".repeat(50)).dim());
}

fn warn(msg: impl Display) {
    eprintln!("{} {}", style("⚠").yellow(), msg);
}

/// Parse `"Subject=25"` for `--internal`.
fn parse_internal(s: &str) -> Result<(String, u8), String> {
    let (subject, mark) = split_assignment(s)?;
    let mark: u8 = mark
        .parse()
        .map_err(|_| format!("invalid internal mark '{mark}'"))?;
    if mark > MAX_INTERNAL {
        return Err(format!("internal mark must be 0–{MAX_INTERNAL}, got {mark}"));
    }
    Ok((subject, mark))
}

/// Parse `"Subject=Lab"` for `--type`.
fn parse_type(s: &str) -> Result<(String, Category), String> {
    let (subject, category) = split_assignment(s)?;
    Ok((subject, category.parse()?))
}

/// Parse `"Subject=A"` for `--expected`. The letter is checked against the
/// scale later, once the variant is known.
fn parse_expected(s: &str) -> Result<(String, String), String> {
    let (subject, letter) = split_assignment(s)?;
    Ok((subject, letter.to_uppercase()))
}

fn split_assignment(s: &str) -> Result<(String, &str), String> {
    let (subject, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected SUBJECT=VALUE, got '{s}'"))?;
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(format!("missing subject in '{s}'"));
    }
    Ok((subject.to_string(), value.trim()))
}
