//! Markdown rendering of subject tables and analyses, plus file output.

use crate::error::GradeSenseError;
use crate::plan::{Analysis, GradeSource, Risk};
use crate::subject::{SubjectTable, TableSummary};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Render the subject table as a GFM table.
pub fn render_subject_table(table: &SubjectTable) -> String {
    let mut md = String::from("| S.No | Subject | Credit | Type |\n| --- | --- | --- | --- |\n");
    for row in table {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            row.sequence_number,
            escape_cell(&row.subject),
            row.credit,
            row.category
        );
    }
    md
}

/// One-line summary shown at the edit step.
pub fn render_summary(summary: &TableSummary) -> String {
    format!(
        "Subjects: {}  Total Credits: {}  Theory: {}  Labs / Other: {}",
        summary.subjects, summary.total_credits, summary.theory, summary.other
    )
}

/// Render the full analysis report.
pub fn render_markdown(analysis: &Analysis) -> String {
    let mut md = String::with_capacity(2048);
    let req = &analysis.backsolve.requirement;

    let _ = writeln!(md, "# CGPA Strategy Analysis\n");
    let _ = writeln!(
        md,
        "Target CGPA: **{:.2}** ({} scale)\n",
        analysis.target_cgpa, analysis.variant
    );

    let _ = writeln!(md, "## Quick Verdict\n");
    let _ = writeln!(md, "{}\n", analysis.verdict.message);

    let _ = writeln!(md, "## Option A — Simple Advisor\n");
    for line in &analysis.advice {
        let _ = writeln!(md, "- {line}");
    }
    md.push('\n');

    let _ = writeln!(md, "## Option B — Sample Subject-wise Plan\n");
    md.push_str("| Subject | Credits | Suggested Grade | Approx End-Sem Target |\n");
    md.push_str("| --- | --- | --- | --- |\n");
    for row in &analysis.heuristic {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            escape_cell(&row.subject),
            row.credit,
            row.grade,
            row.marks.unwrap_or("—")
        );
    }
    md.push('\n');

    let _ = writeln!(md, "## Required Grades for the Target\n");
    let _ = writeln!(md, "- Total credits: {}", req.total_credits);
    let _ = writeln!(md, "- Target grade points: {:.2}", req.target_points);
    let _ = writeln!(
        md,
        "- Earned from expected grades: {:.2} over {} credits",
        req.earned_points, req.earned_credits
    );
    let _ = writeln!(md, "- Remaining credits: {}", req.remaining_credits);
    if req.remaining_credits > 0 {
        let _ = writeln!(
            md,
            "- Required average: **{:.2}** → aim for **{}**",
            req.required_average, analysis.backsolve.required_grade
        );
    } else {
        let _ = writeln!(md, "- Every subject already has an expected grade");
    }
    if !analysis.backsolve.feasible {
        let _ = writeln!(
            md,
            "\n> The target is out of reach even with the top grade in every remaining subject."
        );
    }
    md.push('\n');

    md.push_str("| Subject | Credits | Type | Grade | Points | End-Sem Target | Internal |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for row in &analysis.backsolve.rows {
        let grade = match row.source {
            GradeSource::Expected => format!("{} (expected)", row.grade),
            GradeSource::Required => row.grade.to_string(),
        };
        let internal = match (row.internal, row.internal_points) {
            (Some(mark), Some(gp)) => format!("{mark}/30 ({gp:.1} GP)"),
            _ => "—".to_string(),
        };
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} | {} |",
            escape_cell(&row.subject),
            row.credit,
            row.category,
            grade,
            row.points,
            row.marks,
            internal
        );
    }
    md.push('\n');

    let _ = writeln!(md, "## Option C — Strategy Comparison\n");
    for s in &analysis.strategies {
        let label = match s.risk {
            Risk::Safe => "Safe",
            Risk::Balanced => "Balanced",
            Risk::Risky => "Risky",
        };
        let _ = writeln!(md, "- **{label}:** {}", s.description);
    }
    md.push('\n');

    let _ = writeln!(md, "### Grade → Marks Guide\n");
    md.push_str("| Grade | End-Sem Target |\n| --- | --- |\n");
    for (grade, marks) in &analysis.marks_guide {
        let _ = writeln!(md, "| {grade} | {marks} |");
    }

    md
}

/// Write `contents` to `path` atomically (temp file + rename).
pub async fn write_report(path: impl AsRef<Path>, contents: &str) -> Result<(), GradeSenseError> {
    let path = path.as_ref();
    let write_err = |source| GradeSenseError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// `plan.md` → `plan.md.tmp`, so no existing sibling is clobbered.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "report".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
