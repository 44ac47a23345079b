//! Row extraction: turn noisy OCR text into `(subject, credit)` rows.
//!
//! Transcript almanacs print one subject per line, usually as
//! `<course code> <subject name> <L T P> <credit>`. OCR mangles the
//! columns, so instead of parsing columns we apply a handful of cheap
//! regex rules per line and let the user fix the rest in the
//! correction grid. This is lossy by nature.
//!
//! ## Rules (applied per non-blank line, in order)
//!
//! 1. Find every standalone digit `1`–`4`. No match → not a subject row.
//!    Otherwise the **last** match is the credit.
//! 2. Strip course-code tokens (`U` + digits + trailing word characters).
//! 3. Replace digits, `|`, `_`, `-` and `–` with spaces.
//! 4. Collapse whitespace and trim.
//! 5. Keep the row only if the cleaned subject is longer than the
//!    configured minimum (5 characters by default).

use crate::subject::{Category, SubjectRow, SubjectTable};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Minimum cleaned subject length; a subject must be strictly longer.
pub const DEFAULT_MIN_SUBJECT_LEN: usize = 5;

static RE_CREDIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[1-4]\b").unwrap());

static RE_COURSE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bU\d+\w+\b").unwrap());

static RE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9|_–\-]").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Extract subject rows from raw OCR text with the default minimum length.
pub fn extract_rows(text: &str) -> SubjectTable {
    extract_rows_with(text, DEFAULT_MIN_SUBJECT_LEN)
}

/// Extract subject rows, keeping subjects longer than `min_subject_len`.
///
/// Every row starts out as [`Category::Theory`]; the user recategorises
/// labs and projects afterwards.
pub fn extract_rows_with(text: &str, min_subject_len: usize) -> SubjectTable {
    let rows: Vec<SubjectRow> = text
        .lines()
        .filter_map(|line| extract_line_with(line, min_subject_len))
        .map(|(subject, credit)| SubjectRow::new(subject, credit, Category::Theory))
        .collect();

    debug!("Extracted {} subject rows", rows.len());
    SubjectTable::from_rows(rows)
}

/// Apply the extraction rules to a single line.
///
/// Returns `None` when the line carries no credit digit or when the
/// cleaned subject is too short.
pub fn extract_line(line: &str) -> Option<(String, u8)> {
    extract_line_with(line, DEFAULT_MIN_SUBJECT_LEN)
}

fn extract_line_with(line: &str, min_subject_len: usize) -> Option<(String, u8)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let credit = find_credit(line)?;
    let subject = clean_subject(line);

    if subject.chars().count() > min_subject_len {
        Some((subject, credit))
    } else {
        None
    }
}

fn find_credit(line: &str) -> Option<u8> {
    RE_CREDIT
        .find_iter(line)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

fn clean_subject(line: &str) -> String {
    let s = RE_COURSE_CODE.replace_all(line, "");
    let s = RE_NOISE.replace_all(&s, " ");
    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}
