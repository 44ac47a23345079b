//! The editable subject table.
//!
//! Rows have no stable identity: sequence numbers are positional and are
//! reassigned after every edit. The subject name is what later steps use
//! to look a row up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of subject; decides which input the planner asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Theory,
    Lab,
    Internship,
    Project,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Theory,
        Category::Lab,
        Category::Internship,
        Category::Project,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Theory => "Theory",
            Category::Lab => "Lab",
            Category::Internship => "Internship",
            Category::Project => "Project",
        }
    }

    pub fn is_theory(self) -> bool {
        matches!(self, Category::Theory)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown subject type '{s}' (expected Theory, Lab, Internship or Project)"))
    }
}

/// One row of the subject table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRow {
    /// 1-based position in the table.
    pub sequence_number: usize,
    pub subject: String,
    /// Credit value, 1–4.
    pub credit: u8,
    pub category: Category,
}

impl SubjectRow {
    pub fn new(subject: impl Into<String>, credit: u8, category: Category) -> Self {
        Self {
            sequence_number: 0,
            subject: subject.into(),
            credit,
            category,
        }
    }
}

/// Counts shown next to the correction grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableSummary {
    pub subjects: usize,
    pub total_credits: u32,
    pub theory: usize,
    /// Labs, internships and projects.
    pub other: usize,
}

/// Ordered, editable list of subject rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectTable {
    rows: Vec<SubjectRow>,
}

impl SubjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<SubjectRow>) -> Self {
        let mut table = Self { rows };
        table.renumber();
        table
    }

    pub fn rows(&self) -> &[SubjectRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubjectRow> {
        self.rows.iter()
    }

    /// Append a row. Credits outside 1–4 are clamped.
    pub fn push(&mut self, subject: impl Into<String>, credit: u8, category: Category) {
        self.rows
            .push(SubjectRow::new(subject, credit.clamp(1, 4), category));
        self.renumber();
    }

    /// Remove the row with the given 1-based sequence number.
    pub fn remove(&mut self, sequence_number: usize) -> Option<SubjectRow> {
        let idx = self.index_of(sequence_number)?;
        let row = self.rows.remove(idx);
        self.renumber();
        Some(row)
    }

    /// Replace subject name and credit of an existing row.
    pub fn edit(&mut self, sequence_number: usize, subject: impl Into<String>, credit: u8) -> bool {
        let Some(idx) = self.index_of(sequence_number) else {
            return false;
        };
        let row = &mut self.rows[idx];
        row.subject = subject.into();
        row.credit = credit.clamp(1, 4);
        self.renumber();
        true
    }

    pub fn set_category(&mut self, sequence_number: usize, category: Category) -> bool {
        match self.index_of(sequence_number) {
            Some(idx) => {
                self.rows[idx].category = category;
                true
            }
            None => false,
        }
    }

    pub fn find(&self, subject: &str) -> Option<&SubjectRow> {
        self.rows.iter().find(|r| r.subject == subject)
    }

    /// Drop rows whose subject is blank and renumber what is left.
    pub fn drop_blank(&mut self) {
        self.rows.retain(|r| !r.subject.trim().is_empty());
        self.renumber();
    }

    pub fn total_credits(&self) -> u32 {
        self.rows.iter().map(|r| u32::from(r.credit)).sum()
    }

    pub fn summary(&self) -> TableSummary {
        let theory = self.rows.iter().filter(|r| r.category.is_theory()).count();
        TableSummary {
            subjects: self.rows.len(),
            total_credits: self.total_credits(),
            theory,
            other: self.rows.len() - theory,
        }
    }

    fn index_of(&self, sequence_number: usize) -> Option<usize> {
        sequence_number
            .checked_sub(1)
            .filter(|&i| i < self.rows.len())
    }

    fn renumber(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.sequence_number = i + 1;
        }
    }
}

impl<'a> IntoIterator for &'a SubjectTable {
    type Item = &'a SubjectRow;
    type IntoIter = std::slice::Iter<'a, SubjectRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
