//! Letter-grade scales.
//!
//! A scale is a short, fixed, descending list of letter grades with their
//! integer grade points and the approximate end-semester marks needed to
//! land each one. Two variants exist; they differ only in the name of the
//! top grade.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One rung of a grade scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub letter: &'static str,
    pub points: u8,
    /// Approximate end-semester mark needed, for display only.
    pub marks: &'static str,
}

/// Which grade scale to use.
///
/// | Variant | Grades |
/// |---------|--------|
/// | `Classic` | A+ (10), A (9), B (8), C (7), D (6) |
/// | `Letter`  | S (10), A (9), B (8), C (7), D (6) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleVariant {
    #[default]
    Classic,
    Letter,
}

impl ScaleVariant {
    pub fn scale(self) -> GradeScale {
        match self {
            ScaleVariant::Classic => GradeScale { grades: &CLASSIC },
            ScaleVariant::Letter => GradeScale { grades: &LETTER },
        }
    }

    /// Internal marks are only collected on the classic scale.
    pub fn collects_internals(self) -> bool {
        matches!(self, ScaleVariant::Classic)
    }
}

impl fmt::Display for ScaleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleVariant::Classic => f.write_str("classic"),
            ScaleVariant::Letter => f.write_str("letter"),
        }
    }
}

impl FromStr for ScaleVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "a" => Ok(ScaleVariant::Classic),
            "letter" | "b" | "s" => Ok(ScaleVariant::Letter),
            other => Err(format!("unknown grade scale '{other}' (expected classic or letter)")),
        }
    }
}

const CLASSIC: [Grade; 5] = [
    Grade { letter: "A+", points: 10, marks: "60+" },
    Grade { letter: "A", points: 9, marks: "55+" },
    Grade { letter: "B", points: 8, marks: "50+" },
    Grade { letter: "C", points: 7, marks: "45+" },
    Grade { letter: "D", points: 6, marks: "40+" },
];

const LETTER: [Grade; 5] = [
    Grade { letter: "S", points: 10, marks: "60+" },
    Grade { letter: "A", points: 9, marks: "55+" },
    Grade { letter: "B", points: 8, marks: "50+" },
    Grade { letter: "C", points: 7, marks: "45+" },
    Grade { letter: "D", points: 6, marks: "40+" },
];

/// A descending list of grades. Cheap to copy; the tables are static.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeScale {
    grades: &'static [Grade],
}

impl GradeScale {
    pub fn grades(&self) -> &'static [Grade] {
        self.grades
    }

    pub fn top(&self) -> Grade {
        self.grades[0]
    }

    /// The grade one step below the top ("A" on both scales).
    pub fn second(&self) -> Grade {
        self.grades[1]
    }

    pub fn lowest(&self) -> Grade {
        self.grades[self.grades.len() - 1]
    }

    /// Case-insensitive lookup by letter.
    pub fn get(&self, letter: &str) -> Option<Grade> {
        let letter = letter.trim();
        self.grades
            .iter()
            .copied()
            .find(|g| g.letter.eq_ignore_ascii_case(letter))
    }

    pub fn points(&self, letter: &str) -> Option<u8> {
        self.get(letter).map(|g| g.points)
    }

    /// Highest grade whose points are at or below `avg`.
    ///
    /// Scans in descending point order and falls back to the lowest grade
    /// when `avg` is below every threshold.
    pub fn grade_from_points(&self, avg: f64) -> Grade {
        self.grades
            .iter()
            .copied()
            .find(|g| f64::from(g.points) <= avg)
            .unwrap_or_else(|| self.lowest())
    }

    pub fn letters(&self) -> Vec<&'static str> {
        self.grades.iter().map(|g| g.letter).collect()
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        ScaleVariant::default().scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_from_points_boundaries() {
        let scale = ScaleVariant::Classic.scale();
        assert_eq!(scale.grade_from_points(10.0).letter, "A+");
        assert_eq!(scale.grade_from_points(12.5).letter, "A+");
        assert_eq!(scale.grade_from_points(9.99).letter, "A");
        assert_eq!(scale.grade_from_points(9.0).letter, "A");
        assert_eq!(scale.grade_from_points(8.5).letter, "B");
        assert_eq!(scale.grade_from_points(6.0).letter, "D");
        assert_eq!(scale.grade_from_points(5.0).letter, "D");
        assert_eq!(scale.grade_from_points(0.0).letter, "D");
    }

    #[test]
    fn letter_scale_top_is_s() {
        let scale = ScaleVariant::Letter.scale();
        assert_eq!(scale.top().letter, "S");
        assert_eq!(scale.second().letter, "A");
        assert_eq!(scale.grade_from_points(10.0).letter, "S");
        assert_eq!(scale.points("s"), Some(10));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let scale = ScaleVariant::Classic.scale();
        assert_eq!(scale.points("a+"), Some(10));
        assert_eq!(scale.points(" b "), Some(8));
        assert_eq!(scale.points("S"), None);
        assert_eq!(scale.get("c").map(|g| g.marks), Some("45+"));
    }

    #[test]
    fn variant_parsing() {
        assert_eq!("classic".parse::<ScaleVariant>(), Ok(ScaleVariant::Classic));
        assert_eq!("Letter".parse::<ScaleVariant>(), Ok(ScaleVariant::Letter));
        assert!("roman".parse::<ScaleVariant>().is_err());
        assert!(ScaleVariant::Classic.collects_internals());
        assert!(!ScaleVariant::Letter.collects_internals());
    }
}
