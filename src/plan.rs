//! Grade planning arithmetic.
//!
//! Two independent plans are produced for a confirmed subject table:
//!
//! * **Heuristic** — a fixed lookup: 3+ credit theory subjects get the top
//!   grade, smaller theory subjects the next grade down, everything else
//!   the "good enough" second grade. It ignores the target CGPA.
//! * **Back-solved** — the exact average grade point the unknown subjects
//!   need so the credit-weighted mean reaches the target:
//!
//! ```text
//! total_credits     = Σ credit
//! target_points     = target_cgpa × total_credits
//! earned_points     = Σ points × credit        (subjects with a known grade)
//! remaining_credits = total_credits − earned_credits
//! required_average  = (target_points − earned_points) / remaining_credits
//!                     (0 when remaining_credits = 0)
//! ```

use crate::config::{PlannerConfig, MAX_INTERNAL};
use crate::error::GradeSenseError;
use crate::grade::{GradeScale, ScaleVariant};
use crate::subject::{Category, SubjectTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Highest CGPA on a 10-point scale.
pub const MAX_CGPA: f64 = 10.0;

/// What the user told us at the input step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanInputs {
    /// Internal-assessment mark (0–30) per theory subject.
    pub internals: BTreeMap<String, u8>,
    /// Expected letter grade per non-theory subject.
    pub expected: BTreeMap<String, String>,
    pub target_cgpa: f64,
}

impl PlanInputs {
    /// Pre-fill inputs the way the input step does: every theory subject
    /// gets the default internal mark (classic scale only) and every other
    /// subject the default expected grade.
    pub fn prefilled(table: &SubjectTable, config: &PlannerConfig, target_cgpa: f64) -> Self {
        let mut inputs = PlanInputs {
            target_cgpa,
            ..Default::default()
        };
        for row in table {
            if row.category.is_theory() {
                if config.variant.collects_internals() {
                    inputs
                        .internals
                        .insert(row.subject.clone(), config.default_internal);
                }
            } else {
                inputs.expected.insert(
                    row.subject.clone(),
                    config.default_expected_letter().to_string(),
                );
            }
        }
        inputs
    }

    /// Check ranges and that each input fits the row it names: internal
    /// marks only for theory subjects on a scale that collects them,
    /// expected grades only for non-theory subjects and only on the scale.
    pub fn validate(&self, table: &SubjectTable, variant: ScaleVariant) -> Result<(), GradeSenseError> {
        if !self.target_cgpa.is_finite() || !(0.0..=MAX_CGPA).contains(&self.target_cgpa) {
            return Err(invalid(format!(
                "target CGPA must be 0.0–{:.1}, got {}",
                MAX_CGPA, self.target_cgpa
            )));
        }

        for (subject, &mark) in &self.internals {
            let category = category_of(table, subject)?;
            if !variant.collects_internals() {
                return Err(invalid(format!(
                    "internal marks are not used on the {variant} scale (got one for '{subject}')"
                )));
            }
            if !category.is_theory() {
                return Err(invalid(format!(
                    "internal mark given for '{subject}', which is {category}; only Theory subjects have internals"
                )));
            }
            if mark > MAX_INTERNAL {
                return Err(invalid(format!(
                    "internal mark for '{subject}' must be 0–{MAX_INTERNAL}, got {mark}"
                )));
            }
        }

        let scale = variant.scale();
        for (subject, letter) in &self.expected {
            if category_of(table, subject)?.is_theory() {
                return Err(invalid(format!(
                    "expected grade given for Theory subject '{subject}'; its grade is back-solved"
                )));
            }
            if scale.get(letter).is_none() {
                return Err(invalid(format!(
                    "expected grade '{}' for '{}' is not one of {}",
                    letter,
                    subject,
                    scale.letters().join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn category_of(table: &SubjectTable, subject: &str) -> Result<Category, GradeSenseError> {
    table
        .find(subject)
        .map(|row| row.category)
        .ok_or_else(|| invalid(format!("'{subject}' is not in the subject table")))
}

fn invalid(msg: String) -> GradeSenseError {
    GradeSenseError::InvalidInputs(msg)
}

/// Internal mark out of 30 rescaled to grade points out of 10.
pub fn internal_grade_points(internal: u8) -> f64 {
    f64::from(internal) / f64::from(MAX_INTERNAL) * 10.0
}

// ── Heuristic plan ───────────────────────────────────────────────────────────

/// One row of the heuristic plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicRow {
    pub subject: String,
    pub credit: u8,
    pub grade: &'static str,
    /// End-semester marks target; `None` for non-theory subjects.
    pub marks: Option<&'static str>,
}

/// Fixed suggested-grade lookup; does not look at the target CGPA.
pub fn heuristic_plan(table: &SubjectTable, scale: &GradeScale) -> Vec<HeuristicRow> {
    table
        .iter()
        .map(|row| {
            if row.category.is_theory() {
                let grade = if row.credit >= 3 {
                    scale.top()
                } else {
                    scale.second()
                };
                HeuristicRow {
                    subject: row.subject.clone(),
                    credit: row.credit,
                    grade: grade.letter,
                    marks: Some(grade.marks),
                }
            } else {
                HeuristicRow {
                    subject: row.subject.clone(),
                    credit: row.credit,
                    grade: scale.second().letter,
                    marks: None,
                }
            }
        })
        .collect()
}

// ── Back-solved plan ─────────────────────────────────────────────────────────

/// The weighted-average arithmetic on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Requirement {
    pub total_credits: u32,
    pub target_points: f64,
    pub earned_points: f64,
    pub earned_credits: u32,
    pub remaining_credits: u32,
    /// Average grade point the unknown subjects need; 0 when none remain.
    pub required_average: f64,
}

/// Solve for the average the unknown subjects need.
///
/// `subjects` yields `(credit, known_points)`; `None` marks a subject whose
/// grade is still open.
pub fn required_average<I>(subjects: I, target_cgpa: f64) -> Requirement
where
    I: IntoIterator<Item = (u8, Option<u8>)>,
{
    let mut total_credits = 0u32;
    let mut earned_credits = 0u32;
    let mut earned_points = 0.0f64;

    for (credit, points) in subjects {
        let credit = u32::from(credit);
        total_credits += credit;
        if let Some(p) = points {
            earned_credits += credit;
            earned_points += f64::from(p) * f64::from(credit);
        }
    }

    let target_points = target_cgpa * f64::from(total_credits);
    let remaining_credits = total_credits - earned_credits;
    let required_average = if remaining_credits > 0 {
        (target_points - earned_points) / f64::from(remaining_credits)
    } else {
        0.0
    };

    Requirement {
        total_credits,
        target_points,
        earned_points,
        earned_credits,
        remaining_credits,
        required_average,
    }
}

/// Whether a row's grade came from the user or from the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeSource {
    Expected,
    Required,
}

/// One row of the back-solved plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacksolveRow {
    pub subject: String,
    pub credit: u8,
    pub category: Category,
    pub source: GradeSource,
    pub grade: &'static str,
    pub points: u8,
    pub marks: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacksolvePlan {
    pub requirement: Requirement,
    /// Grade the unknown subjects should aim for.
    pub required_grade: &'static str,
    /// False when even the top grade everywhere cannot reach the target.
    pub feasible: bool,
    pub rows: Vec<BacksolveRow>,
}

/// Back-solve the grade every subject without an expected grade needs.
pub fn backsolve_plan(table: &SubjectTable, inputs: &PlanInputs, scale: &GradeScale) -> BacksolvePlan {
    let known = |subject: &str| inputs.expected.get(subject).and_then(|l| scale.get(l));

    let requirement = required_average(
        table
            .iter()
            .map(|r| (r.credit, known(&r.subject).map(|g| g.points))),
        inputs.target_cgpa,
    );
    let required = scale.grade_from_points(requirement.required_average);
    let feasible = requirement.required_average <= f64::from(scale.top().points);

    debug!(
        "Back-solve: target {:.2} over {} credits, need {:.2} on {} remaining credits",
        inputs.target_cgpa,
        requirement.total_credits,
        requirement.required_average,
        requirement.remaining_credits
    );

    let rows = table
        .iter()
        .map(|row| {
            let (source, grade) = match known(&row.subject) {
                Some(g) => (GradeSource::Expected, g),
                None => (GradeSource::Required, required),
            };
            let internal = inputs.internals.get(&row.subject).copied();
            BacksolveRow {
                subject: row.subject.clone(),
                credit: row.credit,
                category: row.category,
                source,
                grade: grade.letter,
                points: grade.points,
                marks: grade.marks,
                internal,
                internal_points: internal.map(internal_grade_points),
            }
        })
        .collect();

    BacksolvePlan {
        requirement,
        required_grade: required.letter,
        feasible,
        rows,
    }
}

// ── Verdict & strategy text ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    VeryDifficult,
    Achievable,
    Comfortable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub difficulty: Difficulty,
    pub message: String,
}

/// Quick verdict on how hard the target is.
pub fn verdict(target_cgpa: f64, scale: &GradeScale) -> Verdict {
    if target_cgpa >= 9.5 {
        Verdict {
            difficulty: Difficulty::VeryDifficult,
            message: format!("Very difficult — requires almost all {}", scale.top().letter),
        }
    } else if target_cgpa >= 9.0 {
        Verdict {
            difficulty: Difficulty::Achievable,
            message: "Achievable with strong performance in theory subjects".to_string(),
        }
    } else {
        Verdict {
            difficulty: Difficulty::Comfortable,
            message: "Comfortably achievable".to_string(),
        }
    }
}

/// Rule-of-thumb advice shown above the heuristic plan.
pub fn simple_advice(scale: &GradeScale) -> Vec<String> {
    let (top, second) = (scale.top().letter, scale.second().letter);
    vec![
        format!("3-credit theory subjects → mostly {top}"),
        format!("One 3-credit subject can drop to {second}"),
        format!("Labs / Internship → {second} is enough"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Safe,
    Balanced,
    Risky,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strategy {
    pub risk: Risk,
    pub description: String,
}

/// The three canned strategies, from safest to riskiest.
pub fn strategies(scale: &GradeScale) -> Vec<Strategy> {
    let (top, second) = (scale.top().letter, scale.second().letter);
    vec![
        Strategy {
            risk: Risk::Safe,
            description: format!("All 3-credit → {top}"),
        },
        Strategy {
            risk: Risk::Balanced,
            description: format!("2 × {top} + 1 × {second}"),
        },
        Strategy {
            risk: Risk::Risky,
            description: format!("1 × {top} + labs must be {top}"),
        },
    ]
}

// ── Full analysis ────────────────────────────────────────────────────────────

/// Everything the analysis step shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub variant: ScaleVariant,
    pub target_cgpa: f64,
    pub verdict: Verdict,
    pub advice: Vec<String>,
    pub heuristic: Vec<HeuristicRow>,
    pub backsolve: BacksolvePlan,
    pub strategies: Vec<Strategy>,
    /// Grade → end-semester marks guide.
    pub marks_guide: Vec<(&'static str, &'static str)>,
}

/// Validate inputs and build both plans.
pub fn analyze(
    table: &SubjectTable,
    inputs: &PlanInputs,
    variant: ScaleVariant,
) -> Result<Analysis, GradeSenseError> {
    inputs.validate(table, variant)?;
    let scale = variant.scale();

    Ok(Analysis {
        variant,
        target_cgpa: inputs.target_cgpa,
        verdict: verdict(inputs.target_cgpa, &scale),
        advice: simple_advice(&scale),
        heuristic: heuristic_plan(table, &scale),
        backsolve: backsolve_plan(table, inputs, &scale),
        strategies: strategies(&scale),
        marks_guide: scale.grades().iter().map(|g| (g.letter, g.marks)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> GradeScale {
        ScaleVariant::Classic.scale()
    }

    fn table() -> SubjectTable {
        let mut t = SubjectTable::new();
        t.push("Compiler Design", 4, Category::Theory);
        t.push("Software Testing", 2, Category::Theory);
        t.push("Compiler Laboratory", 2, Category::Lab);
        t.push("Summer Internship", 1, Category::Internship);
        t
    }

    #[test]
    fn target_points_scale_with_credits() {
        let req = required_average([(3, None), (4, None), (2, None)], 8.5);
        assert_eq!(req.total_credits, 9);
        assert!((req.target_points - 76.5).abs() < 1e-9);
        assert!((req.required_average - 8.5).abs() < 1e-9);
    }

    #[test]
    fn worked_example_from_half_known_grades() {
        let req = required_average([(3, Some(9)), (3, None)], 9.0);
        assert_eq!(req.total_credits, 6);
        assert!((req.target_points - 54.0).abs() < 1e-9);
        assert!((req.earned_points - 27.0).abs() < 1e-9);
        assert_eq!(req.remaining_credits, 3);
        assert!((req.required_average - 9.0).abs() < 1e-9);
        assert_eq!(classic().grade_from_points(req.required_average).letter, "A");
    }

    #[test]
    fn all_known_means_zero_required() {
        let req = required_average([(3, Some(10)), (2, Some(8))], 9.9);
        assert_eq!(req.remaining_credits, 0);
        assert_eq!(req.required_average, 0.0);
    }

    #[test]
    fn empty_table_is_all_zero() {
        let req = required_average(std::iter::empty(), 8.0);
        assert_eq!(req.total_credits, 0);
        assert_eq!(req.target_points, 0.0);
        assert_eq!(req.required_average, 0.0);
    }

    #[test]
    fn heuristic_follows_credit_and_category() {
        let plan = heuristic_plan(&table(), &classic());
        let grades: Vec<_> = plan.iter().map(|r| (r.grade, r.marks)).collect();
        assert_eq!(
            grades,
            vec![
                ("A+", Some("60+")),
                ("A", Some("55+")),
                ("A", None),
                ("A", None),
            ]
        );
    }

    #[test]
    fn heuristic_on_letter_scale_uses_s() {
        let plan = heuristic_plan(&table(), &ScaleVariant::Letter.scale());
        assert_eq!(plan[0].grade, "S");
        assert_eq!(plan[1].grade, "A");
    }

    #[test]
    fn backsolve_marks_expected_and_required_rows() {
        let t = table();
        let config = PlannerConfig::default();
        let inputs = PlanInputs::prefilled(&t, &config, 9.0);
        let plan = backsolve_plan(&t, &inputs, &classic());

        // 9 credits, target 81; lab A (2×9) + internship A (1×9) = 27 earned
        // → (81 − 27) / 6 = 9.0 → A
        assert_eq!(plan.requirement.total_credits, 9);
        assert_eq!(plan.requirement.remaining_credits, 6);
        assert!((plan.requirement.required_average - 9.0).abs() < 1e-9);
        assert_eq!(plan.required_grade, "A");
        assert!(plan.feasible);

        assert_eq!(plan.rows[0].source, GradeSource::Required);
        assert_eq!(plan.rows[0].internal, Some(20));
        assert_eq!(plan.rows[2].source, GradeSource::Expected);
        assert_eq!(plan.rows[2].internal, None);
    }

    #[test]
    fn unreachable_target_is_infeasible() {
        let t = table();
        let mut inputs = PlanInputs::prefilled(&t, &PlannerConfig::default(), 10.0);
        inputs.expected.insert("Compiler Laboratory".into(), "D".into());
        let plan = backsolve_plan(&t, &inputs, &classic());
        assert!(plan.requirement.required_average > 10.0);
        assert_eq!(plan.required_grade, "A+");
        assert!(!plan.feasible);
    }

    #[test]
    fn prefill_skips_internals_on_letter_scale() {
        let config = PlannerConfig::builder()
            .variant(ScaleVariant::Letter)
            .build()
            .unwrap();
        let inputs = PlanInputs::prefilled(&table(), &config, 8.0);
        assert!(inputs.internals.is_empty());
        assert_eq!(inputs.expected.len(), 2);
    }

    #[test]
    fn validate_rejects_bad_inputs() {
        let t = table();
        let mut inputs = PlanInputs {
            target_cgpa: 10.5,
            ..Default::default()
        };
        assert!(inputs.validate(&t, ScaleVariant::Classic).is_err());

        inputs.target_cgpa = 8.0;
        inputs.internals.insert("Compiler Design".into(), 31);
        assert!(inputs.validate(&t, ScaleVariant::Classic).is_err());

        inputs.internals.insert("Compiler Design".into(), 30);
        inputs.expected.insert("Compiler Laboratory".into(), "S".into());
        let err = inputs.validate(&t, ScaleVariant::Classic).unwrap_err();
        assert!(err.to_string().contains("A+, A, B, C, D"), "got: {err}");
    }

    #[test]
    fn internals_only_for_theory_rows() {
        let t = table();
        let mut inputs = PlanInputs::prefilled(&t, &PlannerConfig::default(), 8.0);
        assert!(inputs.validate(&t, ScaleVariant::Classic).is_ok());

        inputs.internals.insert("Compiler Laboratory".into(), 10);
        let err = inputs.validate(&t, ScaleVariant::Classic).unwrap_err();
        assert!(err.to_string().contains("only Theory subjects"), "got: {err}");
    }

    #[test]
    fn internals_refused_on_letter_scale() {
        let t = table();
        let mut inputs = PlanInputs {
            target_cgpa: 8.0,
            ..Default::default()
        };
        inputs.internals.insert("Compiler Design".into(), 20);
        let err = analyze(&t, &inputs, ScaleVariant::Letter).unwrap_err();
        assert!(matches!(err, GradeSenseError::InvalidInputs(_)));
        assert!(err.to_string().contains("letter scale"), "got: {err}");
    }

    #[test]
    fn expected_grade_refused_for_theory_row() {
        let t = table();
        let mut inputs = PlanInputs {
            target_cgpa: 8.0,
            ..Default::default()
        };
        inputs.expected.insert("Software Testing".into(), "A".into());
        let err = inputs.validate(&t, ScaleVariant::Classic).unwrap_err();
        assert!(err.to_string().contains("back-solved"), "got: {err}");
    }

    #[test]
    fn inputs_for_unknown_subjects_are_refused() {
        let mut inputs = PlanInputs {
            target_cgpa: 8.0,
            ..Default::default()
        };
        inputs.expected.insert("Basket Weaving".into(), "A".into());
        let err = inputs.validate(&table(), ScaleVariant::Classic).unwrap_err();
        assert!(err.to_string().contains("not in the subject table"), "got: {err}");
    }

    #[test]
    fn internal_points_rescale() {
        assert!((internal_grade_points(30) - 10.0).abs() < 1e-9);
        assert!((internal_grade_points(15) - 5.0).abs() < 1e-9);
        assert_eq!(internal_grade_points(0), 0.0);
    }

    #[test]
    fn verdict_thresholds() {
        let scale = classic();
        assert_eq!(verdict(9.5, &scale).difficulty, Difficulty::VeryDifficult);
        assert!(verdict(9.7, &scale).message.contains("A+"));
        assert_eq!(verdict(9.0, &scale).difficulty, Difficulty::Achievable);
        assert_eq!(verdict(8.99, &scale).difficulty, Difficulty::Comfortable);
    }

    #[test]
    fn analyze_rejects_invalid_target() {
        let err = analyze(
            &table(),
            &PlanInputs {
                target_cgpa: -1.0,
                ..Default::default()
            },
            ScaleVariant::Classic,
        )
        .unwrap_err();
        assert!(matches!(err, GradeSenseError::InvalidInputs(_)));
    }

    #[test]
    fn analyze_builds_guide_in_scale_order() {
        let analysis = analyze(&table(), &PlanInputs::default(), ScaleVariant::Letter).unwrap();
        assert_eq!(analysis.marks_guide[0], ("S", "60+"));
        assert_eq!(analysis.marks_guide.len(), 5);
        assert_eq!(analysis.strategies.len(), 3);
        assert_eq!(analysis.heuristic.len(), 4);
    }
}
