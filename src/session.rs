//! The four-step planning wizard as an explicit state machine.
//!
//! ```text
//!  ┌──────────┐ proceed ┌──────────────┐ proceed* ┌─────────────┐ analyze ┌──────────┐
//!  │ 1 Upload │───────▶│ 2 EditSubjects│────────▶│ 3 EnterInputs│───────▶│ 4 Analysis│
//!  └──────────┘◀───────└──────────────┘◀────────└─────────────┘         └──────────┘
//!       ▲          back                   back                               │
//!       └──────────────────────────── start_over ─────────────────────────────┘
//!
//!  * only after the edits have been confirmed
//! ```
//!
//! Every method either performs its transition or returns a
//! [`StepWarning`] and leaves the session untouched. Front ends (the
//! terminal wizard, tests, anything else) own the I/O and just call these.

use crate::error::{GradeSenseError, StepWarning};
use crate::grade::ScaleVariant;
use crate::plan::{analyze, Analysis, PlanInputs};
use crate::subject::{SubjectTable, TableSummary};
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    Upload,
    EditSubjects,
    EnterInputs,
    Analysis,
}

impl Step {
    /// 1-based step number as shown to the user.
    pub fn number(self) -> u8 {
        match self {
            Step::Upload => 1,
            Step::EditSubjects => 2,
            Step::EnterInputs => 3,
            Step::Analysis => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Upload => "Upload Almanac",
            Step::EditSubjects => "Edit & Confirm Subjects",
            Step::EnterInputs => "Enter Known Information",
            Step::Analysis => "CGPA Strategy Analysis",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.title())
    }
}

/// State carried between wizard steps.
#[derive(Debug, Clone)]
pub struct Session {
    variant: ScaleVariant,
    step: Step,
    table: SubjectTable,
    scanned: bool,
    confirmed: bool,
    inputs: Option<PlanInputs>,
    analysis: Option<Analysis>,
}

impl Session {
    pub fn new(variant: ScaleVariant) -> Self {
        Self {
            variant,
            step: Step::Upload,
            table: SubjectTable::new(),
            scanned: false,
            confirmed: false,
            inputs: None,
            analysis: None,
        }
    }

    pub fn variant(&self) -> ScaleVariant {
        self.variant
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// The current subject table; empty before anything was scanned.
    pub fn table(&self) -> &SubjectTable {
        &self.table
    }

    pub fn summary(&self) -> TableSummary {
        self.table().summary()
    }

    pub fn inputs(&self) -> Option<&PlanInputs> {
        self.inputs.as_ref()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Store freshly extracted rows. Any earlier confirmation is void.
    pub fn load_rows(&mut self, table: SubjectTable) -> Result<(), StepWarning> {
        self.expect(Step::Upload, "load rows")?;
        debug!("Loaded {} extracted rows", table.len());
        self.table = table;
        self.scanned = true;
        self.confirmed = false;
        Ok(())
    }

    /// Save the edited table: blank rows are dropped and the rest renumbered.
    pub fn confirm(&mut self, mut table: SubjectTable) -> Result<TableSummary, StepWarning> {
        self.expect(Step::EditSubjects, "confirm")?;
        table.drop_blank();
        let summary = table.summary();
        self.table = table;
        self.confirmed = true;
        Ok(summary)
    }

    /// Move forward one step.
    pub fn proceed(&mut self) -> Result<Step, StepWarning> {
        let next = match self.step {
            Step::Upload if !self.scanned => return Err(StepWarning::NothingScanned),
            Step::Upload => Step::EditSubjects,
            Step::EditSubjects if !self.confirmed => return Err(StepWarning::UnconfirmedEdits),
            Step::EditSubjects => Step::EnterInputs,
            Step::EnterInputs | Step::Analysis => return Err(self.invalid("proceed")),
        };
        self.step = next;
        Ok(next)
    }

    /// Move back one step. Nothing entered so far is lost.
    pub fn back(&mut self) -> Result<Step, StepWarning> {
        let prev = match self.step {
            Step::EditSubjects => Step::Upload,
            Step::EnterInputs => Step::EditSubjects,
            Step::Upload | Step::Analysis => return Err(self.invalid("go back")),
        };
        self.step = prev;
        Ok(prev)
    }

    /// Validate the inputs, run both plans and move to the analysis step.
    pub fn analyze(&mut self, inputs: PlanInputs) -> Result<&Analysis, GradeSenseError> {
        self.expect(Step::EnterInputs, "analyze")?;
        let analysis = analyze(&self.table, &inputs, self.variant)?;
        self.inputs = Some(inputs);
        self.step = Step::Analysis;
        Ok(self.analysis.insert(analysis))
    }

    /// Throw everything away and return to the upload step.
    pub fn start_over(&mut self) -> Result<Step, StepWarning> {
        self.expect(Step::Analysis, "start over")?;
        *self = Session::new(self.variant);
        Ok(self.step)
    }

    fn expect(&self, step: Step, action: &str) -> Result<(), StepWarning> {
        if self.step == step {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &str) -> StepWarning {
        StepWarning::InvalidTransition {
            action: action.to_string(),
            step: self.step.number(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ScaleVariant::default())
    }
}
