use super::{DialogForm, FormContext, InputState, ListUpdate, SlotMap, Submission};
use crate::api::models::{CreateKind, CreateRequest, ProblemEntry};
use crate::dialog::DialogKind;
use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};

pub const CATEGORIES: &[&str] = &["Common Problems", "Other"];

pub const PREFERRED_PROBLEMS: &[&str] = &[
    "Anemia (D64.9)",
    "Diabetes (E11.9)",
    "Dehydration (E86.0)",
    "Confusion (F29.)",
    "Depression (F32.9)",
    "Double vision (H53.2)",
    "Blurred Vision (H53.8)",
    "Defective Vision (H54.7)",
    "Eye Pain (H57.13)",
    "Ear Pain (H60.9)",
    "Fever (R50.9)",
];

pub const STATUSES: &[&str] = &["Active", "Inactive"];
pub const IMMEDIACIES: &[&str] = &["Unknown", "Acute", "Chronic"];
pub const SERVICES: &[&str] = &["Medicine", "Surgery", "Pediatrics", "Emergency"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProblemForm {
    /// Free text used when `other` is ticked.
    pub input: String,
    pub category: String,
    pub other: bool,
    pub preferred: Vec<String>,
    pub status: String,
    pub immediacy: String,
    pub date_onset: String,
    pub service: String,
    pub comment: String,
}

impl ProblemForm {
    pub fn toggle_preferred(&mut self, problem: &str, checked: bool) {
        let present = self.preferred.iter().any(|p| p == problem);
        if checked && !present {
            self.preferred.push(problem.to_string());
        } else if !checked {
            self.preferred.retain(|p| p != problem);
        }
    }

    /// Problems this form would create, preferred ones first.
    pub fn selections(&self) -> Vec<String> {
        let mut out = self.preferred.clone();
        let other = self.input.trim();
        if self.other && !other.is_empty() {
            out.push(other.to_string());
        }
        out
    }
}

impl DialogForm for ProblemForm {
    const KIND: DialogKind = DialogKind::Problem;

    fn validate(&self, ctx: &FormContext) -> DeskResult<()> {
        if self.selections().is_empty() {
            return Err(DeskError::validation(
                "problem",
                "Select a preferred problem or describe another problem.",
            ));
        }
        if ctx.require_problem_status {
            if self.status.trim().is_empty() {
                return Err(DeskError::validation("status", "Status is required."));
            }
            if self.immediacy.trim().is_empty() {
                return Err(DeskError::validation("immediacy", "Immediacy is required."));
            }
        }
        Ok(())
    }

    fn submission(&self, _ctx: &FormContext) -> Submission {
        let selections = self.selections();
        let request = CreateRequest::new(CreateKind::Problem)
            .field("cdpProbCat", self.category.clone())
            .field("Problems", selections.clone())
            .field("Status", self.status.clone())
            .field("Immediacy", self.immediacy.clone())
            .field("DateOnset", self.date_onset.clone())
            .field("Service", self.service.clone())
            .field("Comment", self.comment.clone());
        let entries = selections
            .into_iter()
            .map(|description| ProblemEntry {
                id: String::new(),
                description,
                date_onset: self.date_onset.clone(),
                status: self.status.clone(),
                immediacy: self.immediacy.clone(),
            })
            .collect();
        Submission {
            remote: Some(request),
            update: ListUpdate::Problems(entries),
            success: "Problem added successfully!".into(),
        }
    }

    fn slots(state: &InputState) -> &SlotMap<Self> {
        &state.problems
    }

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self> {
        &mut state.problems
    }
}
