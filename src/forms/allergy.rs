use super::{or_default, DialogForm, FormContext, InputState, ListUpdate, SlotMap, Submission};
use crate::api::models::{AllergyEntry, CreateKind, CreateRequest};
use crate::dialog::DialogKind;
use crate::error::{DeskError, DeskResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const SEVERITIES: &[&str] = &["Mild", "Moderate", "Severe"];
pub const STATUSES: &[&str] = &["Active", "Inactive"];

/// Detailed allergy entry: severity and status are part of the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AllergyForm {
    pub allergen: String,
    pub reaction: String,
    pub severity: String,
    pub date_onset: String,
    pub treatment: String,
    pub status: String,
    pub notes: String,
}

impl DialogForm for AllergyForm {
    const KIND: DialogKind = DialogKind::Allergy;

    fn validate(&self, _ctx: &FormContext) -> DeskResult<()> {
        if self.allergen.trim().is_empty() {
            return Err(DeskError::validation("allergen", "Allergen is required."));
        }
        if self.severity.trim().is_empty() {
            return Err(DeskError::validation("severity", "Severity is required."));
        }
        if self.status.trim().is_empty() {
            return Err(DeskError::validation("status", "Status is required."));
        }
        Ok(())
    }

    fn submission(&self, ctx: &FormContext) -> Submission {
        let entry = AllergyEntry {
            id: String::new(),
            allergen: self.allergen.trim().to_string(),
            reaction: or_default(&self.reaction, "Not specified"),
            severity: self.severity.clone(),
            date_onset: self.date_onset.clone(),
            treatment: self.treatment.clone(),
            status: self.status.clone(),
            notes: self.notes.clone(),
            created_by: ctx.provider_name.clone(),
            created_at: Some(Utc::now()),
        };
        let request = CreateRequest::new(CreateKind::Allergy)
            .field("cdaAllrgyS", entry.allergen.clone())
            .field("cdaSignSymL", entry.reaction.clone())
            .field("cdaSrty", entry.severity.clone())
            .field("cdaReDat", entry.date_onset.clone())
            .field("cdaCMT", entry.notes.clone())
            .field("Treatment", entry.treatment.clone())
            .field("Status", entry.status.clone());
        Submission {
            remote: Some(request),
            update: ListUpdate::Allergy(entry),
            success: "Allergy added successfully!".into(),
        }
    }

    fn slots(state: &InputState) -> &SlotMap<Self> {
        &state.allergies
    }

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self> {
        &mut state.allergies
    }
}
