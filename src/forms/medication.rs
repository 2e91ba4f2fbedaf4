use super::{or_default, DialogForm, FormContext, InputState, ListUpdate, SlotMap, Submission};
use crate::api::models::{CreateKind, CreateRequest, MedicationEntry};
use crate::dialog::DialogKind;
use crate::error::{DeskError, DeskResult};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const MEDICATIONS: &[&str] = &["Aspirin", "Metformin", "Ibuprofen", "Lisinopril"];
pub const ROUTES: &[&str] = &["Oral", "IV", "IM", "Subcutaneous"];
pub const SCHEDULES: &[&str] = &["Daily", "BID", "TID", "QID"];
pub const PRIORITIES: &[&str] = &["Routine", "Urgent", "STAT"];
pub const DURATION_UNITS: &[&str] = &["days", "weeks", "months"];

/// One staged line of a bulk medication order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationRow {
    pub medication_name: String,
    pub dosage: String,
    pub route: String,
    pub schedule: String,
    pub prn: bool,
    pub duration: String,
    pub duration_unit: String,
    pub priority: String,
    pub additional_dose_now: bool,
    pub comment: String,
}

impl Default for MedicationRow {
    fn default() -> Self {
        Self {
            medication_name: String::new(),
            dosage: String::new(),
            route: ROUTES[0].into(),
            schedule: SCHEDULES[0].into(),
            prn: false,
            duration: "1".into(),
            duration_unit: DURATION_UNITS[0].into(),
            priority: PRIORITIES[0].into(),
            additional_dose_now: false,
            comment: String::new(),
        }
    }
}

impl MedicationRow {
    pub fn for_medication(name: &str) -> Self {
        Self {
            medication_name: name.to_string(),
            ..Self::default()
        }
    }

    fn to_entry(&self) -> MedicationEntry {
        MedicationEntry {
            id: String::new(),
            name: self.medication_name.clone(),
            reason: or_default(&self.comment, "General"),
            amount: or_default(&self.dosage, "N/A"),
            timing: or_default(&self.schedule, "N/A"),
            status: "Active".into(),
        }
    }
}

/// Medication dialog: a single free entry plus a staged order list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationForm {
    pub name: String,
    pub reason: String,
    pub amount: String,
    pub timing: String,
    /// Text typed into the order search box.
    pub search: String,
    pub rows: Vec<MedicationRow>,
}

impl MedicationForm {
    /// Medications from the order list matching `search`, best match first.
    pub fn matches(&self) -> Vec<&'static str> {
        let query = self.search.trim();
        if query.is_empty() {
            return MEDICATIONS.to_vec();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &'static str)> = MEDICATIONS
            .iter()
            .filter_map(|m| matcher.fuzzy_match(m, query).map(|s| (s, *m)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, m)| m).collect()
    }

    /// Stage a medication picked from the order list.
    pub fn stage(&mut self, name: &str) {
        self.rows.push(MedicationRow::for_medication(name));
        self.search.clear();
    }

    pub fn remove_row(&mut self, idx: usize) {
        if idx < self.rows.len() {
            self.rows.remove(idx);
        }
    }

    pub fn clear_staged(&mut self) {
        self.rows.clear();
    }
}

impl DialogForm for MedicationForm {
    const KIND: DialogKind = DialogKind::Medication;

    fn validate(&self, _ctx: &FormContext) -> DeskResult<()> {
        if self.rows.is_empty() && self.name.trim().is_empty() {
            return Err(DeskError::validation("name", "Medication name is required."));
        }
        Ok(())
    }

    fn submission(&self, _ctx: &FormContext) -> Submission {
        if !self.rows.is_empty() {
            let orders: Vec<_> = self
                .rows
                .iter()
                .map(|r| serde_json::to_value(r).unwrap_or_else(|_| json!({})))
                .collect();
            let count = self.rows.len();
            return Submission {
                remote: Some(CreateRequest::new(CreateKind::Medication).field("Orders", orders)),
                update: ListUpdate::Medications(self.rows.iter().map(MedicationRow::to_entry).collect()),
                success: if count == 1 {
                    "Medication added successfully!".into()
                } else {
                    "Medications added successfully!".into()
                },
            };
        }
        let entry = MedicationEntry {
            id: String::new(),
            name: self.name.trim().to_string(),
            reason: or_default(&self.reason, "General"),
            amount: or_default(&self.amount, "N/A"),
            timing: or_default(&self.timing, "N/A"),
            status: "Active".into(),
        };
        let request = CreateRequest::new(CreateKind::Medication).field(
            "Orders",
            vec![json!({
                "medicationName": entry.name,
                "reason": entry.reason,
                "dosage": entry.amount,
                "schedule": entry.timing,
            })],
        );
        Submission {
            remote: Some(request),
            update: ListUpdate::Medications(vec![entry]),
            success: "Medication added successfully!".into(),
        }
    }

    fn slots(state: &InputState) -> &SlotMap<Self> {
        &state.medications
    }

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self> {
        &mut state.medications
    }
}
