//! Per-dialog input state.
//!
//! Every dialog kind has a form type implementing [`DialogForm`], which
//! supplies its seed values, its validation and the effect of a successful
//! submission. [`InputState`] keeps one mapping per kind, keyed by dialog id,
//! and dispatches on [`DialogKind`] through [`with_form!`].

pub mod allergy;
pub mod info_item;
pub mod medication;
pub mod problem;
pub mod radiology;
pub mod report;

pub use allergy::AllergyForm;
pub use info_item::InfoItemForm;
pub use medication::{MedicationForm, MedicationRow};
pub use problem::ProblemForm;
pub use radiology::RadiologyForm;
pub use report::ReportForm;

use crate::api::models::{
    AllergyEntry, CreateRequest, MedicationEntry, OrderEntry, ProblemEntry,
};
use crate::dialog::{DialogData, DialogId, DialogKind};
use crate::error::DeskResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub type SlotMap<F> = BTreeMap<DialogId, F>;

/// Deployment switches and identity used while validating and submitting.
#[derive(Debug, Clone)]
pub struct FormContext {
    /// Problems need a status and an immediacy before they can be created.
    pub require_problem_status: bool,
    /// Name recorded as the author of locally created entries.
    pub provider_name: String,
}

impl Default for FormContext {
    fn default() -> Self {
        Self {
            require_problem_status: true,
            provider_name: "Dr. User".into(),
        }
    }
}

/// Change applied to the dashboard lists after a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ListUpdate {
    Problems(Vec<ProblemEntry>),
    Medications(Vec<MedicationEntry>),
    Allergy(AllergyEntry),
    Order(OrderEntry),
    InfoItem { title: String, item: String },
}

/// What a validated form asks the desk to do.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Remote create call that must succeed before `update` is applied.
    pub remote: Option<CreateRequest>,
    pub update: ListUpdate,
    pub success: String,
}

pub trait DialogForm:
    Clone + Default + PartialEq + Serialize + DeserializeOwned + std::fmt::Debug
{
    const KIND: DialogKind;

    fn seed(_data: Option<&DialogData>) -> Self {
        Self::default()
    }

    /// Check required fields, reporting the first one that is missing.
    fn validate(&self, ctx: &FormContext) -> DeskResult<()>;

    /// Effect of submitting a form that passed [`DialogForm::validate`].
    fn submission(&self, ctx: &FormContext) -> Submission;

    fn slots(state: &InputState) -> &SlotMap<Self>;

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self>;
}

/// Run `$body` with `$form` bound to the form type of `$kind`.
macro_rules! with_form {
    ($kind:expr, $form:ident => $body:expr) => {
        match $kind {
            DialogKind::Problem => {
                type $form = ProblemForm;
                $body
            }
            DialogKind::Medication => {
                type $form = MedicationForm;
                $body
            }
            DialogKind::Allergy => {
                type $form = AllergyForm;
                $body
            }
            DialogKind::Radiology => {
                type $form = RadiologyForm;
                $body
            }
            DialogKind::Report => {
                type $form = ReportForm;
                $body
            }
            DialogKind::InfoItem => {
                type $form = InfoItemForm;
                $body
            }
        }
    };
}

/// Form state of every open dialog, one mapping per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub problems: SlotMap<ProblemForm>,
    pub medications: SlotMap<MedicationForm>,
    pub allergies: SlotMap<AllergyForm>,
    pub radiology: SlotMap<RadiologyForm>,
    pub reports: SlotMap<ReportForm>,
    pub info_items: SlotMap<InfoItemForm>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the seed values for a freshly opened dialog.
    pub fn seed(&mut self, kind: DialogKind, id: DialogId, data: Option<&DialogData>) {
        with_form!(kind, F => {
            F::slots_mut(self).insert(id, F::seed(data));
        })
    }

    /// Put a slot back to its seed values.
    pub fn reset(&mut self, kind: DialogKind, id: &DialogId, data: Option<&DialogData>) {
        with_form!(kind, F => {
            if let Some(slot) = F::slots_mut(self).get_mut(id) {
                *slot = F::seed(data);
            }
        })
    }

    /// Drop `id` from every mapping. Returns whether anything was removed.
    pub fn remove(&mut self, id: &DialogId) -> bool {
        let mut removed = false;
        for kind in DialogKind::ALL {
            removed |= with_form!(kind, F => F::slots_mut(self).remove(id).is_some());
        }
        removed
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.kind_of(id).is_some()
    }

    pub fn kind_of(&self, id: &DialogId) -> Option<DialogKind> {
        DialogKind::ALL
            .into_iter()
            .find(|&kind| with_form!(kind, F => F::slots(self).contains_key(id)))
    }

    pub fn slot<F: DialogForm>(&self, id: &DialogId) -> Option<&F> {
        F::slots(self).get(id)
    }

    pub fn slot_mut<F: DialogForm>(&mut self, id: &DialogId) -> Option<&mut F> {
        F::slots_mut(self).get_mut(id)
    }

    pub fn len_of(&self, kind: DialogKind) -> usize {
        with_form!(kind, F => F::slots(self).len())
    }

    pub fn ids_of(&self, kind: DialogKind) -> Vec<DialogId> {
        with_form!(kind, F => F::slots(self).keys().cloned().collect())
    }

    pub fn is_empty(&self) -> bool {
        DialogKind::ALL.into_iter().all(|k| self.len_of(k) == 0)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate the slot of `id` and describe its effect.
    ///
    /// Returns `None` when `id` has no slot of that kind.
    pub fn prepare(
        &self,
        kind: DialogKind,
        id: &DialogId,
        ctx: &FormContext,
    ) -> Option<DeskResult<Submission>> {
        with_form!(kind, F => {
            let slot = F::slots(self).get(id)?;
            Some(slot.validate(ctx).map(|()| slot.submission(ctx)))
        })
    }

    /// Serialize the mapping of `kind`, or `None` when it holds no slots.
    pub fn mapping_json(&self, kind: DialogKind) -> DeskResult<Option<String>> {
        with_form!(kind, F => {
            let map = F::slots(self);
            if map.is_empty() {
                Ok(None)
            } else {
                Ok(Some(serde_json::to_string(map)?))
            }
        })
    }

    /// Replace the mapping of `kind` wholesale with a serialized one.
    /// Fields missing from `json` take the form's default values; a slot
    /// that cannot be read is dropped on its own.
    pub fn replace_mapping(&mut self, kind: DialogKind, json: &str) -> DeskResult<usize> {
        let raw: BTreeMap<DialogId, Value> = serde_json::from_str(json)?;
        with_form!(kind, F => {
            let mut map = SlotMap::<F>::new();
            for (id, value) in raw {
                match serde_json::from_value::<F>(value) {
                    Ok(slot) => {
                        map.insert(id, slot);
                    }
                    Err(err) => {
                        tracing::warn!(dialog = %id, ?kind, "dropping unreadable draft slot: {err}");
                    }
                }
            }
            let len = map.len();
            *F::slots_mut(self) = map;
            Ok(len)
        })
    }
}

/// Returns `value` trimmed, or `fallback` when it is blank.
pub(crate) fn or_default(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_slot_equals_defaults() {
        let mut state = InputState::new();
        let id = DialogId::from("1");
        state.seed(DialogKind::Problem, id.clone(), None);
        assert_eq!(state.slot::<ProblemForm>(&id), Some(&ProblemForm::default()));
        assert_eq!(state.kind_of(&id), Some(DialogKind::Problem));
    }

    #[test]
    fn remove_clears_every_mapping() {
        let mut state = InputState::new();
        let id = DialogId::from("7");
        state.seed(DialogKind::Allergy, id.clone(), None);
        assert!(state.remove(&id));
        assert!(!state.remove(&id));
        assert!(state.is_empty());
    }

    #[test]
    fn empty_mapping_serializes_to_none() {
        let state = InputState::new();
        assert!(state.mapping_json(DialogKind::Report).unwrap().is_none());
    }

    #[test]
    fn prepare_unknown_id_is_none() {
        let state = InputState::new();
        assert!(state
            .prepare(DialogKind::Radiology, &DialogId::from("x"), &FormContext::default())
            .is_none());
    }
}
