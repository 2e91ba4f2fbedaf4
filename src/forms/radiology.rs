use super::{DialogForm, FormContext, InputState, ListUpdate, SlotMap, Submission};
use crate::api::models::{CreateKind, CreateRequest, OrderCategory, OrderEntry};
use crate::dialog::DialogKind;
use crate::error::{DeskError, DeskResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const IMAGING_TYPES: &[&str] = &["X-Ray", "MRI", "CT Scan", "Ultrasound"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadiologyForm {
    #[serde(rename = "type")]
    pub imaging_type: String,
    pub body_part: String,
    pub notes: String,
}

impl DialogForm for RadiologyForm {
    const KIND: DialogKind = DialogKind::Radiology;

    fn validate(&self, _ctx: &FormContext) -> DeskResult<()> {
        if self.imaging_type.trim().is_empty() {
            return Err(DeskError::validation("type", "Imaging type is required."));
        }
        Ok(())
    }

    fn submission(&self, _ctx: &FormContext) -> Submission {
        let body_part = self.body_part.trim();
        let description = if body_part.is_empty() {
            self.imaging_type.clone()
        } else {
            format!("{} - {}", self.imaging_type, body_part)
        };
        let request = CreateRequest::new(CreateKind::RadiologyOrder)
            .field("ImagingType", self.imaging_type.clone())
            .field("BodyPart", body_part)
            .field("Notes", self.notes.clone());
        Submission {
            remote: Some(request),
            update: ListUpdate::Order(OrderEntry {
                category: OrderCategory::Radiology,
                description,
                notes: self.notes.clone(),
                ordered_at: Utc::now(),
            }),
            success: "Radiology order placed!".into(),
        }
    }

    fn slots(state: &InputState) -> &SlotMap<Self> {
        &state.radiology
    }

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self> {
        &mut state.radiology
    }
}
