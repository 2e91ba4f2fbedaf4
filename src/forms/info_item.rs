use super::{DialogForm, FormContext, InputState, ListUpdate, SlotMap, Submission};
use crate::dialog::{DialogData, DialogKind};
use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};

/// New line for one of the dashboard info cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoItemForm {
    /// Card the item is added to.
    pub title: String,
    pub item: String,
}

impl DialogForm for InfoItemForm {
    const KIND: DialogKind = DialogKind::InfoItem;

    fn seed(data: Option<&DialogData>) -> Self {
        Self {
            title: data.and_then(|d| d.title.clone()).unwrap_or_default(),
            item: String::new(),
        }
    }

    fn validate(&self, _ctx: &FormContext) -> DeskResult<()> {
        if self.item.trim().is_empty() || self.title.trim().is_empty() {
            return Err(DeskError::validation(
                "item",
                "Item content and title are required.",
            ));
        }
        Ok(())
    }

    fn submission(&self, _ctx: &FormContext) -> Submission {
        Submission {
            remote: None,
            update: ListUpdate::InfoItem {
                title: self.title.clone(),
                item: self.item.trim().to_string(),
            },
            success: "Item added successfully!".into(),
        }
    }

    fn slots(state: &InputState) -> &SlotMap<Self> {
        &state.info_items
    }

    fn slots_mut(state: &mut InputState) -> &mut SlotMap<Self> {
        &mut state.info_items
    }
}
