pub mod drag;
pub mod id;
pub mod registry;

pub use drag::{key_action, DialogKey, DragController, KeyAction};
pub use id::{DialogId, IdGenerator};
pub use registry::DialogRegistry;

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Default number of dialogs that may be open at once.
pub const MAX_DIALOGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogKind {
    Problem,
    Medication,
    Allergy,
    Radiology,
    Report,
    InfoItem,
}

impl DialogKind {
    pub const ALL: [DialogKind; 6] = [
        DialogKind::Problem,
        DialogKind::Medication,
        DialogKind::Allergy,
        DialogKind::Radiology,
        DialogKind::Report,
        DialogKind::InfoItem,
    ];

    pub fn default_title(self) -> &'static str {
        match self {
            Self::Problem => "Add New Problem",
            Self::Medication => "Order Medications",
            Self::Allergy => "Add New Allergy",
            Self::Radiology => "Order Radiology",
            Self::Report => "Order Report",
            Self::InfoItem => "Add Item",
        }
    }

    /// Window title for a dialog opened with `data`. Info-item dialogs name
    /// the card they add to.
    pub fn title_for(self, data: Option<&DialogData>) -> String {
        match (self, data.and_then(|d| d.title.as_deref())) {
            (Self::InfoItem, Some(card)) => format!("Add {card} Item"),
            _ => self.default_title().to_string(),
        }
    }

    /// Stable name of the draft blob holding this kind's input mapping.
    pub fn draft_name(self) -> &'static str {
        match self {
            Self::Problem => "problem_inputs_draft",
            Self::Medication => "medication_inputs_draft",
            Self::Allergy => "allergy_inputs_draft",
            Self::Radiology => "radiology_inputs_draft",
            Self::Report => "report_inputs_draft",
            Self::InfoItem => "info_item_inputs_draft",
        }
    }
}

/// Pixel offset from the centered origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Opaque context handed to a dialog when it opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogData {
    /// Info card the new item belongs to.
    #[serde(default)]
    pub title: Option<String>,
}

impl DialogData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub id: DialogId,
    pub kind: DialogKind,
    pub title: String,
    pub position: Position,
    pub data: Option<DialogData>,
}
