use super::{DialogId, Position};
use std::collections::HashMap;

/// Pixels moved per arrow key press.
pub const KEY_STEP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    start_pointer: Position,
    origin: Position,
}

/// Tracks header drags. Every dialog id is either idle (absent) or
/// dragging (present); several ids may drag at once.
#[derive(Debug, Default)]
pub struct DragController {
    dragging: HashMap<DialogId, DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer pressed on a dialog header: idle -> dragging.
    pub fn pointer_down(&mut self, id: DialogId, pointer: Position, current_offset: Position) {
        tracing::trace!(dialog = %id, "drag start");
        self.dragging.insert(
            id,
            DragState {
                start_pointer: pointer,
                origin: current_offset,
            },
        );
    }

    /// Offsets for every dragging dialog. Each is the drag origin plus the
    /// total pointer delta, so intermediate moves never accumulate.
    pub fn pointer_move(&self, pointer: Position) -> Vec<(DialogId, Position)> {
        self.dragging
            .iter()
            .map(|(id, state)| (id.clone(), state.origin + (pointer - state.start_pointer)))
            .collect()
    }

    /// Pointer released anywhere: every dragging dialog goes idle.
    pub fn pointer_up(&mut self) {
        self.dragging.clear();
    }

    pub fn is_dragging(&self, id: &DialogId) -> bool {
        self.dragging.contains_key(id)
    }

    pub fn any_dragging(&self) -> bool {
        !self.dragging.is_empty()
    }

    pub fn forget(&mut self, id: &DialogId) {
        self.dragging.remove(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Move { dx: f32, dy: f32 },
    Close,
}

pub fn key_action(key: DialogKey, step: f32) -> KeyAction {
    match key {
        DialogKey::ArrowUp => KeyAction::Move { dx: 0.0, dy: -step },
        DialogKey::ArrowDown => KeyAction::Move { dx: 0.0, dy: step },
        DialogKey::ArrowLeft => KeyAction::Move { dx: -step, dy: 0.0 },
        DialogKey::ArrowRight => KeyAction::Move { dx: step, dy: 0.0 },
        DialogKey::Escape => KeyAction::Close,
    }
}
