use super::{Dialog, DialogData, DialogId, DialogKind, IdGenerator, Position, MAX_DIALOGS};
use crate::error::{DeskError, DeskResult};

/// Ordered set of open floating dialogs, oldest first.
#[derive(Debug)]
pub struct DialogRegistry {
    dialogs: Vec<Dialog>,
    capacity: usize,
    ids: IdGenerator,
}

impl Default for DialogRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_DIALOGS)
    }
}

impl DialogRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dialogs: Vec::new(),
            capacity: capacity.max(1),
            ids: IdGenerator::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.dialogs.len() >= self.capacity
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.dialogs.iter().any(|d| &d.id == id)
    }

    pub fn get(&self, id: &DialogId) -> Option<&Dialog> {
        self.dialogs.iter().find(|d| &d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dialog> {
        self.dialogs.iter()
    }

    /// Append a new dialog at the origin. Fails without touching the
    /// registry when it is already full.
    pub fn open(
        &mut self,
        kind: DialogKind,
        title: impl Into<String>,
        data: Option<DialogData>,
    ) -> DeskResult<DialogId> {
        if self.is_full() {
            return Err(DeskError::Capacity { max: self.capacity });
        }
        let id = self.ids.next();
        self.dialogs.push(Dialog {
            id: id.clone(),
            kind,
            title: title.into(),
            position: Position::ORIGIN,
            data,
        });
        Ok(id)
    }

    /// Re-register a dialog whose id was created in an earlier session.
    pub fn adopt(&mut self, dialog: Dialog) -> DeskResult<()> {
        if self.is_full() {
            return Err(DeskError::Capacity { max: self.capacity });
        }
        if self.contains(&dialog.id) {
            return Ok(());
        }
        self.ids.observe(&dialog.id);
        self.dialogs.push(dialog);
        Ok(())
    }

    /// Remove a dialog. Closing an unknown id is a no-op.
    pub fn close(&mut self, id: &DialogId) -> Option<Dialog> {
        let idx = self.dialogs.iter().position(|d| &d.id == id)?;
        Some(self.dialogs.remove(idx))
    }

    /// Shift a dialog by a pixel delta.
    pub fn update_position(&mut self, id: &DialogId, dx: f32, dy: f32) -> bool {
        match self.dialogs.iter_mut().find(|d| &d.id == id) {
            Some(dialog) => {
                dialog.position = dialog.position + Position::new(dx, dy);
                true
            }
            None => false,
        }
    }

    pub fn set_position(&mut self, id: &DialogId, position: Position) -> bool {
        match self.dialogs.iter_mut().find(|d| &d.id == id) {
            Some(dialog) => {
                dialog.position = position;
                true
            }
            None => false,
        }
    }
}
