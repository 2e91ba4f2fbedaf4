//! The dashboard desk: open dialogs, their form state, the lists they feed
//! and the background work that connects them to the EHR.
//!
//! Everything here runs on the UI thread. Remote calls are handed to worker
//! threads and their results come back through a channel that the UI drains
//! once per frame with [`Desk::poll_events`].

use crate::api::models::{
    parse_entries, AllergyEntry, ClinicalNote, ListKind, MedicationEntry, OrderEntry,
    OrderRecord, ProblemEntry, RemoteAck, VitalSign,
};
use crate::api::{EhrApi, OfflineApi};
use crate::dialog::{
    key_action, Dialog, DialogData, DialogId, DialogKey, DialogKind, DialogRegistry,
    DragController, KeyAction, Position,
};
use crate::drafts::{DraftSchedule, DraftStore, DRAFT_INTERVAL};
use crate::error::{DeskError, DeskResult};
use crate::forms::{DialogForm, FormContext, InfoItemForm, InputState, ListUpdate, Submission};
use crate::notice::Notice;
use crate::settings::Settings;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lists shown on the dashboard, newest entries first.
#[derive(Debug, Clone, Default)]
pub struct ClinicalLists {
    pub problems: Vec<ProblemEntry>,
    pub medications: Vec<MedicationEntry>,
    pub allergies: Vec<AllergyEntry>,
    pub notes: Vec<ClinicalNote>,
    pub vitals: Vec<VitalSign>,
    /// Orders placed from this desk.
    pub orders: Vec<OrderEntry>,
    pub radiology_orders: Vec<OrderRecord>,
    pub lab_orders: Vec<OrderRecord>,
    /// Free-text info cards keyed by card title.
    pub info_cards: BTreeMap<String, Vec<String>>,
    next_local: u64,
}

/// Entry counts shown next to each dashboard card title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Badges {
    pub problems: usize,
    pub medications: usize,
    pub allergies: usize,
    pub notes: usize,
    pub vitals: usize,
    pub orders: usize,
}

impl ClinicalLists {
    fn local_id(&mut self) -> String {
        self.next_local += 1;
        format!("local-{}", self.next_local)
    }

    fn apply(&mut self, update: ListUpdate) {
        match update {
            ListUpdate::Problems(entries) => {
                for mut entry in entries {
                    if entry.id.is_empty() {
                        entry.id = self.local_id();
                    }
                    self.problems.insert(0, entry);
                }
            }
            ListUpdate::Medications(entries) => {
                for mut entry in entries {
                    if entry.id.is_empty() {
                        entry.id = self.local_id();
                    }
                    self.medications.insert(0, entry);
                }
            }
            ListUpdate::Allergy(mut entry) => {
                if entry.id.is_empty() {
                    entry.id = self.local_id();
                }
                self.allergies.insert(0, entry);
            }
            ListUpdate::Order(order) => self.orders.insert(0, order),
            ListUpdate::InfoItem { title, item } => {
                self.info_cards.entry(title).or_default().insert(0, item);
            }
        }
    }

    fn replace(&mut self, list: ListKind, records: Vec<Value>) -> usize {
        match list {
            ListKind::Problems => {
                self.problems = parse_entries(records);
                self.problems.len()
            }
            ListKind::Allergies => {
                self.allergies = parse_entries(records);
                self.allergies.len()
            }
            ListKind::Notes => {
                self.notes = parse_entries(records);
                self.notes.len()
            }
            ListKind::Medications => {
                self.medications = parse_entries(records);
                self.medications.len()
            }
            ListKind::Vitals => {
                self.vitals = parse_entries(records);
                self.vitals.len()
            }
            ListKind::RadiologyOrders => {
                self.radiology_orders = parse_entries(records);
                self.radiology_orders.len()
            }
            ListKind::LabOrders => {
                self.lab_orders = parse_entries(records);
                self.lab_orders.len()
            }
        }
    }

    pub fn badges(&self) -> Badges {
        Badges {
            problems: self.problems.len(),
            medications: self.medications.len(),
            allergies: self.allergies.len(),
            notes: self.notes.len(),
            vitals: self.vitals.len(),
            orders: self.orders.len() + self.radiology_orders.len() + self.lab_orders.len(),
        }
    }
}

#[derive(Debug)]
enum DeskEvent {
    Submitted {
        id: DialogId,
        submission: Submission,
        result: Result<RemoteAck, DeskError>,
    },
    /// `records` is `None` when the read failed.
    ListLoaded {
        list: ListKind,
        records: Option<Vec<Value>>,
    },
}

/// Outcome of [`Desk::submit`] when validation passed or was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Applied locally; the dialog is closed.
    Completed,
    /// Remote call issued; see [`Desk::poll_events`].
    Pending,
    /// Unknown dialog or a submission already in flight.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct DeskOptions {
    pub max_dialogs: usize,
    pub keyboard_step: f32,
    pub draft_interval: Duration,
    pub form: FormContext,
    pub patient: String,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            max_dialogs: crate::dialog::MAX_DIALOGS,
            keyboard_step: crate::dialog::drag::KEY_STEP,
            draft_interval: DRAFT_INTERVAL,
            form: FormContext::default(),
            patient: String::new(),
        }
    }
}

impl From<&Settings> for DeskOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            max_dialogs: settings.max_dialogs,
            keyboard_step: settings.keyboard_step,
            draft_interval: settings.draft_interval(),
            form: settings.form_context(),
            patient: settings.patient_ssn.clone(),
        }
    }
}

pub struct Desk {
    registry: DialogRegistry,
    inputs: InputState,
    drag: DragController,
    lists: ClinicalLists,
    notices: Vec<Notice>,
    in_flight: HashSet<DialogId>,
    pending_loads: usize,
    api: Arc<dyn EhrApi>,
    drafts: Option<DraftStore>,
    schedule: DraftSchedule,
    options: DeskOptions,
    tx: Sender<DeskEvent>,
    rx: Receiver<DeskEvent>,
}

impl Default for Desk {
    fn default() -> Self {
        Self::new(DeskOptions::default(), Arc::new(OfflineApi), None)
    }
}

impl Desk {
    pub fn new(options: DeskOptions, api: Arc<dyn EhrApi>, drafts: Option<DraftStore>) -> Self {
        let (tx, rx) = channel();
        Self {
            registry: DialogRegistry::with_capacity(options.max_dialogs),
            inputs: InputState::new(),
            drag: DragController::new(),
            lists: ClinicalLists::default(),
            notices: Vec::new(),
            in_flight: HashSet::new(),
            pending_loads: 0,
            api,
            drafts,
            schedule: DraftSchedule::new(options.draft_interval, Instant::now()),
            options,
            tx,
            rx,
        }
    }

    pub fn patient(&self) -> &str {
        &self.options.patient
    }

    pub fn dialogs(&self) -> impl Iterator<Item = &Dialog> {
        self.registry.iter()
    }

    pub fn dialog(&self, id: &DialogId) -> Option<&Dialog> {
        self.registry.get(id)
    }

    pub fn dialog_count(&self) -> usize {
        self.registry.len()
    }

    pub fn inputs(&self) -> &InputState {
        &self.inputs
    }

    pub fn slot<F: DialogForm>(&self, id: &DialogId) -> Option<&F> {
        self.inputs.slot(id)
    }

    /// Mutable access for form controls.
    pub fn slot_mut<F: DialogForm>(&mut self, id: &DialogId) -> Option<&mut F> {
        self.inputs.slot_mut(id)
    }

    pub fn lists(&self) -> &ClinicalLists {
        &self.lists
    }

    pub fn badges(&self) -> Badges {
        self.lists.badges()
    }

    pub fn is_in_flight(&self, id: &DialogId) -> bool {
        self.in_flight.contains(id)
    }

    /// Whether background work is still outstanding.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty() || self.pending_loads > 0
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drain queued notifications.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Open a dialog and seed its form. A full desk rejects the request with
    /// one warning and no other change.
    pub fn open(
        &mut self,
        kind: DialogKind,
        title: impl Into<String>,
        data: Option<DialogData>,
    ) -> Option<DialogId> {
        match self.registry.open(kind, title, data.clone()) {
            Ok(id) => {
                self.inputs.seed(kind, id.clone(), data.as_ref());
                tracing::info!(dialog = %id, ?kind, "opened dialog");
                Some(id)
            }
            Err(err) => {
                tracing::debug!(?kind, "open rejected: {err}");
                self.notify(Notice::from(&err));
                None
            }
        }
    }

    /// Close a dialog and drop its form state. Unknown ids are ignored.
    ///
    /// The stored draft of the dialog's kind is brought up to date so a
    /// closed dialog does not come back on the next launch.
    pub fn close(&mut self, id: &DialogId) -> bool {
        let closed = self.registry.close(id);
        self.inputs.remove(id);
        self.drag.forget(id);
        self.in_flight.remove(id);
        let Some(dialog) = closed else {
            return false;
        };
        tracing::info!(dialog = %id, "closed dialog");
        self.sync_draft(dialog.kind);
        true
    }

    fn sync_draft(&self, kind: DialogKind) {
        if let Some(store) = &self.drafts {
            if let Err(err) = store.sync(&self.inputs, kind) {
                tracing::error!(?kind, "failed to update draft: {err:#}");
            }
        }
    }

    /// Put a dialog's form back to its seed values.
    pub fn reset(&mut self, id: &DialogId) {
        if let Some(dialog) = self.registry.get(id) {
            let (kind, data) = (dialog.kind, dialog.data.clone());
            self.inputs.reset(kind, id, data.as_ref());
        }
    }

    pub fn move_by(&mut self, id: &DialogId, dx: f32, dy: f32) -> bool {
        self.registry.update_position(id, dx, dy)
    }

    pub fn pointer_down(&mut self, id: &DialogId, pointer: Position) {
        if let Some(dialog) = self.registry.get(id) {
            let origin = dialog.position;
            self.drag.pointer_down(id.clone(), pointer, origin);
        }
    }

    pub fn pointer_move(&mut self, pointer: Position) {
        for (id, position) in self.drag.pointer_move(pointer) {
            self.registry.set_position(&id, position);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    pub fn is_dragging(&self, id: &DialogId) -> bool {
        self.drag.is_dragging(id)
    }

    pub fn any_dragging(&self) -> bool {
        self.drag.any_dragging()
    }

    /// Keyboard handling for a focused dialog. Arrow keys are ignored while
    /// the dialog is being dragged.
    pub fn handle_key(&mut self, id: &DialogId, key: DialogKey) -> bool {
        match key_action(key, self.options.keyboard_step) {
            KeyAction::Close => self.close(id),
            KeyAction::Move { dx, dy } => {
                if self.drag.is_dragging(id) {
                    return false;
                }
                self.move_by(id, dx, dy)
            }
        }
    }

    /// Validate a dialog's form and perform its effect.
    ///
    /// Validation failures are returned and also queued as a notice; the
    /// dialog and its form stay untouched.
    pub fn submit(&mut self, id: &DialogId) -> DeskResult<SubmitStatus> {
        let Some(kind) = self.registry.get(id).map(|d| d.kind) else {
            return Ok(SubmitStatus::Ignored);
        };
        if self.in_flight.contains(id) {
            tracing::debug!(dialog = %id, "submission already in flight");
            return Ok(SubmitStatus::Ignored);
        }
        let submission = match self.inputs.prepare(kind, id, &self.options.form) {
            None => return Ok(SubmitStatus::Ignored),
            Some(Err(err)) => {
                tracing::debug!(dialog = %id, "validation failed: {err}");
                self.notify(Notice::from(&err));
                return Err(err);
            }
            Some(Ok(submission)) => submission,
        };

        let Some(request) = submission.remote.clone() else {
            self.finish(id, submission, None);
            return Ok(SubmitStatus::Completed);
        };
        let request = request.field("PatientSSN", self.options.patient.clone());

        self.in_flight.insert(id.clone());
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let dialog = id.clone();
        tracing::info!(dialog = %id, "submitting {}", request.kind.label());
        std::thread::spawn(move || {
            let result = api.create(&request);
            let _ = tx.send(DeskEvent::Submitted {
                id: dialog,
                submission,
                result,
            });
        });
        Ok(SubmitStatus::Pending)
    }

    fn finish(&mut self, id: &DialogId, submission: Submission, server_message: Option<String>) {
        self.lists.apply(submission.update);
        let text = match server_message {
            Some(msg) if !msg.trim().is_empty() => format!("{} {}", submission.success, msg),
            _ => submission.success,
        };
        self.notify(Notice::success(text));
        self.close(id);
    }

    /// Fetch the dashboard lists for the current patient in the background.
    /// A failed read keeps whatever the list already holds. Without a
    /// remote backend nothing is fetched.
    pub fn load_lists(&mut self) {
        let patient = self.options.patient.clone();
        if patient.trim().is_empty() {
            tracing::warn!("no patient selected; skipping list load");
            return;
        }
        if !self.api.is_remote() {
            tracing::info!("offline; keeping local lists");
            return;
        }
        self.pending_loads += ListKind::ALL.len();
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            for list in ListKind::ALL {
                let records = match api.fetch(list, &patient) {
                    Ok(records) => Some(records),
                    Err(err) => {
                        tracing::warn!("failed to load {}: {err:#}", list.label());
                        None
                    }
                };
                if tx.send(DeskEvent::ListLoaded { list, records }).is_err() {
                    break;
                }
            }
        });
    }

    fn handle_event(&mut self, event: DeskEvent) {
        match event {
            DeskEvent::Submitted {
                id,
                submission,
                result,
            } => {
                if !self.in_flight.remove(&id) || !self.registry.contains(&id) {
                    tracing::debug!(dialog = %id, "discarding result for closed dialog");
                    return;
                }
                match result {
                    Ok(ack) => self.finish(&id, submission, ack.message),
                    Err(err) => {
                        tracing::warn!(dialog = %id, "submission failed: {err}");
                        self.notify(Notice::from(&err));
                    }
                }
            }
            DeskEvent::ListLoaded { list, records } => {
                self.pending_loads = self.pending_loads.saturating_sub(1);
                match records {
                    Some(records) => {
                        let count = self.lists.replace(list, records);
                        tracing::debug!(count, "loaded {}", list.label());
                    }
                    None => tracing::debug!("kept current {}", list.label()),
                }
            }
        }
    }

    /// Apply finished background work. Returns the number of events handled.
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Block until all background work has reported back or `timeout`
    /// passes. Returns the number of events handled.
    pub fn wait_for_events(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut handled = self.poll_events();
        while self.is_busy() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        handled
    }

    /// Persist the non-empty input mappings.
    pub fn flush_drafts(&mut self) -> bool {
        let Some(store) = &self.drafts else {
            return false;
        };
        match store.flush(&self.inputs) {
            Ok(_) => true,
            Err(err) => {
                tracing::error!("failed to save drafts: {err:#}");
                false
            }
        }
    }

    /// Flush drafts when the timer is due. Returns whether it flushed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.schedule.due(now) {
            self.flush_drafts()
        } else {
            false
        }
    }

    pub fn until_next_flush(&self, now: Instant) -> Duration {
        self.schedule.remaining(now)
    }

    /// Load stored drafts, replacing each stored mapping wholesale.
    ///
    /// Restored slots whose dialog is not open get their dialog back while
    /// there is room; the rest, and info items without a card title, are
    /// dropped from the store as well. Open dialogs whose slot was
    /// replaced are seeded again. Returns the number of mappings restored.
    pub fn restore_drafts(&mut self) -> usize {
        let Some(store) = &self.drafts else {
            return 0;
        };
        let restored = store.restore(&mut self.inputs);
        if restored == 0 {
            return 0;
        }

        let open: Vec<(DialogId, DialogKind, Option<DialogData>)> = self
            .registry
            .iter()
            .map(|d| (d.id.clone(), d.kind, d.data.clone()))
            .collect();
        for (id, kind, data) in open {
            if self.inputs.kind_of(&id) != Some(kind) {
                self.inputs.seed(kind, id, data.as_ref());
            }
        }

        for kind in DialogKind::ALL {
            let mut dropped = false;
            for id in self.inputs.ids_of(kind) {
                if self.registry.contains(&id) {
                    continue;
                }
                let data = match kind {
                    DialogKind::InfoItem => {
                        let title = self
                            .inputs
                            .slot::<InfoItemForm>(&id)
                            .map(|f| f.title.clone())
                            .unwrap_or_default();
                        if title.trim().is_empty() {
                            tracing::info!(dialog = %id, "dropping info item draft without a card");
                            self.inputs.remove(&id);
                            dropped = true;
                            continue;
                        }
                        Some(DialogData::titled(title))
                    }
                    _ => None,
                };
                let dialog = Dialog {
                    id: id.clone(),
                    kind,
                    title: kind.title_for(data.as_ref()),
                    position: Position::ORIGIN,
                    data,
                };
                if let Err(err) = self.registry.adopt(dialog) {
                    tracing::info!(dialog = %id, "dropping restored draft: {err}");
                    self.inputs.remove(&id);
                    dropped = true;
                }
            }
            if dropped {
                self.sync_draft(kind);
            }
        }
        if !self.registry.is_empty() {
            self.notify(Notice::info("Restored unsaved drafts."));
        }
        restored
    }
}
