mod forms;
mod toast_log_dialog;

pub use toast_log_dialog::ToastLogDialog;

use crate::desk::Desk;
use crate::dialog::{DialogData, DialogId, DialogKey, DialogKind, Position};
use crate::notice::{Notice, NoticeLevel};
use crate::settings::Settings;
use crate::toast_log::{append_toast_log, TOAST_LOG_FILE};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Interval used to poll background work while it is outstanding.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

fn push_toast(toasts: &mut Toasts, log: &std::path::Path, notice: &Notice, duration: f32) {
    append_toast_log(log, notice);
    let kind = match notice.level {
        NoticeLevel::Info => ToastKind::Info,
        NoticeLevel::Success => ToastKind::Success,
        NoticeLevel::Warning => ToastKind::Warning,
        NoticeLevel::Error => ToastKind::Error,
    };
    toasts.add(Toast {
        text: notice.text.clone().into(),
        kind,
        options: ToastOptions::default().duration_in_seconds(duration as f64),
    });
}

enum UiAction {
    Open(DialogKind, Option<DialogData>),
    Submit(DialogId),
    Reset(DialogId),
    Close(DialogId),
    DragStart(DialogId, egui::Pos2),
    Focus(DialogId),
}

pub struct DeskApp {
    desk: Desk,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
    toast_log_path: PathBuf,
    toast_log_dialog: ToastLogDialog,
    focused: Option<DialogId>,
    new_card_title: String,
}

impl DeskApp {
    pub fn new(desk: Desk, settings: &Settings) -> Self {
        Self {
            desk,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
            toast_log_path: PathBuf::from(TOAST_LOG_FILE),
            toast_log_dialog: ToastLogDialog::default(),
            focused: None,
            new_card_title: String::new(),
        }
    }

    fn show_notices(&mut self) {
        for notice in self.desk.take_notices() {
            if self.enable_toasts {
                push_toast(
                    &mut self.toasts,
                    &self.toast_log_path,
                    &notice,
                    self.toast_duration,
                );
            } else {
                append_toast_log(&self.toast_log_path, &notice);
            }
        }
    }

    fn dashboard(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let badges = self.desk.badges();
        let lists = self.desk.lists();
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.columns(2, |cols| {
                card(&mut cols[0], "Problems", badges.problems, |ui| {
                    if ui.button("Add").clicked() {
                        actions.push(UiAction::Open(DialogKind::Problem, None));
                    }
                    for p in &lists.problems {
                        ui.label(format!("{} ({}, {})", p.description, p.status, p.immediacy));
                    }
                });
                card(&mut cols[0], "Allergies", badges.allergies, |ui| {
                    if ui.button("Add").clicked() {
                        actions.push(UiAction::Open(DialogKind::Allergy, None));
                    }
                    for a in &lists.allergies {
                        ui.label(format!("{} ({}) {}", a.allergen, a.severity, a.reaction));
                    }
                });
                card(&mut cols[0], "Clinical Notes", badges.notes, |ui| {
                    for n in &lists.notes {
                        ui.label(format!("{} {} {}", n.date, n.title, n.author));
                    }
                });
                card(&mut cols[0], "Vitals", badges.vitals, |ui| {
                    for v in &lists.vitals {
                        ui.label(format!("{} {} {} {}", v.date, v.name, v.value, v.unit));
                    }
                });
                card(&mut cols[1], "Medications", badges.medications, |ui| {
                    if ui.button("Order").clicked() {
                        actions.push(UiAction::Open(DialogKind::Medication, None));
                    }
                    for m in &lists.medications {
                        ui.label(format!("{} {} {}", m.name, m.amount, m.timing));
                    }
                });
                card(&mut cols[1], "Orders", badges.orders, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Radiology").clicked() {
                            actions.push(UiAction::Open(DialogKind::Radiology, None));
                        }
                        if ui.button("Report").clicked() {
                            actions.push(UiAction::Open(DialogKind::Report, None));
                        }
                    });
                    for o in &lists.orders {
                        ui.label(format!(
                            "{} {}",
                            o.ordered_at.format("%Y-%m-%d %H:%M"),
                            o.description
                        ));
                    }
                    for (heading, records) in [
                        ("Radiology", &lists.radiology_orders),
                        ("Lab", &lists.lab_orders),
                    ] {
                        if records.is_empty() {
                            continue;
                        }
                        ui.separator();
                        ui.strong(heading);
                        for r in records {
                            ui.label(format!("{} {} ({})", r.date, r.name, r.status));
                        }
                    }
                });
                let cols_ui = &mut cols[1];
                cols_ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("Card");
                        ui.text_edit_singleline(&mut self.new_card_title);
                        let title = self.new_card_title.trim().to_string();
                        if ui
                            .add_enabled(!title.is_empty(), egui::Button::new("Add Item"))
                            .clicked()
                        {
                            actions.push(UiAction::Open(
                                DialogKind::InfoItem,
                                Some(DialogData::titled(title)),
                            ));
                        }
                    });
                    for (title, items) in &lists.info_cards {
                        ui.separator();
                        ui.horizontal(|ui| {
                            ui.strong(title);
                            ui.label(format!("({})", items.len()));
                            if ui.small_button("+").clicked() {
                                actions.push(UiAction::Open(
                                    DialogKind::InfoItem,
                                    Some(DialogData::titled(title.clone())),
                                ));
                            }
                        });
                        for item in items {
                            ui.label(format!("• {item}"));
                        }
                    }
                });
            });
        });
    }

    fn dialogs(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let center = ctx.screen_rect().center();
        let open: Vec<(DialogId, DialogKind, String, Position)> = self
            .desk
            .dialogs()
            .map(|d| (d.id.clone(), d.kind, d.title.clone(), d.position))
            .collect();
        for (id, kind, title, position) in open {
            let busy = self.desk.is_in_flight(&id);
            let mut keep_open = true;
            let response = egui::Window::new(title)
                .id(egui::Id::new(("desk_dialog", id.as_str().to_owned())))
                .pivot(egui::Align2::CENTER_CENTER)
                .fixed_pos(egui::pos2(center.x + position.x, center.y + position.y))
                .movable(false)
                .collapsible(false)
                .resizable(false)
                .open(&mut keep_open)
                .show(ctx, |ui| {
                    let handle = ui.add(
                        egui::Label::new(egui::RichText::new("⠿ drag to move").weak())
                            .sense(egui::Sense::drag()),
                    );
                    if handle.drag_started() {
                        if let Some(pos) = handle.interact_pointer_pos() {
                            actions.push(UiAction::DragStart(id.clone(), pos));
                        }
                    }
                    ui.separator();
                    ui.add_enabled_ui(!busy, |ui| forms::form_ui(ui, &mut self.desk, &id, kind));
                    ui.separator();
                    ui.horizontal(|ui| {
                        let label = if busy { "Submitting..." } else { "Submit" };
                        if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                            actions.push(UiAction::Submit(id.clone()));
                        }
                        if ui.add_enabled(!busy, egui::Button::new("Reset")).clicked() {
                            actions.push(UiAction::Reset(id.clone()));
                        }
                        if ui.button("Cancel").clicked() {
                            actions.push(UiAction::Close(id.clone()));
                        }
                    });
                });
            if !keep_open {
                actions.push(UiAction::Close(id.clone()));
            }
            if let Some(inner) = response {
                let pressed = ctx.input(|i| i.pointer.any_pressed());
                if pressed && inner.response.contains_pointer() {
                    actions.push(UiAction::Focus(id));
                }
            }
        }
    }

    fn apply(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            match action {
                UiAction::Open(kind, data) => {
                    let title = kind.title_for(data.as_ref());
                    if let Some(id) = self.desk.open(kind, title, data) {
                        self.focused = Some(id);
                    }
                }
                UiAction::Submit(id) => {
                    // Failures are reported through the notice queue.
                    let _ = self.desk.submit(&id);
                }
                UiAction::Reset(id) => self.desk.reset(&id),
                UiAction::Close(id) => {
                    self.desk.close(&id);
                }
                UiAction::DragStart(id, pos) => {
                    self.desk.pointer_down(&id, Position::new(pos.x, pos.y));
                    self.focused = Some(id);
                }
                UiAction::Focus(id) => self.focused = Some(id),
            }
        }
        if let Some(id) = &self.focused {
            if self.desk.dialog(id).is_none() {
                self.focused = None;
            }
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) {
        if !self.desk.any_dragging() {
            return;
        }
        if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
            self.desk.pointer_move(Position::new(pos.x, pos.y));
        }
        if ctx.input(|i| i.pointer.any_released()) {
            self.desk.pointer_up();
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let Some(id) = self.focused.clone() else {
            return;
        };
        let mut keys = Vec::new();
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                keys.push(DialogKey::Escape);
            }
        });
        if !ctx.wants_keyboard_input() {
            ctx.input(|i| {
                for (key, dialog_key) in [
                    (egui::Key::ArrowUp, DialogKey::ArrowUp),
                    (egui::Key::ArrowDown, DialogKey::ArrowDown),
                    (egui::Key::ArrowLeft, DialogKey::ArrowLeft),
                    (egui::Key::ArrowRight, DialogKey::ArrowRight),
                ] {
                    if i.key_pressed(key) {
                        keys.push(dialog_key);
                    }
                }
            });
        }
        for key in keys {
            self.desk.handle_key(&id, key);
        }
    }
}

fn card(ui: &mut egui::Ui, title: &str, count: usize, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.heading(title);
            ui.label(egui::RichText::new(count.to_string()).strong());
        });
        add_contents(ui);
    });
}

impl eframe::App for DeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.desk.poll_events();
        let now = Instant::now();
        self.desk.tick(now);

        let mut actions = Vec::new();
        egui::TopBottomPanel::top("desk_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chart Desk");
                ui.separator();
                let patient = self.desk.patient();
                if patient.is_empty() {
                    ui.label("No patient selected");
                } else {
                    ui.label(format!("Patient {patient}"));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Notifications").clicked() {
                        self.toast_log_dialog.open(&self.toast_log_path);
                    }
                    if ui.button("Refresh").clicked() {
                        self.desk.load_lists();
                    }
                    ui.label(format!(
                        "{} dialog(s) open",
                        self.desk.dialog_count()
                    ));
                });
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| self.dashboard(ui, &mut actions));
        self.dialogs(ctx, &mut actions);
        self.apply(actions);
        self.handle_pointer(ctx);
        self.handle_keys(ctx);

        self.toast_log_dialog.ui(ctx);
        self.show_notices();
        if self.enable_toasts {
            self.toasts.show(ctx);
        }

        if self.desk.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else {
            ctx.request_repaint_after(self.desk.until_next_flush(now));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.desk.flush_drafts();
    }
}
