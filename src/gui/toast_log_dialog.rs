use crate::toast_log::read_last_lines;
use eframe::egui;
use std::path::{Path, PathBuf};

const SHOWN_LINES: usize = 20;

/// Window listing the most recent notifications.
#[derive(Default)]
pub struct ToastLogDialog {
    pub open: bool,
    path: PathBuf,
    lines: Vec<String>,
}

impl ToastLogDialog {
    pub fn open(&mut self, path: &Path) {
        self.path = path.to_path_buf();
        self.lines = read_last_lines(&self.path, SHOWN_LINES);
        self.open = true;
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }
        let mut close = false;
        egui::Window::new("Notifications")
            .resizable(true)
            .default_size((360.0, 200.0))
            .open(&mut self.open)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for line in &self.lines {
                        ui.label(line);
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Refresh").clicked() {
                        self.lines = read_last_lines(&self.path, SHOWN_LINES);
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            self.open = false;
        }
    }
}
