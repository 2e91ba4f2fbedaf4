use crate::desk::Desk;
use crate::dialog::{DialogId, DialogKind};
use crate::forms::medication::{DURATION_UNITS, PRIORITIES, ROUTES, SCHEDULES};
use crate::forms::{
    allergy, problem, radiology, AllergyForm, InfoItemForm, MedicationForm, ProblemForm,
    RadiologyForm, ReportForm,
};
use eframe::egui;
use egui_extras::{Column, TableBuilder};

/// Draw the form controls of one dialog.
pub fn form_ui(ui: &mut egui::Ui, desk: &mut Desk, id: &DialogId, kind: DialogKind) {
    let key = id.as_str().to_owned();
    match kind {
        DialogKind::Problem => {
            if let Some(form) = desk.slot_mut::<ProblemForm>(id) {
                problem_ui(ui, &key, form);
            }
        }
        DialogKind::Medication => {
            if let Some(form) = desk.slot_mut::<MedicationForm>(id) {
                medication_ui(ui, &key, form);
            }
        }
        DialogKind::Allergy => {
            if let Some(form) = desk.slot_mut::<AllergyForm>(id) {
                allergy_ui(ui, &key, form);
            }
        }
        DialogKind::Radiology => {
            if let Some(form) = desk.slot_mut::<RadiologyForm>(id) {
                radiology_ui(ui, &key, form);
            }
        }
        DialogKind::Report => {
            if let Some(form) = desk.slot_mut::<ReportForm>(id) {
                report_ui(ui, form);
            }
        }
        DialogKind::InfoItem => {
            if let Some(form) = desk.slot_mut::<InfoItemForm>(id) {
                ui.label(format!("Card: {}", form.title));
                ui.horizontal(|ui| {
                    ui.label("Item");
                    ui.text_edit_singleline(&mut form.item);
                });
            }
        }
    }
}

fn combo(ui: &mut egui::Ui, key: &str, label: &str, value: &mut String, options: &[&str]) {
    ui.label(label);
    let shown = if value.is_empty() { "Select..." } else { value.as_str() }.to_owned();
    egui::ComboBox::from_id_source((key, label))
        .selected_text(shown)
        .show_ui(ui, |ui| {
            for opt in options {
                ui.selectable_value(value, (*opt).to_string(), *opt);
            }
        });
    ui.end_row();
}

fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).desired_width(220.0));
    ui.end_row();
}

fn problem_ui(ui: &mut egui::Ui, key: &str, form: &mut ProblemForm) {
    ui.label("Preferred problems");
    egui::ScrollArea::vertical()
        .id_source((key, "preferred"))
        .max_height(140.0)
        .show(ui, |ui| {
            for p in problem::PREFERRED_PROBLEMS {
                let mut checked = form.preferred.iter().any(|s| s == p);
                if ui.checkbox(&mut checked, *p).changed() {
                    form.toggle_preferred(p, checked);
                }
            }
        });
    ui.checkbox(&mut form.other, "Other problem");
    egui::Grid::new((key, "problem_grid"))
        .num_columns(2)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            if form.other {
                text_row(ui, "Problem", &mut form.input);
            }
            combo(ui, key, "Category", &mut form.category, problem::CATEGORIES);
            combo(ui, key, "Status", &mut form.status, problem::STATUSES);
            combo(ui, key, "Immediacy", &mut form.immediacy, problem::IMMEDIACIES);
            text_row(ui, "Date of onset", &mut form.date_onset);
            combo(ui, key, "Service", &mut form.service, problem::SERVICES);
            text_row(ui, "Comment", &mut form.comment);
        });
}

fn medication_ui(ui: &mut egui::Ui, key: &str, form: &mut MedicationForm) {
    egui::Grid::new((key, "medication_grid"))
        .num_columns(2)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            text_row(ui, "Medication", &mut form.name);
            text_row(ui, "Reason", &mut form.reason);
            text_row(ui, "Amount", &mut form.amount);
            text_row(ui, "Timing", &mut form.timing);
        });
    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Order list");
        ui.text_edit_singleline(&mut form.search);
    });
    let mut picked = None;
    ui.horizontal_wrapped(|ui| {
        for name in form.matches() {
            if ui.small_button(name).clicked() {
                picked = Some(name);
            }
        }
    });
    if let Some(name) = picked {
        form.stage(name);
    }
    if form.rows.is_empty() {
        return;
    }

    let mut remove = None;
    ui.push_id((key, "staged_rows"), |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::initial(70.0))
            .columns(Column::auto(), 5)
            .column(Column::auto())
            .header(18.0, |mut header| {
                for title in ["Medication", "Dosage", "Route", "Schedule", "PRN", "Duration", "Priority", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for (idx, row) in form.rows.iter_mut().enumerate() {
                    body.row(22.0, |mut r| {
                        r.col(|ui| {
                            ui.label(&row.medication_name);
                        });
                        r.col(|ui| {
                            ui.text_edit_singleline(&mut row.dosage);
                        });
                        r.col(|ui| {
                            small_combo(ui, (key, idx, "route"), &mut row.route, ROUTES);
                        });
                        r.col(|ui| {
                            small_combo(ui, (key, idx, "schedule"), &mut row.schedule, SCHEDULES);
                        });
                        r.col(|ui| {
                            ui.checkbox(&mut row.prn, "");
                        });
                        r.col(|ui| {
                            ui.add(egui::TextEdit::singleline(&mut row.duration).desired_width(28.0));
                            small_combo(ui, (key, idx, "unit"), &mut row.duration_unit, DURATION_UNITS);
                        });
                        r.col(|ui| {
                            small_combo(ui, (key, idx, "priority"), &mut row.priority, PRIORITIES);
                        });
                        r.col(|ui| {
                            if ui.small_button("x").clicked() {
                                remove = Some(idx);
                            }
                        });
                    });
                }
            });
    });
    if let Some(idx) = remove {
        form.remove_row(idx);
    }
    if ui.button("Clear staged").clicked() {
        form.clear_staged();
    }
}

fn small_combo(
    ui: &mut egui::Ui,
    id: impl std::hash::Hash,
    value: &mut String,
    options: &[&str],
) {
    egui::ComboBox::from_id_source(id)
        .width(80.0)
        .selected_text(value.clone())
        .show_ui(ui, |ui| {
            for opt in options {
                ui.selectable_value(value, (*opt).to_string(), *opt);
            }
        });
}

fn allergy_ui(ui: &mut egui::Ui, key: &str, form: &mut AllergyForm) {
    egui::Grid::new((key, "allergy_grid"))
        .num_columns(2)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            text_row(ui, "Allergen", &mut form.allergen);
            text_row(ui, "Reaction", &mut form.reaction);
            combo(ui, key, "Severity", &mut form.severity, allergy::SEVERITIES);
            text_row(ui, "Date of onset", &mut form.date_onset);
            text_row(ui, "Treatment", &mut form.treatment);
            combo(ui, key, "Status", &mut form.status, allergy::STATUSES);
            text_row(ui, "Notes", &mut form.notes);
        });
}

fn radiology_ui(ui: &mut egui::Ui, key: &str, form: &mut RadiologyForm) {
    egui::Grid::new((key, "radiology_grid"))
        .num_columns(2)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            combo(ui, key, "Imaging type", &mut form.imaging_type, radiology::IMAGING_TYPES);
            text_row(ui, "Body part", &mut form.body_part);
            text_row(ui, "Notes", &mut form.notes);
        });
}

fn report_ui(ui: &mut egui::Ui, form: &mut ReportForm) {
    ui.horizontal(|ui| {
        ui.label("Search tests");
        ui.text_edit_singleline(&mut form.search);
    });
    for test in form.report_matches() {
        let mut checked = form.selected.iter().any(|s| s == test);
        if ui.checkbox(&mut checked, test).changed() {
            form.toggle(test, checked);
        }
    }
    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Quick orders");
        ui.text_edit_singleline(&mut form.quick_search);
    });
    for test in form.quick_matches() {
        let mut checked = form.selected.iter().any(|s| s == test);
        if ui.checkbox(&mut checked, test).changed() {
            form.toggle(test, checked);
        }
    }
}
