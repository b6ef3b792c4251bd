use chrono::{Datelike, Duration, NaiveDate};
use egui::{Color32, Context, RichText, Window};

use crate::app::RoadmapApp;
use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Csv,
}

/// State of the export dialog. The custom date range, when enabled and
/// valid, overrides the computed timeline window for the capture.
pub struct ExportDialogState {
    pub format: ExportFormat,
    pub use_custom_range: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub in_progress: bool,
    pub error: Option<String>,
}

impl Default for ExportDialogState {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            format: ExportFormat::Png,
            use_custom_range: false,
            start: start_of_month(today),
            end: end_of_month(add_months(today, 2)),
            in_progress: false,
            error: None,
        }
    }
}

impl ExportDialogState {
    pub fn custom_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        (self.use_custom_range && self.start <= self.end).then_some((self.start, self.end))
    }
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    let next = add_months(start_of_month(date), 1);
    next - Duration::days(1)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months as i32;
    let (year, month) = (total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
    NaiveDate::from_ymd_opt(year, month, date.day().min(28)).unwrap_or(date)
}

/// Render the export dialog. Stays open after a failed export so the user
/// can retry.
pub fn show_export_dialog(app: &mut RoadmapApp, ctx: &Context) {
    let mut should_close = false;
    let task_count = app
        .filters
        .apply(&app.state.tasks)
        .iter()
        .filter(|t| t.parent_task_id.is_none())
        .count();

    Window::new(RichText::new("Exporter la vue actuelle").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([340.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(
                RichText::new(format!(
                    "{} tâches visibles · zoom {}",
                    task_count, app.timeline.zoom_level
                ))
                .size(11.0)
                .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(6.0);

            ui.label(RichText::new("Format").size(10.0).color(theme::TEXT_DIM).strong());
            ui.horizontal(|ui| {
                ui.radio_value(&mut app.export.format, ExportFormat::Png, "Image (PNG)");
                ui.radio_value(&mut app.export.format, ExportFormat::Csv, "Document (CSV)");
            });

            if app.export.format == ExportFormat::Png {
                ui.add_space(4.0);
                ui.checkbox(&mut app.export.use_custom_range, "Période personnalisée");
                if app.export.use_custom_range {
                    ui.horizontal(|ui| {
                        ui.add(
                            egui_extras::DatePickerButton::new(&mut app.export.start)
                                .id_salt("dp_export_start"),
                        );
                        ui.label(RichText::new("→").color(theme::TEXT_DIM));
                        ui.add(
                            egui_extras::DatePickerButton::new(&mut app.export.end)
                                .id_salt("dp_export_end"),
                        );
                    });
                    if app.export.start > app.export.end {
                        ui.label(
                            RichText::new("La période est invalide, elle sera ignorée.")
                                .size(10.0)
                                .color(theme::MILESTONE),
                        );
                    }
                }
            }

            if let Some(error) = &app.export.error {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!("Erreur export: {}", error))
                        .size(11.0)
                        .color(theme::MILESTONE),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let label = if app.export.in_progress {
                    "Export en cours…"
                } else {
                    "Exporter"
                };
                let export_btn = egui::Button::new(RichText::new(label).color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui
                    .add_enabled(!app.export.in_progress, |ui: &mut egui::Ui| {
                        ui.add_sized([120.0, 28.0], export_btn)
                    })
                    .clicked()
                {
                    app.start_export();
                }
                if ui
                    .add_enabled(!app.export.in_progress, |ui: &mut egui::Ui| {
                        ui.add_sized([80.0, 28.0], egui::Button::new("Fermer"))
                    })
                    .clicked()
                {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        if !app.export.in_progress {
            app.show_export = false;
            app.export.error = None;
        }
    }
}
