use egui::{RichText, Rounding, Stroke, Ui};
use uuid::Uuid;

use crate::model::{org::parse_hex_color, AppState, Filters, Task, TaskStatus};
use crate::timeline::derived_progress;
use crate::ui::theme;

/// What the board asks the application to do after this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KanbanAction {
    OpenTask(Uuid),
    MoveTask { task_id: Uuid, status: TaskStatus },
}

/// Render the Kanban board: one column per status, cards draggable between
/// columns through egui's built-in drag-and-drop.
pub fn show_kanban(state: &AppState, filters: &Filters, ui: &mut Ui) -> Vec<KanbanAction> {
    let mut actions = Vec::new();
    let today = chrono::Local::now().date_naive();
    let filtered = filters.apply(&state.tasks);

    egui::ScrollArea::horizontal()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_top(|ui| {
                for status in TaskStatus::ALL {
                    let column_tasks: Vec<&Task> = filtered
                        .iter()
                        .filter(|t| t.status == status)
                        .copied()
                        .collect();

                    ui.allocate_ui(egui::vec2(230.0, ui.available_height()), |ui| {
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(status.label())
                                        .strong()
                                        .size(12.0)
                                        .color(theme::TEXT_PRIMARY),
                                );
                                ui.label(
                                    RichText::new(format!("({})", column_tasks.len()))
                                        .size(11.0)
                                        .color(theme::TEXT_DIM),
                                );
                            });
                            ui.add_space(2.0);

                            let frame = egui::Frame::default()
                                .fill(theme::BG_PANEL)
                                .rounding(Rounding::same(6.0))
                                .stroke(Stroke::new(1.0, theme::BORDER))
                                .inner_margin(egui::Margin::same(6.0));

                            let (_, dropped) =
                                ui.dnd_drop_zone::<Uuid, ()>(frame, |ui| {
                                    ui.set_min_size(egui::vec2(
                                        210.0,
                                        (ui.available_height() - 8.0).max(120.0),
                                    ));
                                    for task in &column_tasks {
                                        draw_card(ui, state, task, today, &mut actions);
                                        ui.add_space(4.0);
                                    }
                                });

                            if let Some(task_id) = dropped {
                                actions.push(KanbanAction::MoveTask {
                                    task_id: *task_id,
                                    status,
                                });
                            }
                        });
                    });
                }
            });
        });

    actions
}

fn draw_card(
    ui: &mut Ui,
    state: &AppState,
    task: &Task,
    today: chrono::NaiveDate,
    actions: &mut Vec<KanbanAction>,
) {
    let id = egui::Id::new(("kanban-card", task.id));
    let team_color = state
        .team(task.team_id)
        .map(|t| parse_hex_color(&t.color))
        .unwrap_or(theme::BAR_FALLBACK);
    let progress = derived_progress(task.start_date, task.end_date, today);

    let response = ui
        .dnd_drag_source(id, task.id, |ui| {
            egui::Frame::default()
                .fill(theme::BG_APP)
                .rounding(Rounding::same(6.0))
                .stroke(Stroke::new(1.0, theme::BORDER))
                .inner_margin(egui::Margin::same(8.0))
                .show(ui, |ui| {
                    ui.set_width(190.0);
                    ui.horizontal(|ui| {
                        let (dot, _) =
                            ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot.center(), 4.0, team_color);
                        ui.add(
                            egui::Label::new(
                                RichText::new(&task.title)
                                    .size(12.0)
                                    .color(theme::TEXT_PRIMARY),
                            )
                            .truncate(),
                        );
                    });
                    ui.label(
                        RichText::new(format!(
                            "{} → {}",
                            task.start_date.format("%d/%m"),
                            task.end_date.format("%d/%m"),
                        ))
                        .size(10.0)
                        .color(theme::TEXT_SECONDARY),
                    );
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::ProgressBar::new(progress as f32 / 100.0)
                                .desired_width(120.0)
                                .fill(team_color)
                                .rounding(Rounding::same(3.0)),
                        );
                        if !task.steps.is_empty() {
                            ui.label(
                                RichText::new(format!(
                                    "{} {}",
                                    egui_phosphor::regular::LIST_BULLETS,
                                    task.steps.len()
                                ))
                                .size(10.0)
                                .color(theme::TEXT_DIM),
                            );
                        }
                    });
                })
                .response
        })
        .response;

    if response.clicked() {
        actions.push(KanbanAction::OpenTask(task.id));
    }
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }
}
