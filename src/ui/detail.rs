use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::model::task::{step_icon_glyph, STEP_ICONS};
use crate::model::{Milestone, Role, Sprint, Task, TaskStatus, TaskStep, Team, Topic};
use crate::ui::theme;

/// Actions the detail panel can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    None,
    Changed,
    DeleteTask(Uuid),
    DeleteMilestone(Uuid),
    Close,
}

fn section_label(ui: &mut Ui, text: &str) {
    ui.label(
        RichText::new(text)
            .size(10.0)
            .color(theme::TEXT_DIM)
            .strong(),
    );
}

/// Render the inline editor for the selected task.
pub fn show_task_detail(
    task: &mut Task,
    teams: &[Team],
    sprints: &[Sprint],
    topics: &[Topic],
    ui: &mut Ui,
) -> DetailAction {
    let mut action = DetailAction::None;
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Détail de la tâche")
                .strong()
                .size(13.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(RichText::new(egui_phosphor::regular::X).size(12.0))
                .clicked()
            {
                action = DetailAction::Close;
            }
        });
    });
    ui.add_space(4.0);

    section_label(ui, "Titre");
    if ui
        .add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut task.title).font(egui::FontId::proportional(12.0)),
        )
        .changed()
    {
        changed = true;
    }

    section_label(ui, "Description");
    if ui
        .add_sized(
            [ui.available_width(), 52.0],
            egui::TextEdit::multiline(&mut task.description)
                .font(egui::FontId::proportional(11.0)),
        )
        .changed()
    {
        changed = true;
    }

    ui.add_space(2.0);

    section_label(ui, "Statut");
    egui::ComboBox::from_id_salt("status_combo")
        .selected_text(RichText::new(task.status.label()).size(11.0))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for status in TaskStatus::ALL {
                if ui
                    .selectable_value(&mut task.status, status, status.label())
                    .changed()
                {
                    changed = true;
                }
            }
        });

    section_label(ui, "Équipe");
    let team_label = teams
        .iter()
        .find(|t| t.id == task.team_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "—".to_string());
    egui::ComboBox::from_id_salt("team_combo")
        .selected_text(RichText::new(team_label).size(11.0))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for team in teams {
                if ui
                    .selectable_value(&mut task.team_id, team.id, &team.name)
                    .changed()
                {
                    changed = true;
                }
            }
        });

    section_label(ui, "Sprint");
    let sprint_label = task
        .sprint_id
        .and_then(|id| sprints.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "— Aucun —".to_string());
    egui::ComboBox::from_id_salt("sprint_combo")
        .selected_text(RichText::new(sprint_label).size(11.0))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            if ui
                .selectable_label(task.sprint_id.is_none(), "— Aucun —")
                .clicked()
            {
                task.sprint_id = None;
                changed = true;
            }
            for sprint in sprints {
                if ui
                    .selectable_label(task.sprint_id == Some(sprint.id), &sprint.name)
                    .clicked()
                {
                    task.sprint_id = Some(sprint.id);
                    changed = true;
                }
            }
        });

    ui.add_space(2.0);

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            section_label(ui, "Début");
            if ui
                .add(egui_extras::DatePickerButton::new(&mut task.start_date).id_salt("dp_start"))
                .changed()
            {
                if task.start_date > task.end_date {
                    task.end_date = task.start_date;
                }
                changed = true;
            }
        });
        ui.vertical(|ui| {
            section_label(ui, "Fin");
            if ui
                .add(egui_extras::DatePickerButton::new(&mut task.end_date).id_salt("dp_end"))
                .changed()
            {
                if task.end_date < task.start_date {
                    task.start_date = task.end_date;
                }
                changed = true;
            }
        });
    });

    ui.add_space(2.0);

    section_label(ui, "Métiers");
    ui.horizontal_wrapped(|ui| {
        for role in Role::ORDER {
            let mut active = task.roles.contains(&role);
            if ui.checkbox(&mut active, role.label()).changed() {
                if active {
                    task.roles.push(role);
                } else {
                    task.roles.retain(|r| *r != role);
                }
                changed = true;
            }
        }
    });

    section_label(ui, "Thèmes");
    ui.horizontal_wrapped(|ui| {
        for topic in topics {
            let mut active = task.topic_ids.contains(&topic.id);
            if ui.checkbox(&mut active, &topic.name).changed() {
                if active {
                    task.topic_ids.push(topic.id);
                } else {
                    task.topic_ids.retain(|id| *id != topic.id);
                }
                changed = true;
            }
        }
    });

    ui.add_space(4.0);
    ui.separator();

    // ── Steps ──────────────────────────────────────────────────────────────
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Étapes de planning")
                .strong()
                .size(12.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.label(
            RichText::new(format!("({})", task.steps.len()))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(2.0);

    let mut remove_step: Option<usize> = None;
    for (idx, step) in task.steps.iter_mut().enumerate() {
        let dp_salt = format!("dp_step{}", step.id);
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt(("step_icon", step.id))
                .selected_text(step_icon_glyph(&step.icon))
                .width(44.0)
                .show_ui(ui, |ui| {
                    for icon in STEP_ICONS {
                        let label = format!("{} {}", step_icon_glyph(icon), icon);
                        if ui.selectable_label(step.icon == *icon, label).clicked() {
                            step.icon = icon.to_string();
                            changed = true;
                        }
                    }
                });
            if ui
                .add_sized(
                    [(ui.available_width() - 120.0).max(60.0), 22.0],
                    egui::TextEdit::singleline(&mut step.text)
                        .font(egui::FontId::proportional(11.0)),
                )
                .changed()
            {
                changed = true;
            }
            if ui
                .add(
                    egui_extras::DatePickerButton::new(&mut step.date)
                        .id_salt(&dp_salt),
                )
                .changed()
            {
                changed = true;
            }
            if ui
                .button(RichText::new(egui_phosphor::regular::TRASH).size(11.0))
                .on_hover_text("Supprimer l'étape")
                .clicked()
            {
                remove_step = Some(idx);
            }
        });
    }
    if let Some(idx) = remove_step {
        task.steps.remove(idx);
        changed = true;
    }

    if ui
        .button(format!(
            "{}  Ajouter une étape",
            egui_phosphor::regular::PLUS
        ))
        .clicked()
    {
        task.steps.push(TaskStep::new(
            "Flag",
            "Nouvelle étape",
            chrono::Local::now().date_naive(),
        ));
        changed = true;
    }

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(2.0);

    let delete_btn = egui::Button::new(
        RichText::new(format!(
            "{}  Supprimer la tâche",
            egui_phosphor::regular::TRASH
        ))
        .color(Color32::WHITE)
        .size(11.0),
    )
    .fill(theme::MILESTONE)
    .rounding(egui::Rounding::same(4.0));
    if ui.add_sized([ui.available_width(), 26.0], delete_btn).clicked() {
        action = DetailAction::DeleteTask(task.id);
    }

    if changed && action == DetailAction::None {
        task.touch();
        action = DetailAction::Changed;
    }
    action
}

/// Render the inline editor for the selected milestone.
pub fn show_milestone_detail(
    milestone: &mut Milestone,
    sprints: &[Sprint],
    ui: &mut Ui,
) -> DetailAction {
    let mut action = DetailAction::None;
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Détail du jalon")
                .strong()
                .size(13.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(RichText::new(egui_phosphor::regular::X).size(12.0))
                .clicked()
            {
                action = DetailAction::Close;
            }
        });
    });
    ui.add_space(4.0);

    section_label(ui, "Nom");
    if ui
        .add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut milestone.name)
                .font(egui::FontId::proportional(12.0)),
        )
        .changed()
    {
        changed = true;
    }

    section_label(ui, "Date");
    if ui
        .add(egui_extras::DatePickerButton::new(&mut milestone.date).id_salt("dp_milestone"))
        .changed()
    {
        changed = true;
    }

    section_label(ui, "Sprint");
    let sprint_label = milestone
        .sprint_id
        .and_then(|id| sprints.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "— Aucun —".to_string());
    egui::ComboBox::from_id_salt("milestone_sprint_combo")
        .selected_text(RichText::new(sprint_label).size(11.0))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            if ui
                .selectable_label(milestone.sprint_id.is_none(), "— Aucun —")
                .clicked()
            {
                milestone.sprint_id = None;
                changed = true;
            }
            for sprint in sprints {
                if ui
                    .selectable_label(milestone.sprint_id == Some(sprint.id), &sprint.name)
                    .clicked()
                {
                    milestone.sprint_id = Some(sprint.id);
                    changed = true;
                }
            }
        });

    section_label(ui, "Description");
    if ui
        .add_sized(
            [ui.available_width(), 52.0],
            egui::TextEdit::multiline(&mut milestone.description)
                .font(egui::FontId::proportional(11.0)),
        )
        .changed()
    {
        changed = true;
    }

    ui.add_space(6.0);
    let delete_btn = egui::Button::new(
        RichText::new(format!(
            "{}  Supprimer le jalon",
            egui_phosphor::regular::TRASH
        ))
        .color(Color32::WHITE)
        .size(11.0),
    )
    .fill(theme::MILESTONE)
    .rounding(egui::Rounding::same(4.0));
    if ui.add_sized([ui.available_width(), 26.0], delete_btn).clicked() {
        action = DetailAction::DeleteMilestone(milestone.id);
    }

    if changed && action == DetailAction::None {
        action = DetailAction::Changed;
    }
    action
}
