use egui::{menu, RichText, Ui};

use crate::app::{RoadmapApp, View};
use crate::io::SyncStatus;
use crate::timeline::grouping::GroupBy;
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut RoadmapApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Fichier  ").font(theme::font_menu()), |ui| {
            if ui.button("  Nouveau document").clicked() {
                app.new_document();
                ui.close_menu();
            }
            if ui.button("  Ouvrir...").clicked() {
                app.open_document();
                ui.close_menu();
            }
            if ui.button("  Enregistrer sous...").clicked() {
                app.save_document_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Exporter...").clicked() {
                app.show_export = true;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Affichage  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom avant        Ctrl+Scroll ↑").clicked() {
                app.timeline.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom arrière      Ctrl+Scroll ↓").clicked() {
                app.timeline.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Replier toutes les étapes").clicked() {
                app.timeline.expanded.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        // View switcher.
        for (view, label) in [(View::Timeline, "Timeline"), (View::Kanban, "Kanban")] {
            if ui
                .selectable_label(app.active_view == view, RichText::new(label).size(12.0))
                .clicked()
            {
                app.active_view = view;
            }
        }

        ui.separator();

        // Group-by chips with their activation order.
        ui.label(
            RichText::new(format!("{} Regrouper par", egui_phosphor::regular::STACK))
                .size(11.0)
                .color(theme::TEXT_SECONDARY),
        );
        for level in GroupBy::ALL {
            let position = app.timeline.group_by.iter().position(|l| *l == level);
            let label = match position {
                Some(idx) if app.timeline.group_by.len() > 1 => {
                    format!("{} {}", idx + 1, level.label())
                }
                _ => level.label().to_string(),
            };
            if ui
                .selectable_label(position.is_some(), RichText::new(label).size(11.0))
                .clicked()
            {
                app.timeline.toggle_group_by(level);
            }
        }
        if !app.timeline.group_by.is_empty()
            && ui
                .button(RichText::new("Réinitialiser").size(10.0).color(theme::TEXT_DIM))
                .clicked()
        {
            app.timeline.group_by.clear();
        }

        ui.separator();

        // Search + filter menus.
        ui.add(
            egui::TextEdit::singleline(&mut app.filters.search_query)
                .hint_text("Rechercher...")
                .desired_width(140.0),
        );

        let filters_label = if app.filters.is_active() {
            RichText::new(format!("{} Filtres •", egui_phosphor::regular::FUNNEL))
                .color(theme::ACCENT)
        } else {
            RichText::new(format!("{} Filtres", egui_phosphor::regular::FUNNEL))
        };
        ui.menu_button(filters_label.size(11.0), |ui| {
            ui.label(RichText::new("Statut").small().weak());
            for status in crate::model::TaskStatus::ALL {
                let active = app.filters.statuses.contains(&status);
                if ui.selectable_label(active, status.label()).clicked() {
                    app.filters.toggle_status(status);
                }
            }
            ui.separator();
            ui.label(RichText::new("Équipe").small().weak());
            for team in app.state.teams.clone() {
                let active = app.filters.team_ids.contains(&team.id);
                if ui.selectable_label(active, &team.name).clicked() {
                    app.filters.toggle_team(team.id);
                }
            }
            ui.separator();
            ui.label(RichText::new("Sprint").small().weak());
            for sprint in app.state.sprints.clone() {
                let active = app.filters.sprint_ids.contains(&sprint.id);
                if ui.selectable_label(active, &sprint.name).clicked() {
                    app.filters.toggle_sprint(sprint.id);
                }
            }
            ui.separator();
            ui.label(RichText::new("Métier").small().weak());
            for role in crate::model::Role::ORDER {
                let active = app.filters.roles.contains(&role);
                if ui.selectable_label(active, role.label()).clicked() {
                    app.filters.toggle_role(role);
                }
            }
            ui.separator();
            ui.label(RichText::new("Thème").small().weak());
            for topic in app.state.topics.clone() {
                let active = app.filters.topic_ids.contains(&topic.id);
                if ui.selectable_label(active, &topic.name).clicked() {
                    app.filters.toggle_topic(topic.id);
                }
            }
            ui.separator();
            if ui.button("Tout réinitialiser").clicked() {
                app.filters.reset();
                ui.close_menu();
            }
        });

        if ui
            .button(RichText::new(format!("{} Tâche", egui_phosphor::regular::PLUS)).size(11.0))
            .clicked()
        {
            app.create_task();
        }
        if ui
            .button(RichText::new(format!("{} Jalon", egui_phosphor::regular::FLAG)).size(11.0))
            .clicked()
        {
            app.create_milestone();
        }

        // Right-aligned sync status.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let (text, color) = match app.autosaver.status() {
                SyncStatus::Idle => ("".to_string(), theme::TEXT_DIM),
                SyncStatus::Pending => ("Enregistrement…".to_string(), theme::TEXT_DIM),
                SyncStatus::Saved => ("Enregistré".to_string(), theme::TODAY),
                SyncStatus::Failed => ("Hors ligne".to_string(), theme::TEXT_DIM),
            };
            ui.label(RichText::new(text).size(10.5).color(color));
        });
    });
}
