use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use chrono::Duration;
use uuid::Uuid;

use crate::io::sync::{spawn_load, NullStore};
use crate::io::{Autosaver, StateClient};
use crate::model::state::seed_state;
use crate::model::{AppState, Filters, Milestone, Task, TaskStatus, Team};
use crate::ui;
use crate::ui::export_dialog::{ExportDialogState, ExportFormat};
use crate::ui::kanban::KanbanAction;
use crate::ui::timeline::{TimelineAction, TimelineState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timeline,
    Kanban,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Task(Uuid),
    Milestone(Uuid),
}

/// Main application state.
pub struct RoadmapApp {
    pub state: AppState,
    pub filters: Filters,
    pub timeline: TimelineState,
    pub active_view: View,
    pub selection: Option<Selection>,

    // Export dialog
    pub show_export: bool,
    pub export: ExportDialogState,
    export_path: Option<PathBuf>,
    screenshot_pending: bool,

    // Persistence
    pub autosaver: Autosaver,
    load_rx: Option<Receiver<anyhow::Result<Option<AppState>>>>,
    dirty: bool,

    // Status message
    pub status_message: String,
}

impl RoadmapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let (autosaver, load_rx) = match StateClient::from_env() {
            Ok(client) => (
                Autosaver::spawn(client.clone()),
                Some(spawn_load(client)),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "no HTTP client, persistence disabled");
                (Autosaver::spawn(NullStore), None)
            }
        };

        Self {
            state: seed_state(),
            filters: Filters::default(),
            timeline: TimelineState::default(),
            active_view: View::Timeline,
            selection: None,
            show_export: false,
            export: ExportDialogState::default(),
            export_path: None,
            screenshot_pending: false,
            autosaver,
            load_rx,
            dirty: false,
            status_message: "Chargement…".to_string(),
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn poll_initial_load(&mut self) {
        let Some(rx) = &self.load_rx else { return };
        match rx.try_recv() {
            Ok(Ok(Some(state))) => {
                self.state = state;
                self.status_message = "Document chargé".to_string();
                self.load_rx = None;
            }
            Ok(Ok(None)) => {
                // No document on the backend yet: keep the seed.
                self.status_message = "Nouveau document".to_string();
                self.load_rx = None;
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "state load failed, using seed data");
                self.status_message = "Backend injoignable — données de démonstration".to_string();
                self.load_rx = None;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {}
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.load_rx = None;
            }
        }
    }

    // --- File operations ---

    pub fn new_document(&mut self) {
        self.state = AppState::default();
        self.selection = None;
        self.filters.reset();
        self.mark_dirty();
        self.status_message = "Nouveau document créé".to_string();
    }

    pub fn open_document(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Document roadmap", &["json"])
            .pick_file()
        {
            match crate::io::file::load_document(&path) {
                Ok(state) => {
                    self.state = state;
                    self.selection = None;
                    self.mark_dirty();
                    self.status_message = "Document ouvert".to_string();
                }
                Err(err) => {
                    self.status_message = format!("Erreur d'ouverture: {}", err);
                }
            }
        }
    }

    pub fn save_document_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Document roadmap", &["json"])
            .set_file_name("roadmap.json")
            .save_file()
        {
            match crate::io::file::save_document(&self.state, &path) {
                Ok(()) => self.status_message = "Document enregistré".to_string(),
                Err(err) => self.status_message = format!("Erreur d'enregistrement: {}", err),
            }
        }
    }

    // --- Entity operations ---

    pub fn create_task(&mut self) {
        let today = chrono::Local::now().date_naive();
        if self.state.teams.is_empty() {
            self.state.teams.push(Team::new("Équipe", "#3B82F6"));
        }
        let team_id = self.state.teams[0].id;
        let mut task = Task::new("Nouvelle tâche", team_id, today, today + Duration::days(7));
        task.order = self
            .state
            .tasks
            .iter()
            .map(|t| t.order)
            .max()
            .unwrap_or(-1)
            + 1;
        let id = task.id;
        self.state.tasks.push(task);
        self.selection = Some(Selection::Task(id));
        self.mark_dirty();
        self.status_message = "Tâche ajoutée".to_string();
    }

    pub fn create_milestone(&mut self) {
        let today = chrono::Local::now().date_naive();
        let milestone = Milestone::new("Nouveau jalon", today + Duration::days(14));
        let id = milestone.id;
        self.state.milestones.push(milestone);
        self.selection = Some(Selection::Milestone(id));
        self.mark_dirty();
        self.status_message = "Jalon ajouté".to_string();
    }

    fn reschedule_task(&mut self, task_id: Uuid, delta_days: i64) {
        if let Some(task) = self.state.task_mut(task_id) {
            task.shift_days(delta_days);
            self.status_message = format!(
                "'{}' décalée ({} → {})",
                task.title,
                task.start_date.format("%d/%m/%Y"),
                task.end_date.format("%d/%m/%Y"),
            );
            self.mark_dirty();
        }
    }

    fn move_task(&mut self, task_id: Uuid, status: TaskStatus) {
        let next_order = self
            .state
            .tasks
            .iter()
            .filter(|t| t.status == status)
            .map(|t| t.order)
            .max()
            .unwrap_or(-1)
            + 1;
        let changed_title = if let Some(task) = self.state.task_mut(task_id) {
            if task.status != status {
                task.status = status;
                task.order = next_order;
                task.touch();
                Some(task.title.clone())
            } else {
                None
            }
        } else {
            None
        };
        if let Some(title) = changed_title {
            self.mark_dirty();
            self.status_message = format!("'{}' → {}", title, status.label());
        }
    }

    // --- Export ---

    pub fn start_export(&mut self) {
        self.export.error = None;
        match self.export.format {
            ExportFormat::Csv => {
                let default_name = format!(
                    "roadmap-{}.csv",
                    chrono::Local::now().date_naive().format("%Y-%m-%d")
                );
                let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV", &["csv"])
                    .set_file_name(&default_name)
                    .save_file()
                else {
                    return;
                };
                match crate::io::csv_export::export_csv(&self.state, &path) {
                    Ok(count) => {
                        self.show_export = false;
                        self.status_message = format!("{} tâches exportées en CSV", count);
                        let _ = open::that(&path);
                    }
                    Err(err) => {
                        self.export.error = Some(err.to_string());
                    }
                }
            }
            ExportFormat::Png => {
                let default_name = format!(
                    "timeline-export-{}.png",
                    chrono::Local::now().date_naive().format("%Y-%m-%d")
                );
                let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image PNG", &["png"])
                    .set_file_name(&default_name)
                    .save_file()
                else {
                    return;
                };
                // The capture shows the timeline with the requested window.
                self.active_view = View::Timeline;
                self.timeline.window_override = self.export.custom_range();
                self.export_path = Some(path);
                self.export.in_progress = true;
                self.screenshot_pending = true;
            }
        }
    }

    fn finish_export(&mut self, capture: &egui::ColorImage) {
        let Some(path) = self.export_path.take() else {
            return;
        };
        self.timeline.window_override = None;
        self.export.in_progress = false;
        match crate::io::image_export::save_png(capture, &path) {
            Ok(()) => {
                self.show_export = false;
                self.status_message = "Timeline exportée en PNG".to_string();
                let _ = open::that(&path);
            }
            Err(err) => {
                tracing::warn!(error = %err, "image export failed");
                self.export.error = Some(err.to_string());
            }
        }
    }

    fn apply_timeline_actions(&mut self, actions: Vec<TimelineAction>) {
        for action in actions {
            match action {
                TimelineAction::OpenTask(id) => {
                    if self.state.task(id).is_some() {
                        self.selection = Some(Selection::Task(id));
                    }
                }
                TimelineAction::OpenMilestone(id) => {
                    if self.state.milestones.iter().any(|m| m.id == id) {
                        self.selection = Some(Selection::Milestone(id));
                    }
                }
                TimelineAction::Reschedule { task_id, delta_days } => {
                    self.reschedule_task(task_id, delta_days);
                }
                TimelineAction::ToggleSteps(id) => {
                    self.timeline.toggle_steps(id);
                }
            }
        }
    }

    fn apply_kanban_actions(&mut self, actions: Vec<KanbanAction>) {
        for action in actions {
            match action {
                KanbanAction::OpenTask(id) => {
                    if self.state.task(id).is_some() {
                        self.selection = Some(Selection::Task(id));
                    }
                }
                KanbanAction::MoveTask { task_id, status } => {
                    self.move_task(task_id, status);
                }
            }
        }
    }

    fn show_detail_panel(&mut self, ctx: &egui::Context) {
        let Some(selection) = self.selection else {
            return;
        };

        let mut action = ui::detail::DetailAction::None;
        egui::SidePanel::right("detail_panel")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(420.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(10.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER)),
            )
            .show(ctx, |panel_ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(panel_ui, |panel_ui| match selection {
                        Selection::Task(id) => {
                            let teams = self.state.teams.clone();
                            let sprints = self.state.sprints.clone();
                            let topics = self.state.topics.clone();
                            if let Some(task) = self.state.task_mut(id) {
                                action = ui::detail::show_task_detail(
                                    task, &teams, &sprints, &topics, panel_ui,
                                );
                            } else {
                                self.selection = None;
                            }
                        }
                        Selection::Milestone(id) => {
                            let sprints = self.state.sprints.clone();
                            if let Some(milestone) = self.state.milestone_mut(id) {
                                action =
                                    ui::detail::show_milestone_detail(milestone, &sprints, panel_ui);
                            } else {
                                self.selection = None;
                            }
                        }
                    });
            });

        match action {
            ui::detail::DetailAction::Changed => {
                self.mark_dirty();
                self.status_message = "Modifications enregistrées".to_string();
            }
            ui::detail::DetailAction::DeleteTask(id) => {
                self.state.delete_task(id);
                self.selection = None;
                self.mark_dirty();
                self.status_message = "Tâche supprimée".to_string();
            }
            ui::detail::DetailAction::DeleteMilestone(id) => {
                self.state.milestones.retain(|m| m.id != id);
                self.selection = None;
                self.mark_dirty();
                self.status_message = "Jalon supprimé".to_string();
            }
            ui::detail::DetailAction::Close => {
                self.selection = None;
            }
            ui::detail::DetailAction::None => {}
        }
    }
}

impl eframe::App for RoadmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        self.poll_initial_load();

        // Pending screenshot from the export flow: the command captures this
        // frame, rendered with the window override already applied.
        if self.screenshot_pending {
            self.screenshot_pending = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot);
        }
        let capture = ctx.input(|i| {
            i.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(image) = capture {
            self.finish_export(image.as_ref());
        }

        // Ctrl+S forces an immediate save through the debounce queue.
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.autosaver.queue(self.state.clone());
            self.status_message = "Enregistrement…".to_string();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(10.5)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tâches: {}", self.state.tasks.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(" · ")
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "Zoom: {}/{}",
                                self.timeline.zoom_level + 1,
                                crate::timeline::grid::ZOOM_LEVELS.len()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        self.show_detail_panel(ctx);

        let view_frame = egui::Frame::default()
            .fill(ui::theme::BG_APP)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default()
            .frame(view_frame)
            .show(ctx, |ui| match self.active_view {
                View::Timeline => {
                    let actions =
                        ui::timeline::show_timeline(&self.state, &mut self.timeline, &self.filters, ui);
                    self.apply_timeline_actions(actions);
                }
                View::Kanban => {
                    let actions = ui::kanban::show_kanban(&self.state, &self.filters, ui);
                    self.apply_kanban_actions(actions);
                }
            });

        // The dialog is hidden while a capture is in flight so it does not
        // end up in the exported image; it comes back if the export fails.
        if self.show_export && !self.export.in_progress {
            ui::export_dialog::show_export_dialog(self, ctx);
        }

        // Every mutation funnels into one debounced autosave snapshot.
        if self.dirty {
            self.autosaver.queue(self.state.clone());
            self.dirty = false;
        }
    }
}
