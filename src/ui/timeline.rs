use std::collections::HashSet;

use chrono::NaiveDate;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

use crate::model::{org::parse_hex_color, AppState, Filters, Task};
use crate::timeline::derived_progress;
use crate::timeline::gesture::{DragOutcome, GestureController};
use crate::timeline::grid::{
    self, DateGrid, DateWindow, ZOOM_LEVELS,
};
use crate::timeline::grouping::{french_month_label, group_tasks, GroupBy, GroupedRow};
use crate::timeline::lanes::{
    STEP_ICON_SIZE, STEP_LABEL_MAX_W, STEP_ROW_PITCH, STEP_TOP_PADDING,
};
use crate::timeline::rows::{
    compute_expanded_metrics, layout_rows, GROUP_HEADER_HEIGHT, ROW_HEIGHT,
};
use crate::ui::theme;

pub const SIDEBAR_WIDTH: f32 = 200.0;
pub const SPRINT_ROW_HEIGHT: f32 = 28.0;
pub const MONTH_ROW_HEIGHT: f32 = 32.0;
pub const DAY_ROW_HEIGHT: f32 = 24.0;

/// View-layer state of the timeline. Nothing here is business data: it is
/// reset on restart and never persisted.
pub struct TimelineState {
    pub zoom_level: usize,
    pub group_by: Vec<GroupBy>,
    pub expanded: HashSet<Uuid>,
    pub gesture: GestureController,
    pub window_override: Option<(NaiveDate, NaiveDate)>,
    pending_scroll: Option<Vec2>,
    autocenter_key: Option<(usize, NaiveDate)>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            zoom_level: grid::DEFAULT_ZOOM_LEVEL,
            group_by: Vec::new(),
            expanded: HashSet::new(),
            gesture: GestureController::default(),
            window_override: None,
            pending_scroll: None,
            autocenter_key: None,
        }
    }
}

impl TimelineState {
    pub fn zoom_in(&mut self) {
        self.zoom_level = (self.zoom_level + 1).min(ZOOM_LEVELS.len() - 1);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_level = self.zoom_level.saturating_sub(1);
    }

    pub fn toggle_group_by(&mut self, level: GroupBy) {
        if let Some(pos) = self.group_by.iter().position(|l| *l == level) {
            self.group_by.remove(pos);
        } else {
            self.group_by.push(level);
        }
    }

    pub fn toggle_steps(&mut self, task_id: Uuid) {
        if !self.expanded.remove(&task_id) {
            self.expanded.insert(task_id);
        }
    }
}

/// What the timeline asks the application to do after this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineAction {
    OpenTask(Uuid),
    OpenMilestone(Uuid),
    Reschedule { task_id: Uuid, delta_days: i64 },
    ToggleSteps(Uuid),
}

struct BarHit {
    task_id: Uuid,
    rect: Rect,
    start: NaiveDate,
    end: NaiveDate,
}

/// Render the timeline view and collect the actions to apply.
pub fn show_timeline(
    state: &AppState,
    view: &mut TimelineState,
    filters: &Filters,
    ui: &mut Ui,
) -> Vec<TimelineAction> {
    let mut actions = Vec::new();
    let today = chrono::Local::now().date_naive();

    // Filtered, top-level, ordered tasks feed the grouping engine.
    let filtered = filters.apply(&state.tasks);
    let mut top_level: Vec<&Task> = filtered
        .into_iter()
        .filter(|t| t.parent_task_id.is_none())
        .collect();
    top_level.sort_by_key(|t| t.order);

    let rows = group_tasks(&top_level, &view.group_by, &state.topics);
    let window = DateWindow::fit(&top_level, &state.sprints, today, view.window_override);
    let grid = DateGrid::new(window, view.zoom_level);
    let metrics = compute_expanded_metrics(&rows, &view.expanded, &grid);
    let layout = layout_rows(&rows, &metrics);

    let show_days = grid::show_day_row(view.zoom_level);
    let header_h = SPRINT_ROW_HEIGHT + MONTH_ROW_HEIGHT + if show_days { DAY_ROW_HEIGHT } else { 0.0 };

    // Ctrl+scroll zooms, as everywhere else in the app.
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll_y = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_y > 0.0 {
            view.zoom_in();
        } else if scroll_y < 0.0 {
            view.zoom_out();
        }
    }

    // Re-center "today" whenever the zoom level or the window start changes.
    let viewport_w = ui.available_width();
    let autocenter_key = (view.zoom_level, window.start);
    if view.autocenter_key != Some(autocenter_key) {
        view.autocenter_key = Some(autocenter_key);
        let target_x = grid.x_of(today) - viewport_w / 2.0
            + grid.day_width / 2.0
            + SIDEBAR_WIDTH / 2.0;
        view.pending_scroll = Some(Vec2::new(target_x.max(0.0), 0.0));
    }

    let mut scroll_area = egui::ScrollArea::both().auto_shrink([false, false]);
    if let Some(target) = view.pending_scroll.take() {
        scroll_area = scroll_area.scroll_offset(target);
    }

    let content_size = Vec2::new(
        SIDEBAR_WIDTH + grid.total_width(),
        header_h + layout.total_height + 40.0,
    );

    let mut output = scroll_area.show(ui, |ui| {
        let avail = ui.available_size();
        let (response, painter) = ui.allocate_painter(content_size.max(avail), Sense::hover());
        let origin = response.rect.min;
        let clip = ui.clip_rect();
        let cols_x0 = origin.x + SIDEBAR_WIDTH;
        let body_top = origin.y + header_h;
        let content_h = layout.total_height;

        painter.rect_filled(response.rect, 0.0, theme::BG_APP);

        let mut bar_hits: Vec<BarHit> = Vec::new();
        let mut no_drag_zones: Vec<Rect> = Vec::new();
        let pointer_pos = ui.input(|i| i.pointer.latest_pos());

        // ── Body: day columns and weekend shading ──────────────────────────
        if show_days {
            for day in grid.days() {
                let x = cols_x0 + grid.x_of(day);
                if grid::is_weekend(day) {
                    painter.rect_filled(
                        Rect::from_min_size(
                            Pos2::new(x, body_top),
                            Vec2::new(grid.day_width, content_h),
                        ),
                        0.0,
                        theme::BG_WEEKEND,
                    );
                }
                painter.line_segment(
                    [
                        Pos2::new(x + grid.day_width, body_top),
                        Pos2::new(x + grid.day_width, body_top + content_h),
                    ],
                    Stroke::new(0.5, theme::GRID_LINE),
                );
            }
        }

        // ── Body: sprint bands ──────────────────────────────────────────────
        for (i, sprint) in state.sprints.iter().enumerate() {
            let x = cols_x0 + grid.x_of(sprint.start_date);
            let w = grid.width_of(sprint.start_date, sprint.end_date);
            if i % 2 == 0 {
                painter.rect_filled(
                    Rect::from_min_size(Pos2::new(x, body_top), Vec2::new(w, content_h)),
                    0.0,
                    theme::BG_SPRINT_BAND,
                );
            }
            painter.extend(egui::Shape::dashed_line(
                &[
                    Pos2::new(x + w, body_top),
                    Pos2::new(x + w, body_top + content_h),
                ],
                Stroke::new(1.0, theme::GRID_LINE),
                4.0,
                4.0,
            ));
        }

        // ── Body: today line ────────────────────────────────────────────────
        let today_visible = window.contains(today);
        let today_center_x = cols_x0 + grid.center_x_of(today);
        if today_visible {
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(today_center_x - theme::TODAY_LINE_WIDTH / 2.0, body_top),
                    Vec2::new(theme::TODAY_LINE_WIDTH, content_h),
                ),
                0.0,
                theme::TODAY,
            );
        }

        // ── Rows ────────────────────────────────────────────────────────────
        for (row, slot) in rows.iter().zip(layout.slots.iter()) {
            let row_y = body_top + slot.y;
            match row {
                GroupedRow::Header(header) => {
                    // Group header band across the full width; the label part
                    // is re-drawn over the sidebar later so it stays visible.
                    let bg = if header.depth == 0 {
                        theme::BG_GROUP_HEADER
                    } else {
                        theme::BG_GROUP_SUBHEADER
                    };
                    painter.rect_filled(
                        Rect::from_min_size(
                            Pos2::new(origin.x, row_y),
                            Vec2::new(response.rect.width(), slot.height),
                        ),
                        0.0,
                        bg,
                    );
                    painter.line_segment(
                        [
                            Pos2::new(origin.x, row_y + slot.height),
                            Pos2::new(origin.x + response.rect.width(), row_y + slot.height),
                        ],
                        Stroke::new(0.5, theme::BORDER),
                    );
                }
                GroupedRow::Task { task, .. } => {
                    // Row hover tint.
                    if let Some(pos) = pointer_pos {
                        let row_rect = Rect::from_min_size(
                            Pos2::new(clip.left(), row_y),
                            Vec2::new(clip.width(), slot.height),
                        );
                        if row_rect.contains(pos) && !view.gesture.is_active() {
                            painter.rect_filled(row_rect, 0.0, theme::BG_ROW_HOVER);
                        }
                    }
                    painter.line_segment(
                        [
                            Pos2::new(origin.x, row_y + slot.height),
                            Pos2::new(origin.x + response.rect.width(), row_y + slot.height),
                        ],
                        Stroke::new(0.5, theme::BORDER_FAINT),
                    );

                    draw_task_row(
                        ui,
                        &painter,
                        state,
                        view,
                        &grid,
                        &metrics,
                        task,
                        cols_x0,
                        row_y,
                        today,
                        &mut bar_hits,
                        &mut no_drag_zones,
                        &mut actions,
                    );
                }
            }
        }

        // ── Milestone dotted lines over the body ────────────────────────────
        for milestone in &state.milestones {
            let x = cols_x0 + grid.x_of(milestone.date);
            painter.extend(egui::Shape::dashed_line(
                &[Pos2::new(x, body_top), Pos2::new(x, body_top + content_h)],
                Stroke::new(2.0, theme::MILESTONE_LINE),
                2.0,
                4.0,
            ));
        }

        // ── Sticky sidebar (drawn over the body) ────────────────────────────
        draw_sidebar(ui, &painter, state, &rows, &layout.slots, clip, body_top, &mut actions);
        // Bars scrolled under the sidebar are covered, not clickable.
        no_drag_zones.push(Rect::from_min_size(
            Pos2::new(clip.left(), clip.top()),
            Vec2::new(SIDEBAR_WIDTH, clip.height()),
        ));

        // ── Sticky header (drawn over everything) ───────────────────────────
        draw_header(
            ui,
            &painter,
            state,
            view,
            &grid,
            clip,
            cols_x0,
            show_days,
            today,
            today_visible,
            today_center_x,
            &mut no_drag_zones,
            &mut actions,
        );

        // ── Gesture wiring ──────────────────────────────────────────────────
        let day_width = grid.day_width;
        let mut pan_target: Option<Vec2> = None;

        let (primary_pressed, pan_pressed, released, interact_pos) = ui.input(|i| {
            (
                i.pointer.button_pressed(egui::PointerButton::Primary),
                i.pointer.button_pressed(egui::PointerButton::Secondary)
                    || i.pointer.button_pressed(egui::PointerButton::Middle),
                i.pointer.any_released(),
                i.pointer.interact_pos(),
            )
        });

        if let Some(pos) = interact_pos {
            if primary_pressed && !view.gesture.is_active() {
                let over_widget = no_drag_zones.iter().any(|r| r.contains(pos));
                if !over_widget {
                    if let Some(hit) = bar_hits.iter().find(|h| h.rect.contains(pos)) {
                        view.gesture.begin_drag(hit.task_id, pos.x, hit.start, hit.end);
                    }
                }
            }
            if pan_pressed && response.rect.contains(pos) {
                view.gesture.begin_pan(pos, ui.clip_rect().min.to_vec2() - origin.to_vec2());
            }
        }

        if let Some(pos) = pointer_pos {
            if let Some(scroll) = view.gesture.pointer_moved(pos) {
                pan_target = Some(scroll.max(Vec2::ZERO));
            }
        }

        if view.gesture.is_active() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        }

        if released {
            match view.gesture.released(day_width) {
                Some(DragOutcome::OpenTask(id)) => actions.push(TimelineAction::OpenTask(id)),
                Some(DragOutcome::Reschedule { task_id, delta_days }) => {
                    actions.push(TimelineAction::Reschedule { task_id, delta_days })
                }
                Some(DragOutcome::Nothing) | None => {}
            }
        }

        pan_target
    });

    // Pan bypasses the scroll state: apply the new offset directly.
    if let Some(target) = output.inner {
        output.state.offset = target;
        output.state.store(ui.ctx(), output.id);
    }

    // Floating zoom controls.
    egui::Area::new(egui::Id::new("timeline_zoom_controls"))
        .anchor(egui::Align2::RIGHT_BOTTOM, Vec2::new(-24.0, -48.0))
        .show(ui.ctx(), |ui| {
            egui::Frame::window(ui.style())
                .inner_margin(egui::Margin::same(4.0))
                .show(ui, |ui| {
                    ui.vertical(|ui| {
                        let can_zoom_in = view.zoom_level < ZOOM_LEVELS.len() - 1;
                        if ui
                            .add_enabled(
                                can_zoom_in,
                                egui::Button::new(egui_phosphor::regular::MAGNIFYING_GLASS_PLUS),
                            )
                            .on_hover_text("Zoom avant")
                            .clicked()
                        {
                            view.zoom_in();
                        }
                        if ui
                            .add_enabled(
                                view.zoom_level > 0,
                                egui::Button::new(egui_phosphor::regular::MAGNIFYING_GLASS_MINUS),
                            )
                            .on_hover_text("Zoom arrière")
                            .clicked()
                        {
                            view.zoom_out();
                        }
                    });
                });
        });

    actions
}

#[allow(clippy::too_many_arguments)]
fn draw_task_row(
    ui: &mut Ui,
    painter: &egui::Painter,
    state: &AppState,
    view: &TimelineState,
    grid: &DateGrid,
    metrics: &crate::timeline::rows::ExpandedMetrics,
    task: &Task,
    cols_x0: f32,
    row_y: f32,
    today: NaiveDate,
    bar_hits: &mut Vec<BarHit>,
    no_drag_zones: &mut Vec<Rect>,
    actions: &mut Vec<TimelineAction>,
) {
    let team_color = state
        .team(task.team_id)
        .map(|t| parse_hex_color(&t.color))
        .unwrap_or(theme::BAR_FALLBACK);

    let x = cols_x0 + grid.x_of(task.start_date);
    let w = grid.width_of(task.start_date, task.end_date);
    let is_dragging = view.gesture.is_dragging(task.id);
    let drag_dx = view
        .gesture
        .drag_preview()
        .filter(|(id, _)| *id == task.id)
        .map(|(_, dx)| dx)
        .unwrap_or(0.0);

    let bar_rect = Rect::from_min_size(
        Pos2::new(x + drag_dx, row_y + 8.0),
        Vec2::new(w, ROW_HEIGHT - 16.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow, stronger while dragging.
    let shadow_alpha = if is_dragging { 60 } else { 25 };
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(shadow_alpha),
    );
    painter.rect_filled(bar_rect, rounding, team_color);

    // Derived progress fill.
    let progress = derived_progress(task.start_date, task.end_date, today);
    if progress > 0 {
        let p_w = bar_rect.width() * progress as f32 / 100.0;
        painter.rect_filled(
            Rect::from_min_size(bar_rect.min, Vec2::new(p_w, bar_rect.height())),
            rounding,
            theme::PROGRESS_OVERLAY,
        );
    }

    if is_dragging {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::ACCENT),
        );
    }

    // Title inside the bar when there is room.
    if bar_rect.width() > 90.0 {
        let galley = painter.layout_no_wrap(task.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect.shrink2(Vec2::new(6.0, 0.0)));
        clipped.galley(
            Pos2::new(
                bar_rect.left() + 6.0,
                bar_rect.center().y - galley.size().y / 2.0,
            ),
            galley,
            Color32::TRANSPARENT,
        );
    }

    let bar_response = ui.interact(
        bar_rect,
        ui.make_persistent_id(("task-bar", task.id)),
        Sense::hover(),
    );
    if bar_response.hovered() && !view.gesture.is_active() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            egui::Id::new(("task-tip", task.id)),
            |ui| {
                ui.strong(&task.title);
                ui.label(format!(
                    "{} → {}",
                    task.start_date.format("%d/%m/%Y"),
                    task.end_date.format("%d/%m/%Y"),
                ));
                ui.label(format!("Avancement: {}%", progress));
            },
        );
    }

    // Collapsed step markers on the bar.
    if !is_dragging {
        for step in &task.steps {
            let pct = step_position_pct(step.date, task.start_date, task.end_date);
            let cx = bar_rect.left() + bar_rect.width() * pct;
            let marker = Rect::from_center_size(
                Pos2::new(cx, bar_rect.center().y),
                Vec2::splat(18.0),
            );
            painter.circle_filled(marker.center(), 9.0, Color32::WHITE);
            painter.circle_stroke(marker.center(), 9.0, Stroke::new(1.0, theme::BORDER));
            painter.text(
                marker.center(),
                egui::Align2::CENTER_CENTER,
                crate::model::task::step_icon_glyph(&step.icon),
                theme::font_small(),
                theme::TEXT_PRIMARY,
            );
            let marker_resp = ui.interact(
                marker,
                ui.make_persistent_id(("step-marker", step.id)),
                Sense::click(),
            );
            if marker_resp.on_hover_text(&step.text).clicked() {
                actions.push(TimelineAction::OpenTask(task.id));
            }
            no_drag_zones.push(marker);
        }

        // Expand toggle at the right edge, only when there are steps to show.
        if !task.steps.is_empty() {
            let toggle = Rect::from_center_size(
                Pos2::new(bar_rect.right() - 12.0, bar_rect.center().y),
                Vec2::splat(16.0),
            );
            let is_expanded = view.expanded.contains(&task.id);
            let glyph = if is_expanded {
                egui_phosphor::regular::CARET_UP
            } else {
                egui_phosphor::regular::CARET_DOWN
            };
            painter.circle_filled(toggle.center(), 8.0, Color32::from_black_alpha(70));
            painter.text(
                toggle.center(),
                egui::Align2::CENTER_CENTER,
                glyph,
                theme::font_small(),
                Color32::WHITE,
            );
            let toggle_resp = ui.interact(
                toggle,
                ui.make_persistent_id(("steps-toggle", task.id)),
                Sense::click(),
            );
            let hover_text = if is_expanded {
                "Masquer les étapes sous la barre"
            } else {
                "Afficher les étapes sous la barre"
            };
            if toggle_resp.on_hover_text(hover_text).clicked() {
                actions.push(TimelineAction::ToggleSteps(task.id));
            }
            no_drag_zones.push(toggle);
        }
    }

    bar_hits.push(BarHit {
        task_id: task.id,
        rect: bar_rect,
        start: task.start_date,
        end: task.end_date,
    });

    // Expanded step panel under the main line.
    if let Some(layout) = metrics.lanes_by_task.get(&task.id) {
        let panel_top = row_y + ROW_HEIGHT;
        for step in &task.steps {
            let lane = layout.lane_by_step.get(&step.id).copied().unwrap_or(0);
            let anchor_x = cols_x0 + grid.center_x_of(step.date);
            let top = panel_top + STEP_TOP_PADDING + lane as f32 * STEP_ROW_PITCH;

            let icon_center = Pos2::new(anchor_x, top + 10.0);
            painter.circle_filled(icon_center, STEP_ICON_SIZE / 2.0 + 3.0, Color32::WHITE);
            painter.circle_stroke(
                icon_center,
                STEP_ICON_SIZE / 2.0 + 3.0,
                Stroke::new(1.0, theme::BORDER),
            );
            painter.text(
                icon_center,
                egui::Align2::CENTER_CENTER,
                crate::model::task::step_icon_glyph(&step.icon),
                theme::font_sub(),
                theme::TEXT_PRIMARY,
            );

            let date_label = step
                .date
                .format_localized("%d %b", chrono::Locale::fr_FR)
                .to_string();
            let text_galley = painter.layout_no_wrap(
                step.text.clone(),
                theme::font_sub(),
                theme::TEXT_PRIMARY,
            );
            let date_galley =
                painter.layout_no_wrap(date_label, theme::font_small(), theme::TEXT_DIM);
            let chip_w = (text_galley.size().x + date_galley.size().x + 22.0)
                .min(STEP_LABEL_MAX_W);
            let chip = Rect::from_min_size(
                Pos2::new(anchor_x + STEP_ICON_SIZE / 2.0 + 6.0, top),
                Vec2::new(chip_w, 20.0),
            );
            painter.rect_filled(chip, Rounding::same(6.0), Color32::WHITE);
            painter.rect_stroke(chip, Rounding::same(6.0), Stroke::new(1.0, theme::BORDER));
            let chip_painter = painter.with_clip_rect(chip.shrink(2.0));
            chip_painter.galley(
                Pos2::new(chip.left() + 6.0, chip.center().y - text_galley.size().y / 2.0),
                text_galley.clone(),
                Color32::TRANSPARENT,
            );
            chip_painter.galley(
                Pos2::new(
                    chip.left() + 10.0 + text_galley.size().x,
                    chip.center().y - date_galley.size().y / 2.0,
                ),
                date_galley,
                Color32::TRANSPARENT,
            );

            let chip_resp = ui.interact(
                chip.union(Rect::from_center_size(icon_center, Vec2::splat(20.0))),
                ui.make_persistent_id(("expanded-step", step.id)),
                Sense::click(),
            );
            if chip_resp.clicked() {
                actions.push(TimelineAction::OpenTask(task.id));
            }
            no_drag_zones.push(chip);
        }
    }
}

/// Position of a step along its task bar, clamped to [0, 1]. Degenerate
/// ranges anchor everything at the left edge.
fn step_position_pct(step: NaiveDate, start: NaiveDate, end: NaiveDate) -> f32 {
    let total = (end - start).num_days();
    if total <= 0 {
        return 0.0;
    }
    let elapsed = (step - start).num_days() as f32;
    (elapsed / total as f32).clamp(0.0, 1.0)
}

#[allow(clippy::too_many_arguments)]
fn draw_sidebar(
    ui: &mut Ui,
    painter: &egui::Painter,
    state: &AppState,
    rows: &[GroupedRow<'_>],
    slots: &[crate::timeline::rows::RowSlot],
    clip: Rect,
    body_top: f32,
    actions: &mut Vec<TimelineAction>,
) {
    let left = clip.left();

    for (row, slot) in rows.iter().zip(slots.iter()) {
        let row_y = body_top + slot.y;
        match row {
            GroupedRow::Header(header) => {
                let bg = if header.depth == 0 {
                    theme::BG_GROUP_HEADER
                } else {
                    theme::BG_GROUP_SUBHEADER
                };
                let cell = Rect::from_min_size(
                    Pos2::new(left, row_y),
                    Vec2::new(SIDEBAR_WIDTH, GROUP_HEADER_HEIGHT),
                );
                painter.rect_filled(cell, 0.0, bg);

                let mut text_x = left + 12.0 + header.depth as f32 * 16.0;
                if let Some(color) = header.color {
                    painter.circle_filled(Pos2::new(text_x + 4.0, cell.center().y), 4.0, color);
                    text_x += 14.0;
                }
                painter.text(
                    Pos2::new(text_x, cell.center().y),
                    egui::Align2::LEFT_CENTER,
                    format!("{} ({})", header.label, header.count),
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );
            }
            GroupedRow::Task { task, .. } => {
                let cell = Rect::from_min_size(
                    Pos2::new(left, row_y),
                    Vec2::new(SIDEBAR_WIDTH, slot.height),
                );
                painter.rect_filled(cell, 0.0, theme::BG_APP);
                painter.line_segment(
                    [
                        Pos2::new(left, row_y + slot.height),
                        Pos2::new(left + SIDEBAR_WIDTH, row_y + slot.height),
                    ],
                    Stroke::new(0.5, theme::BORDER_FAINT),
                );

                let team_color = state
                    .team(task.team_id)
                    .map(|t| parse_hex_color(&t.color))
                    .unwrap_or(theme::BAR_FALLBACK);
                painter.circle_filled(
                    Pos2::new(left + 16.0, row_y + ROW_HEIGHT / 2.0),
                    5.0,
                    team_color,
                );

                let title = if task.title.is_empty() {
                    "Sans titre"
                } else {
                    task.title.as_str()
                };
                let galley =
                    painter.layout_no_wrap(title.to_string(), theme::font_bar(), theme::TEXT_PRIMARY);
                let label_painter = painter.with_clip_rect(Rect::from_min_size(
                    Pos2::new(left + 28.0, row_y),
                    Vec2::new(SIDEBAR_WIDTH - 36.0, ROW_HEIGHT),
                ));
                label_painter.galley(
                    Pos2::new(left + 28.0, row_y + ROW_HEIGHT / 2.0 - galley.size().y / 2.0),
                    galley,
                    Color32::TRANSPARENT,
                );

                let label_rect = Rect::from_min_size(
                    Pos2::new(left, row_y),
                    Vec2::new(SIDEBAR_WIDTH, ROW_HEIGHT),
                );
                let resp = ui.interact(
                    label_rect,
                    ui.make_persistent_id(("sidebar-label", task.id)),
                    Sense::click(),
                );
                if resp.on_hover_text(&task.title).clicked() {
                    actions.push(TimelineAction::OpenTask(task.id));
                }
            }
        }
    }

    // Right edge of the sticky sidebar.
    painter.line_segment(
        [
            Pos2::new(left + SIDEBAR_WIDTH, body_top),
            Pos2::new(left + SIDEBAR_WIDTH, clip.bottom()),
        ],
        Stroke::new(1.0, theme::BORDER),
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_header(
    ui: &mut Ui,
    painter: &egui::Painter,
    state: &AppState,
    view: &TimelineState,
    grid: &DateGrid,
    clip: Rect,
    cols_x0: f32,
    show_days: bool,
    today: NaiveDate,
    today_visible: bool,
    today_center_x: f32,
    no_drag_zones: &mut Vec<Rect>,
    actions: &mut Vec<TimelineAction>,
) {
    let top = clip.top();
    let header_h = SPRINT_ROW_HEIGHT + MONTH_ROW_HEIGHT + if show_days { DAY_ROW_HEIGHT } else { 0.0 };
    let header_rect = Rect::from_min_size(
        Pos2::new(clip.left(), top),
        Vec2::new(clip.width(), header_h),
    );
    painter.rect_filled(header_rect, 0.0, theme::BG_HEADER);
    no_drag_zones.push(header_rect);

    let sprint_row_y = top;
    let month_row_y = top + SPRINT_ROW_HEIGHT;
    let day_row_y = month_row_y + MONTH_ROW_HEIGHT;

    // 1) Sprint chips.
    for (i, sprint) in state.sprints.iter().enumerate() {
        let x = cols_x0 + grid.x_of(sprint.start_date);
        let w = grid.width_of(sprint.start_date, sprint.end_date);
        let (bg, fg) = theme::SPRINT_CHIP_COLORS[i % theme::SPRINT_CHIP_COLORS.len()];
        let chip = Rect::from_min_size(
            Pos2::new(x, sprint_row_y + 4.0),
            Vec2::new((w - 2.0).max(0.0), SPRINT_ROW_HEIGHT - 8.0),
        );
        painter.rect_filled(chip, Rounding::same(6.0), bg);
        let chip_painter = painter.with_clip_rect(chip);
        chip_painter.text(
            chip.center(),
            egui::Align2::CENTER_CENTER,
            format!("S{}", sprint.number),
            theme::font_sub(),
            fg,
        );
        let resp = ui.interact(
            chip,
            ui.make_persistent_id(("sprint-chip", sprint.id)),
            Sense::hover(),
        );
        if resp.hovered() {
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new(("sprint-tip", sprint.id)),
                |ui| {
                    ui.strong(&sprint.name);
                    ui.label(&sprint.week_range);
                    ui.label(format!(
                        "{} → {}",
                        sprint.start_date.format("%d/%m/%Y"),
                        sprint.end_date.format("%d/%m/%Y"),
                    ));
                },
            );
        }
    }

    // 2) Month row.
    for span in grid.months() {
        let x = cols_x0 + grid.x_of(span.start);
        let w = grid.width_of(span.start, span.end);
        painter.line_segment(
            [
                Pos2::new(x + w, month_row_y),
                Pos2::new(x + w, month_row_y + MONTH_ROW_HEIGHT),
            ],
            Stroke::new(0.5, theme::BORDER_FAINT),
        );
        let month_painter = painter.with_clip_rect(Rect::from_min_size(
            Pos2::new(x.max(clip.left() + SIDEBAR_WIDTH), month_row_y),
            Vec2::new(w, MONTH_ROW_HEIGHT),
        ));
        month_painter.text(
            Pos2::new(x + w / 2.0, month_row_y + MONTH_ROW_HEIGHT / 2.0),
            egui::Align2::CENTER_CENTER,
            french_month_label(span.month),
            theme::font_header(),
            theme::TEXT_SECONDARY,
        );
    }

    // 3) Day row.
    if show_days {
        use chrono::Datelike;
        for (index, day) in grid.days().enumerate() {
            let x = cols_x0 + grid.x_of(day);
            let cell = Rect::from_min_size(
                Pos2::new(x, day_row_y),
                Vec2::new(grid.day_width, DAY_ROW_HEIGHT),
            );
            if day == today {
                painter.rect_filled(cell, 0.0, Color32::from_rgb(240, 253, 244));
            } else if grid::is_weekend(day) {
                painter.rect_filled(cell, 0.0, theme::BG_WEEKEND);
            }
            painter.line_segment(
                [
                    Pos2::new(x + grid.day_width, day_row_y),
                    Pos2::new(x + grid.day_width, day_row_y + DAY_ROW_HEIGHT),
                ],
                Stroke::new(0.5, theme::BORDER_FAINT),
            );

            if grid::show_day_label(view.zoom_level, index, day.day()) {
                let color = if day == today {
                    theme::TODAY
                } else if grid::is_weekend(day) {
                    theme::TEXT_DIM
                } else {
                    theme::TEXT_SECONDARY
                };
                painter.text(
                    cell.center(),
                    egui::Align2::CENTER_CENTER,
                    day.day().to_string(),
                    theme::font_sub(),
                    color,
                );
            }
        }
    }

    // Milestone diamonds at the bottom of the header.
    for milestone in &state.milestones {
        let x = cols_x0 + grid.x_of(milestone.date);
        let center = Pos2::new(x, top + header_h - 8.0);
        let size = 6.0;
        let points = vec![
            Pos2::new(center.x, center.y - size),
            Pos2::new(center.x + size, center.y),
            Pos2::new(center.x, center.y + size),
            Pos2::new(center.x - size, center.y),
        ];
        painter.add(egui::Shape::convex_polygon(
            points,
            theme::MILESTONE,
            Stroke::new(1.5, Color32::WHITE),
        ));

        let hit = Rect::from_center_size(center, Vec2::splat(size * 2.0 + 6.0));
        no_drag_zones.push(hit);
        let resp = ui.interact(
            hit,
            ui.make_persistent_id(("milestone", milestone.id)),
            Sense::click(),
        );
        if resp
            .on_hover_text(format!(
                "{} — {}",
                milestone.name,
                milestone.date.format("%d/%m/%Y")
            ))
            .clicked()
        {
            actions.push(TimelineAction::OpenMilestone(milestone.id));
        }
    }

    // "Today" badge under the header.
    if today_visible {
        let label = if show_days {
            today
                .format_localized("%d %b", chrono::Locale::fr_FR)
                .to_string()
        } else {
            "Aujourd'hui".to_string()
        };
        let galley = painter.layout_no_wrap(label, theme::font_small(), Color32::WHITE);
        let badge = Rect::from_center_size(
            Pos2::new(today_center_x, top + header_h - 9.0),
            galley.size() + Vec2::new(10.0, 4.0),
        );
        painter.rect_filled(badge, Rounding::same(3.0), theme::TODAY);
        painter.galley(
            badge.min + Vec2::new(5.0, 2.0),
            galley,
            Color32::TRANSPARENT,
        );
    }

    // Header bottom border.
    painter.line_segment(
        [
            Pos2::new(clip.left(), top + header_h),
            Pos2::new(clip.right(), top + header_h),
        ],
        Stroke::new(1.0, theme::BORDER),
    );

    // Sticky corner over the sidebar.
    let corner = Rect::from_min_size(
        Pos2::new(clip.left(), top),
        Vec2::new(SIDEBAR_WIDTH, header_h),
    );
    painter.rect_filled(corner, 0.0, theme::BG_HEADER);
    painter.text(
        Pos2::new(clip.left() + 12.0, top + header_h / 2.0),
        egui::Align2::LEFT_CENTER,
        "PLANNING",
        theme::font_sub(),
        theme::TEXT_DIM,
    );
    painter.line_segment(
        [
            Pos2::new(clip.left() + SIDEBAR_WIDTH, top),
            Pos2::new(clip.left() + SIDEBAR_WIDTH, top + header_h),
        ],
        Stroke::new(1.0, theme::BORDER),
    );
    painter.line_segment(
        [
            Pos2::new(clip.left(), top + header_h),
            Pos2::new(clip.left() + SIDEBAR_WIDTH, top + header_h),
        ],
        Stroke::new(1.0, theme::BORDER),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn step_position_clamps_to_bar() {
        let start = day("2025-01-10");
        let end = day("2025-01-20");
        assert_eq!(step_position_pct(day("2025-01-10"), start, end), 0.0);
        assert_eq!(step_position_pct(day("2025-01-20"), start, end), 1.0);
        assert_eq!(step_position_pct(day("2025-01-15"), start, end), 0.5);
        // Outside the range clamps; degenerate ranges pin to the left edge.
        assert_eq!(step_position_pct(day("2025-02-01"), start, end), 1.0);
        assert_eq!(step_position_pct(day("2025-01-01"), start, end), 0.0);
        assert_eq!(step_position_pct(day("2025-01-15"), end, start), 0.0);
    }

    #[test]
    fn group_by_toggle_preserves_activation_order() {
        let mut view = TimelineState::default();
        view.toggle_group_by(GroupBy::Role);
        view.toggle_group_by(GroupBy::Topic);
        assert_eq!(view.group_by, vec![GroupBy::Role, GroupBy::Topic]);
        view.toggle_group_by(GroupBy::Role);
        assert_eq!(view.group_by, vec![GroupBy::Topic]);
    }

    #[test]
    fn zoom_is_clamped_to_the_table() {
        let mut view = TimelineState::default();
        for _ in 0..20 {
            view.zoom_in();
        }
        assert_eq!(view.zoom_level, ZOOM_LEVELS.len() - 1);
        for _ in 0..20 {
            view.zoom_out();
        }
        assert_eq!(view.zoom_level, 0);
    }
}
