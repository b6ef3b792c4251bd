use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_APP: Color32 = Color32::from_rgb(255, 255, 255);
pub const BG_PANEL: Color32 = Color32::from_rgb(249, 250, 251);
pub const BG_HEADER: Color32 = Color32::from_rgb(255, 255, 255);
pub const BG_GROUP_HEADER: Color32 = Color32::from_rgb(243, 244, 246);
pub const BG_GROUP_SUBHEADER: Color32 = Color32::from_rgb(248, 249, 250);
pub const BG_ROW_HOVER: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 6);
pub const BG_WEEKEND: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 8);
pub const BG_SPRINT_BAND: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 5);

pub const BORDER: Color32 = Color32::from_rgb(229, 231, 235);
pub const BORDER_FAINT: Color32 = Color32::from_rgb(243, 244, 246);
pub const ACCENT: Color32 = Color32::from_rgb(37, 99, 235);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(31, 41, 55);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(107, 114, 128);
pub const TEXT_DIM: Color32 = Color32::from_rgb(156, 163, 175);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 235);

pub const TODAY: Color32 = Color32::from_rgb(22, 163, 74);
pub const MILESTONE: Color32 = Color32::from_rgb(239, 68, 68);
pub const MILESTONE_LINE: Color32 = Color32::from_rgba_premultiplied(239, 68, 68, 110);
pub const GRID_LINE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 10);
pub const PROGRESS_OVERLAY: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 38);
pub const BAR_FALLBACK: Color32 = Color32::from_rgb(148, 163, 184);

/// Rotating tints for sprint chips: (background, text).
pub const SPRINT_CHIP_COLORS: &[(Color32, Color32)] = &[
    (Color32::from_rgb(219, 234, 254), Color32::from_rgb(29, 78, 216)),
    (Color32::from_rgb(224, 231, 255), Color32::from_rgb(67, 56, 202)),
    (Color32::from_rgb(237, 233, 254), Color32::from_rgb(109, 40, 217)),
];

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const BAR_ROUNDING: f32 = 5.0;
pub const TODAY_LINE_WIDTH: f32 = 3.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::light();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_APP;
    visuals.extreme_bg_color = Color32::from_rgb(243, 244, 246); // TextEdit bg
    visuals.faint_bg_color = BG_GROUP_SUBHEADER;

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(243, 244, 246);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(229, 231, 235);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(219, 234, 254);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(1.5, TEXT_PRIMARY);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.widgets.open.bg_fill = Color32::from_rgb(239, 246, 255);
    visuals.widgets.open.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.open.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.open.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = Color32::from_rgba_premultiplied(37, 99, 235, 40);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER);
    visuals.striped = false;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
