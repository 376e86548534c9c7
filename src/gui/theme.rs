//! Dark theme for the app, lifted from the palette of the capture
//! preview it replaces.

use eframe::egui;

/// Window background.
pub const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0x0C, 0x20, 0x29);
/// Panel and button surfaces.
pub const SURFACE: egui::Color32 = egui::Color32::from_rgb(0x18, 0x37, 0x49);
/// Progress bar trough.
pub const TROUGH: egui::Color32 = egui::Color32::from_rgb(0x40, 0x5B, 0x66);
/// Progress bar fill.
pub const PROGRESS_FILL: egui::Color32 = egui::Color32::from_rgb(0xD9, 0x32, 0x0D);
/// Hovered control surface.
pub const HOVER: egui::Color32 = egui::Color32::from_rgb(0xD1, 0xE3, 0xE8);

/// Apply the theme to the egui context. Called once at startup.
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(egui::Color32::WHITE);
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = BACKGROUND;
    visuals.extreme_bg_color = TROUGH;
    visuals.widgets.inactive.weak_bg_fill = SURFACE;
    visuals.widgets.active.weak_bg_fill = SURFACE;
    visuals.widgets.hovered.weak_bg_fill = HOVER;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    visuals.selection.bg_fill = PROGRESS_FILL;
    ctx.set_visuals(visuals);
}
