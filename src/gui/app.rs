//! The main application window: live camera panel, tree info panel,
//! status line, progress bar, and the Classify/Exit controls.

use std::time::Instant;

use eframe::egui;

use crate::camera::{CameraCapture, CameraSettings, POLL_INTERVAL};
use crate::classify::{
    Classifier, ClassifyAnimation, PresetClassifier, TreeProfile, STATUS_CLASSIFYING,
    STATUS_COMPLETE, STATUS_READY,
};
use crate::gui::theme;
use crate::shutdown;

/// Settings the app is launched with, after CLI/config merging.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub camera: CameraSettings,
    /// Show the tree information side panel
    pub info_panel: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            info_panel: true,
        }
    }
}

pub struct TreeScopeApp {
    settings: AppSettings,
    /// Live capture handle; `None` when the camera failed to open
    camera: Option<CameraCapture>,
    /// Why the camera is unavailable, shown in the video panel
    camera_error: Option<String>,
    /// Texture holding the last frame shown; never read back
    video_texture: Option<egui::TextureHandle>,
    /// Capture timestamp of the frame currently on the texture
    shown_at: Option<Instant>,
    classifier: PresetClassifier,
    animation: ClassifyAnimation,
    status_line: String,
    profile: TreeProfile,
    exit_requested: bool,
}

impl TreeScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        theme::apply(&cc.egui_ctx);

        // A camera that won't open disables the video feature only; the
        // rest of the UI still runs.
        let (camera, camera_error) = match CameraCapture::open(settings.camera.clone()) {
            Ok(mut camera) => match camera.start() {
                Ok(()) => {
                    log::info!(
                        "Camera started: {} @ {} fps",
                        camera
                            .actual_resolution()
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "?".to_string()),
                        camera.actual_fps().unwrap_or(0),
                    );
                    (Some(camera), None)
                }
                Err(e) => {
                    log::error!("Camera stream failed to start: {}", e);
                    (None, Some(e.to_string()))
                }
            },
            Err(e) => {
                log::error!("Camera unavailable: {}", e);
                (None, Some(e.to_string()))
            }
        };

        Self::with_camera(settings, camera, camera_error)
    }

    fn with_camera(
        settings: AppSettings,
        camera: Option<CameraCapture>,
        camera_error: Option<String>,
    ) -> Self {
        // Seed the info panel with the first preset; the classifier then
        // cycles onward from it on each completed run.
        let mut classifier = PresetClassifier::new();
        let profile = classifier.classify(None);

        Self {
            settings,
            camera,
            camera_error,
            video_texture: None,
            shown_at: None,
            classifier,
            animation: ClassifyAnimation::new(),
            status_line: STATUS_READY.to_string(),
            profile,
            exit_requested: false,
        }
    }

    /// Upload the newest frame to the display texture, if one arrived
    /// since the last repaint. A tick without a new frame leaves the
    /// texture exactly as it was.
    fn pump_frame(&mut self, ctx: &egui::Context) {
        let Some(camera) = &self.camera else {
            return;
        };
        let Some(frame) = camera.latest_frame() else {
            return;
        };
        if self.shown_at.is_some_and(|t| frame.timestamp <= t) {
            return;
        }

        let image = egui::ColorImage::from_rgb(
            [frame.width as usize, frame.height as usize],
            &frame.data,
        );
        match &mut self.video_texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.video_texture =
                    Some(ctx.load_texture("camera-feed", image, egui::TextureOptions::LINEAR));
            }
        }
        self.shown_at = Some(frame.timestamp);
    }

    fn on_classify_pressed(&mut self) {
        if self.animation.is_running() {
            return;
        }
        self.animation.start();
        self.status_line = STATUS_CLASSIFYING.to_string();
    }

    /// Advance the progress animation one tick; on the completing tick,
    /// run the (stub) classifier against the newest frame and swap the
    /// status and profile.
    fn advance_animation(&mut self) {
        if self.animation.tick() {
            let frame = self.camera.as_ref().and_then(CameraCapture::latest_frame);
            self.profile = self.classifier.classify(frame.as_ref());
            self.status_line = STATUS_COMPLETE.to_string();
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn video_panel(&self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (rect, _) = ui.allocate_exact_size(available, egui::Sense::hover());
        ui.painter().rect_filled(rect, 4.0, egui::Color32::BLACK);

        if let Some(texture) = &self.video_texture {
            let tex_size = texture.size_vec2();
            let scale = (rect.width() / tex_size.x).min(rect.height() / tex_size.y);
            let size = tex_size * scale;
            let image_rect = egui::Rect::from_center_size(rect.center(), size);
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter()
                .image(texture.id(), image_rect, uv, egui::Color32::WHITE);
        } else {
            let message = match &self.camera_error {
                Some(error) => error.as_str(),
                None => "Waiting for camera...",
            };
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(16.0),
                egui::Color32::GRAY,
            );
        }
    }

    fn info_panel(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(theme::SURFACE)
            .inner_margin(egui::Margin::same(12.0))
            .rounding(egui::Rounding::same(5.0))
            .show(ui, |ui| {
                ui.heading("Tree information");
            });
        ui.add_space(12.0);

        for (label, value) in self.profile.facts() {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("{}:", label)).strong());
                ui.label(value);
            });
            ui.separator();
        }
    }

    fn controls_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(self.status_line.as_str()).size(18.0));
                ui.add_space(4.0);
                let bar = egui::ProgressBar::new(self.animation.fraction())
                    .desired_width(ui.available_width() * 0.6)
                    .fill(theme::PROGRESS_FILL)
                    .text(format!("{}%", self.animation.value()));
                ui.add(bar);
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui::RichText::new("Exit").size(16.0)).clicked() {
                    self.request_exit();
                }
                let classify_enabled = !self.animation.is_running();
                if ui
                    .add_enabled(
                        classify_enabled,
                        egui::Button::new(egui::RichText::new("Classify").size(16.0)),
                    )
                    .clicked()
                {
                    self.on_classify_pressed();
                }
            });
        });

        if self.exit_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for TreeScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ctrl-C lands here: close the window so shutdown runs the
        // normal on_exit path.
        if shutdown::requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.pump_frame(ctx);
        self.advance_animation();

        egui::TopBottomPanel::bottom("controls")
            .min_height(90.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.controls_panel(ui, ctx);
                ui.add_space(8.0);
            });

        if self.settings.info_panel {
            egui::SidePanel::right("tree_info")
                .min_width(280.0)
                .show(ctx, |ui| {
                    ui.add_space(8.0);
                    self.info_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.video_panel(ui);
        });

        // One poll tick, at most one texture upload per tick.
        ctx.request_repaint_after(POLL_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Stop explicitly so the device is released before the window
        // goes away; CameraCapture::stop is idempotent, so the Drop that
        // follows won't release it a second time.
        if let Some(camera) = &mut self.camera {
            camera.stop();
            log::info!("Camera released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless_app() -> TreeScopeApp {
        TreeScopeApp::with_camera(AppSettings::default(), None, None)
    }

    #[test]
    fn starts_ready_with_initial_profile() {
        let app = headless_app();
        assert_eq!(app.status_line, STATUS_READY);
        assert_eq!(app.profile, PresetClassifier::initial_profile());
        assert!(!app.animation.is_running());
    }

    #[test]
    fn classify_drives_progress_to_completion() {
        let mut app = headless_app();
        app.on_classify_pressed();
        assert_eq!(app.status_line, STATUS_CLASSIFYING);
        assert_eq!(app.animation.value(), 0);

        let mut last = 0;
        for _ in 0..200 {
            app.advance_animation();
            assert!(app.animation.value() >= last);
            last = app.animation.value();
            if !app.animation.is_running() {
                break;
            }
        }

        assert_eq!(app.animation.value(), 100);
        assert_eq!(app.status_line, STATUS_COMPLETE);
    }

    #[test]
    fn classify_press_is_ignored_while_running() {
        let mut app = headless_app();
        app.on_classify_pressed();
        app.advance_animation();
        let mid = app.animation.value();
        app.on_classify_pressed();
        assert_eq!(app.animation.value(), mid);
        assert_eq!(app.status_line, STATUS_CLASSIFYING);
    }

    #[test]
    fn completion_swaps_the_profile() {
        let mut app = headless_app();
        let before = app.profile.clone();
        app.on_classify_pressed();
        while app.animation.is_running() {
            app.advance_animation();
        }
        // The preset classifier cycles, so a run always lands somewhere.
        assert_eq!(app.status_line, STATUS_COMPLETE);
        assert_ne!(app.profile, before);
    }

    #[test]
    fn exit_request_latches() {
        let mut app = headless_app();
        assert!(!app.exit_requested);
        app.request_exit();
        assert!(app.exit_requested);
    }

    #[test]
    fn ticks_without_camera_are_harmless() {
        let mut app = headless_app();
        for _ in 0..10 {
            app.advance_animation();
        }
        assert_eq!(app.status_line, STATUS_READY);
        assert!(app.video_texture.is_none());
    }
}
