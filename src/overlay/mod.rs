//! Overlay Presentation Layer
//!
//! Renders the most recently recognized text as a bottom-centered card over a
//! plain backdrop. The card stays hidden until the first non-blank result and
//! thereafter always shows the latest one.

use std::time::Duration;

use anyhow::Result;
use egui::{Align2, Color32, FontId, RichText, Rounding, Vec2};

use crate::shared::DisplayState;

/// Overlay configuration
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Card background opacity (0.0 - 1.0)
    pub opacity: f32,
    /// Text size in points
    pub font_size: f32,
    /// Maximum card width in pixels
    pub max_width: f32,
    /// Distance from the bottom edge in pixels
    pub margin: f32,
    /// Window title
    pub window_title: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opacity: 0.67,
            font_size: 16.0,
            max_width: 350.0,
            margin: 16.0,
            window_title: "SmartLens".to_string(),
        }
    }
}

/// Whether the text card should be drawn at all.
fn card_visible(text: &str) -> bool {
    !text.trim().is_empty()
}

/// The overlay window application
pub struct OverlayApp {
    display: DisplayState,
    config: OverlayConfig,
}

impl OverlayApp {
    pub fn new(display: DisplayState, config: OverlayConfig) -> Self {
        Self { display, config }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Backdrop. The live camera preview is outside this crate's scope;
        // the card floats over a plain dark panel instead.
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_gray(12)))
            .show(ctx, |_ui| {});

        let text = self.display.text();
        if card_visible(&text) {
            draw_text_card(ctx, &self.config, &text);
        }

        // Poll for newly published text.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Draw the recognized-text card, anchored bottom center.
fn draw_text_card(ctx: &egui::Context, config: &OverlayConfig, text: &str) {
    let card_bg =
        Color32::from_rgba_unmultiplied(0, 0, 0, (config.opacity.clamp(0.0, 1.0) * 255.0) as u8);

    egui::Area::new(egui::Id::new("recognized_text"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -config.margin))
        .show(ctx, |ui| {
            ui.set_max_width(config.max_width);
            egui::Frame::none()
                .fill(card_bg)
                .rounding(Rounding::same(12.0))
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(text)
                            .color(Color32::WHITE)
                            .font(FontId::proportional(config.font_size))
                            .strong(),
                    );
                });
        });
}

/// Run the overlay window (blocking) until it is closed.
pub fn run_overlay(display: DisplayState, config: OverlayConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_title(config.window_title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        "smartlens",
        options,
        Box::new(move |_cc| Ok(Box::new(OverlayApp::new(display, config)))),
    )
    .map_err(|err| anyhow::anyhow!("overlay failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_hidden_until_first_recognition() {
        assert!(!card_visible(""));
        assert!(!card_visible("   \n"));
        assert!(card_visible("Stop"));
    }

    #[test]
    fn test_default_overlay_config() {
        let config = OverlayConfig::default();
        assert!((config.opacity - 0.67).abs() < 0.01);
        assert!((config.font_size - 16.0).abs() < f32::EPSILON);
        assert!((config.max_width - 350.0).abs() < f32::EPSILON);
        assert_eq!(config.window_title, "SmartLens");
    }
}
