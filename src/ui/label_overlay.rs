//! Floating caption for the hovered plaque

use crate::scene::LabelOverlay;

const CAPTION_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 179);

/// Draws a `LabelOverlay` as an egui area with its top-left corner at the
/// overlay position
#[derive(Debug, Default)]
pub struct LabelOverlayView;

impl LabelOverlayView {
    pub fn new() -> Self {
        Self
    }

    /// Show the caption if the overlay is visible.
    ///
    /// Overlay coordinates are physical pixels; egui works in points.
    pub fn show(&self, ctx: &egui::Context, overlay: &LabelOverlay) {
        if !overlay.visible {
            return;
        }
        let pixels_per_point = ctx.pixels_per_point();
        let pos = caption_position(overlay, pixels_per_point);

        egui::Area::new(egui::Id::new("plaque_caption"))
            .order(egui::Order::Foreground)
            .fixed_pos(pos)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(CAPTION_FILL)
                    .inner_margin(egui::Margin::same(5))
                    .corner_radius(egui::CornerRadius::same(5))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&overlay.text).color(egui::Color32::WHITE));
                    });
            });
    }
}

/// Overlay position converted to egui points
pub fn caption_position(overlay: &LabelOverlay, pixels_per_point: f32) -> egui::Pos2 {
    let scale = if pixels_per_point > 0.0 { pixels_per_point } else { 1.0 };
    egui::pos2(overlay.screen_x / scale, overlay.screen_y / scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(x: f32, y: f32) -> LabelOverlay {
        LabelOverlay {
            visible: true,
            text: "Federico D’Orazio: O".to_string(),
            screen_x: x,
            screen_y: y,
        }
    }

    #[test]
    fn test_caption_position_uses_points() {
        assert_eq!(caption_position(&overlay(400.0, 300.0), 2.0), egui::pos2(200.0, 150.0));
        assert_eq!(caption_position(&overlay(400.0, 300.0), 1.0), egui::pos2(400.0, 300.0));
    }

    #[test]
    fn test_invalid_scale_falls_back_to_pixels() {
        assert_eq!(caption_position(&overlay(10.0, 20.0), 0.0), egui::pos2(10.0, 20.0));
    }
}
