//! Drawing canvas component
//!
//! Shows the current composite as a texture and turns pointer drags into
//! strokes. The stroke being drawn is previewed with the egui painter and only
//! committed to the compositor when the pointer is released, so the raster
//! never holds half a stroke.

use egui::{self, Color32, ColorImage, Pos2, RichText, Sense, TextureOptions, Vec2};
use tracing::warn;

use crate::canvas::stroke;
use crate::canvas::InputMode;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;

/// Drawing canvas component
pub struct CanvasView<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> CanvasView<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        if self.state.compositor.mode() == InputMode::Overlay {
            self.show_upload_row(ui);
            ui.add_space(self.theme.spacing_sm);
        }

        let Some((width, height)) = self.state.compositor.surface_size() else {
            ui.label(
                RichText::new("Snap or upload a photo to annotate it.")
                    .color(self.theme.text_muted),
            );
            return;
        };

        self.refresh_texture(ui.ctx(), width, height);

        let size = Vec2::new(width as f32, height as f32);
        let (rect, response) = ui.allocate_exact_size(size, Sense::drag());

        if let Some(texture) = &self.state.canvas_texture {
            ui.painter().image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        ui.painter().rect_stroke(
            rect,
            2.0,
            egui::Stroke::new(1.0, self.theme.canvas_border),
        );

        // Pointer positions are window coordinates; strokes live in canvas
        // pixel coordinates.
        if response.dragged() || response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                self.state.active_stroke.push((local.x, local.y));
            }
        }
        if response.drag_stopped() {
            self.state.commit_active_stroke();
        }

        self.preview_active_stroke(ui, rect);
    }

    fn show_upload_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("📁 Upload image").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_file()
                {
                    match std::fs::read(&path) {
                        Ok(bytes) => self.state.set_base_image(&bytes),
                        Err(e) => {
                            warn!("could not read {}: {}", path.display(), e);
                            self.state.last_error =
                                Some("Could not read the selected file.".to_string());
                        }
                    }
                }
            }

            if self.state.compositor.has_base_image() {
                ui.label(
                    RichText::new("Draw on the photo to highlight the problem.")
                        .size(12.0)
                        .color(self.theme.text_muted),
                );
            }
        });
    }

    /// Rebuild the composite texture when the drawing changed
    fn refresh_texture(&mut self, ctx: &egui::Context, width: u32, height: u32) {
        if !self.state.canvas_dirty && self.state.canvas_texture.is_some() {
            return;
        }
        let Some(composite) = self.state.compositor.composite() else {
            return;
        };
        let color_image = ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            composite.as_raw(),
        );
        match &mut self.state.canvas_texture {
            Some(texture) => texture.set(color_image, TextureOptions::NEAREST),
            None => {
                self.state.canvas_texture =
                    Some(ctx.load_texture("canvas", color_image, TextureOptions::NEAREST));
            }
        }
        self.state.canvas_dirty = false;
    }

    /// Paint the uncommitted stroke on top of the texture
    fn preview_active_stroke(&self, ui: &egui::Ui, rect: egui::Rect) {
        if self.state.active_stroke.len() < 2 {
            return;
        }
        let (width, color) = match self.state.compositor.mode() {
            InputMode::Freehand => (
                stroke::FREEHAND_WIDTH,
                Color32::from_rgba_unmultiplied(
                    stroke::BLACK[0],
                    stroke::BLACK[1],
                    stroke::BLACK[2],
                    stroke::BLACK[3],
                ),
            ),
            InputMode::Overlay => (
                stroke::OVERLAY_WIDTH,
                Color32::from_rgba_unmultiplied(
                    stroke::RED[0],
                    stroke::RED[1],
                    stroke::RED[2],
                    stroke::RED[3],
                ),
            ),
        };
        let points: Vec<Pos2> = self
            .state
            .active_stroke
            .iter()
            .map(|&(x, y)| rect.min + Vec2::new(x, y))
            .collect();
        ui.painter()
            .add(egui::Shape::line(points, egui::Stroke::new(width, color)));
    }
}
