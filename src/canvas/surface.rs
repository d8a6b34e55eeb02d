//! Drawing surface: the mutable RGBA stroke layer
//!
//! Strokes are rasterized into a tiny-skia [`Pixmap`] as round-capped,
//! round-joined stroked paths. The surface is transparent where nothing has
//! been drawn, so it can be flattened onto a white canvas (freehand mode) or
//! alpha-composited over a photo (overlay mode).

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke as SkStroke, Transform,
};

use super::stroke::Stroke;

/// A rectangular RGBA stroke layer with fixed dimensions
#[derive(Clone)]
pub struct DrawingSurface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl DrawingSurface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        let pixmap =
            Pixmap::new(width.max(1), height.max(1)).expect("non-zero pixmap dimensions");
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Rasterize one stroke onto the surface
    ///
    /// Purely additive; a stroke with no points is a no-op. A single-point
    /// stroke is drawn as a filled dot. Rasterization is unantialiased so a
    /// width-1 dot still covers exactly its pixel.
    pub fn apply_stroke(&mut self, stroke: &Stroke) {
        if stroke.is_empty() {
            return;
        }

        let [r, g, b, a] = stroke.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = false;

        if stroke.points.len() == 1 {
            let (x, y) = stroke.points[0];
            // Dot centered on the pixel so it survives center sampling
            let radius = (stroke.width / 2.0).max(0.5);
            if let Some(path) = PathBuilder::from_circle(x + 0.5, y + 0.5, radius) {
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
            return;
        }

        let mut pb = PathBuilder::new();
        let (x0, y0) = stroke.points[0];
        pb.move_to(x0, y0);
        for &(x, y) in &stroke.points[1..] {
            pb.line_to(x, y);
        }

        if let Some(path) = pb.finish() {
            let sk_stroke = SkStroke {
                width: stroke.width,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&path, &paint, &sk_stroke, Transform::identity(), None);
        }
    }

    /// Reset to fully transparent, dimensions unchanged
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// True if no pixel has been touched since construction or [`clear`](Self::clear)
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Copy out as a straight-alpha RGBA image
    ///
    /// tiny-skia stores premultiplied alpha; demultiply per pixel so the
    /// compositor can run standard source-over blending.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (src, dst) in self.pixmap.pixels().iter().zip(out.pixels_mut()) {
            let c = src.demultiply();
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_blank() {
        let surface = DrawingSurface::new(64, 64);
        assert_eq!(surface.width(), 64);
        assert_eq!(surface.height(), 64);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_stroke_marks_surface() {
        let mut surface = DrawingSurface::new(64, 64);
        surface.apply_stroke(&Stroke::freehand(vec![(10.0, 10.0), (40.0, 40.0)]));
        assert!(!surface.is_blank());
    }

    #[test]
    fn test_empty_stroke_is_noop() {
        let mut surface = DrawingSurface::new(64, 64);
        surface.apply_stroke(&Stroke::freehand(Vec::new()));
        assert!(surface.is_blank());
    }

    #[test]
    fn test_single_point_dot_covers_its_pixel() {
        let mut surface = DrawingSurface::new(50, 50);
        surface.apply_stroke(&Stroke::new(vec![(10.0, 10.0)], 1.0, [0, 0, 0, 255]));
        let rgba = surface.to_rgba();
        assert_eq!(rgba.get_pixel(10, 10).0, [0, 0, 0, 255]);
        // The width-1 dot must not bleed into neighbors
        assert_eq!(rgba.get_pixel(9, 10).0[3], 0);
        assert_eq!(rgba.get_pixel(11, 10).0[3], 0);
        assert_eq!(rgba.get_pixel(10, 9).0[3], 0);
        assert_eq!(rgba.get_pixel(10, 11).0[3], 0);
    }

    #[test]
    fn test_clear_keeps_dimensions() {
        let mut surface = DrawingSurface::new(30, 20);
        surface.apply_stroke(&Stroke::annotation(vec![(5.0, 5.0), (15.0, 15.0)]));
        surface.clear();
        assert!(surface.is_blank());
        assert_eq!(surface.width(), 30);
        assert_eq!(surface.height(), 20);
    }

    #[test]
    fn test_stroke_color_lands_in_rgba() {
        let mut surface = DrawingSurface::new(40, 40);
        surface.apply_stroke(&Stroke::new(
            vec![(20.0, 5.0), (20.0, 35.0)],
            6.0,
            [255, 0, 0, 255],
        ));
        let rgba = surface.to_rgba();
        assert_eq!(rgba.get_pixel(20, 20).0, [255, 0, 0, 255]);
    }
}
