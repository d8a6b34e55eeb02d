//! Drawing/image compositor
//!
//! Owns the current input image: either a free-hand raster drawn on a blank
//! canvas, or an uploaded/captured photo with an annotation layer on top.
//! [`Compositor::composite`] flattens the active input into a single opaque
//! image ready for submission; it never mutates stored state, so the caller
//! gets a value snapshot that later edits cannot touch.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::canvas::stroke::Stroke;
use crate::canvas::surface::DrawingSurface;
use crate::{Result, SketchSolveError};

/// Fixed freehand canvas width, matching the classic 400x400 scratch pad
pub const CANVAS_WIDTH: u32 = 400;
/// Fixed freehand canvas height
pub const CANVAS_HEIGHT: u32 = 400;

/// Which input source is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Draw on a blank white canvas
    #[default]
    Freehand,
    /// Annotate an uploaded or captured photo
    Overlay,
}

/// Two-mode input state plus the flattening logic
#[derive(Clone, Debug)]
pub struct Compositor {
    mode: InputMode,
    freehand: DrawingSurface,
    base: Option<RgbaImage>,
    overlay: Option<DrawingSurface>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            mode: InputMode::Freehand,
            freehand: DrawingSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            base: None,
            overlay: None,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch the input mode
    ///
    /// Always legal. Switching away from a mode discards its in-progress
    /// image so nothing bleeds through when the user comes back.
    pub fn select_mode(&mut self, mode: InputMode) {
        if mode == self.mode {
            return;
        }
        match self.mode {
            InputMode::Freehand => self.freehand.clear(),
            InputMode::Overlay => {
                self.base = None;
                self.overlay = None;
            }
        }
        debug!("input mode switched to {:?}", mode);
        self.mode = mode;
    }

    /// Decode an uploaded or captured photo and make it the overlay base
    ///
    /// On a decode failure the prior base image (if any) is retained and the
    /// annotation layer is untouched. On success the annotation layer is
    /// reset blank at the new image's dimensions.
    pub fn set_base_image(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| SketchSolveError::DecodeError(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        debug!("base image set: {}x{}", rgba.width(), rgba.height());
        self.overlay = Some(DrawingSurface::new(rgba.width(), rgba.height()));
        self.base = Some(rgba);
        Ok(())
    }

    pub fn has_base_image(&self) -> bool {
        self.base.is_some()
    }

    pub fn base_image(&self) -> Option<&RgbaImage> {
        self.base.as_ref()
    }

    /// Dimensions of the active drawing surface, if one exists
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        match self.mode {
            InputMode::Freehand => Some((self.freehand.width(), self.freehand.height())),
            InputMode::Overlay => self.overlay.as_ref().map(|s| (s.width(), s.height())),
        }
    }

    /// Append a stroke to the active drawing surface
    ///
    /// Purely additive and infallible. In overlay mode with no base image
    /// there is no surface yet, so the stroke is dropped.
    pub fn apply_stroke(&mut self, stroke: &Stroke) {
        match self.mode {
            InputMode::Freehand => self.freehand.apply_stroke(stroke),
            InputMode::Overlay => match &mut self.overlay {
                Some(surface) => surface.apply_stroke(stroke),
                None => debug!("stroke ignored: no base image in overlay mode"),
            },
        }
    }

    /// Blank the active drawing surface; the base image is untouched
    pub fn clear(&mut self) {
        match self.mode {
            InputMode::Freehand => self.freehand.clear(),
            InputMode::Overlay => {
                if let Some(surface) = &mut self.overlay {
                    surface.clear();
                }
            }
        }
    }

    /// Flatten the active input into a single opaque image
    ///
    /// Freehand: the stroke layer over an opaque white canvas. Overlay: the
    /// annotation layer source-over the base photo, or `None` while no photo
    /// has been supplied. Idempotent on re-query.
    pub fn composite(&self) -> Option<RgbaImage> {
        match self.mode {
            InputMode::Freehand => {
                let mut out = RgbaImage::from_pixel(
                    self.freehand.width(),
                    self.freehand.height(),
                    image::Rgba([255, 255, 255, 255]),
                );
                blend_over(&mut out, &self.freehand.to_rgba());
                Some(out)
            }
            InputMode::Overlay => {
                let base = self.base.as_ref()?;
                let mut out = base.clone();
                for px in out.pixels_mut() {
                    px.0[3] = 255;
                }
                if let Some(surface) = &self.overlay {
                    blend_over(&mut out, &surface.to_rgba());
                }
                Some(out)
            }
        }
    }

    /// Encode the current composite as PNG bytes for submission
    ///
    /// Returns `None` when there is nothing to submit (overlay mode without a
    /// base image). The encoded bytes are the value snapshot handed to the AI
    /// request pipeline.
    pub fn composite_png(&self) -> Option<Result<Vec<u8>>> {
        let composite = self.composite()?;
        let mut bytes = Cursor::new(Vec::new());
        Some(
            composite
                .write_to(&mut bytes, ImageFormat::Png)
                .map(|_| bytes.into_inner())
                .map_err(|e| SketchSolveError::DecodeError(e.to_string())),
        )
    }
}

/// Source-over blend of a straight-alpha layer onto an opaque background
///
/// Per pixel: `out = a * layer + (1 - a) * dst`, output alpha forced opaque.
/// Dimensions must match; the compositor guarantees this by sizing surfaces
/// to their background.
fn blend_over(dst: &mut RgbaImage, layer: &RgbaImage) {
    debug_assert_eq!(dst.dimensions(), layer.dimensions());
    for (dst_px, src_px) in dst.pixels_mut().zip(layer.pixels()) {
        let a = src_px.0[3] as u32;
        if a == 0 {
            dst_px.0[3] = 255;
            continue;
        }
        for c in 0..3 {
            let s = src_px.0[c] as u32;
            let d = dst_px.0[c] as u32;
            dst_px.0[c] = ((a * s + (255 - a) * d + 127) / 255) as u8;
        }
        dst_px.0[3] = 255;
    }
}
