//! Stroke input type
//!
//! One continuous drawn input event: the point trail plus width and color.

/// Default stroke width on the blank freehand canvas
pub const FREEHAND_WIDTH: f32 = 10.0;
/// Default stroke width for annotating a photo
pub const OVERLAY_WIDTH: f32 = 5.0;

/// Opaque black, the freehand pen color
pub const BLACK: [u8; 4] = [0, 0, 0, 255];
/// Opaque red, the photo annotation color
pub const RED: [u8; 4] = [255, 0, 0, 255];

/// A single continuous stroke in canvas pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Point trail in draw order
    pub points: Vec<(f32, f32)>,
    /// Stroke width in pixels
    pub width: f32,
    /// RGBA color
    pub color: [u8; 4],
}

impl Stroke {
    pub fn new(points: Vec<(f32, f32)>, width: f32, color: [u8; 4]) -> Self {
        Self {
            points,
            width,
            color,
        }
    }

    /// Freehand pen stroke (black, default width)
    pub fn freehand(points: Vec<(f32, f32)>) -> Self {
        Self::new(points, FREEHAND_WIDTH, BLACK)
    }

    /// Photo annotation stroke (red, thinner)
    pub fn annotation(points: Vec<(f32, f32)>) -> Self {
        Self::new(points, OVERLAY_WIDTH, RED)
    }

    /// A stroke with no points rasterizes to nothing
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
