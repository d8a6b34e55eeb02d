pub mod compositor;
pub mod stroke;
pub mod surface;

pub use compositor::{Compositor, InputMode};
pub use stroke::Stroke;
pub use surface::DrawingSurface;
