//! The render surface: the pixel buffer the user is looking at.

use easel_core::{render_transformed, Bitmap, TransformState};

/// The displayed pixel buffer, derived from the source bitmap and the
/// current transform state.
///
/// The surface keeps the source dimensions regardless of rotation; see
/// `easel_core::transform` for the resulting clipping behavior. The session
/// suspends rendering while a crop selection is active, so the surface may
/// lag the transform state until crop mode ends.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    bitmap: Bitmap,
}

impl RenderSurface {
    /// Initialize the surface from a freshly loaded source.
    pub fn new(source: &Bitmap) -> Self {
        Self {
            bitmap: source.clone(),
        }
    }

    /// Re-composite the source with the given transform state.
    pub fn render(&mut self, source: &Bitmap, state: &TransformState) {
        self.bitmap = render_transformed(source, state);
    }

    /// The composited pixels currently on display.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}
