//! Rotation/flip state and the fixed-canvas composite.
//!
//! # Composition order
//!
//! `render_transformed` reproduces the editor's drawing order: translate to
//! the canvas center, rotate by the current multiple of 90 degrees, mirror
//! for the flip flags, then draw the source centered.
//!
//! # Known limitation
//!
//! The output buffer always has the **same width and height as the source**;
//! the canvas is not resized when the rotation swaps the image axes. A 90 or
//! 270 degree rotation of a non-square source therefore clips content that
//! falls outside the original bounding box, and uncovered canvas area is
//! filled with black. This is intentional display behavior, not a bug to
//! correct here.

use serde::{Deserialize, Serialize};

use crate::decode::Bitmap;

/// The rotation/flip configuration applied when rendering a source bitmap.
///
/// Rotation is always a multiple of 90, normalized into [0, 360). The state
/// is owned by the editing session and reset to defaults whenever the source
/// bitmap is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformState {
    /// Clockwise rotation in degrees: 0, 90, 180, or 270.
    pub rotation_degrees: u16,
    /// Mirror across the vertical axis.
    pub flip_horizontal: bool,
    /// Mirror across the horizontal axis.
    pub flip_vertical: bool,
}

impl TransformState {
    /// Create a new identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the rotation by 90 degrees clockwise, wrapping at 360.
    pub fn rotate_cw(&mut self) {
        self.rotation_degrees = (self.rotation_degrees + 90) % 360;
    }

    /// Toggle the horizontal mirror flag.
    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    /// Toggle the vertical mirror flag.
    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    /// Check if rendering with this state is a no-op.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Composite a source bitmap and a transform state into a display buffer.
///
/// The output has the same dimensions as the source (see the module notes on
/// clipping). Pixels the rotated/mirrored source does not cover are black.
pub fn render_transformed(source: &Bitmap, state: &TransformState) -> Bitmap {
    // Fast path: identity transform is a straight copy
    if state.is_identity() {
        return source.clone();
    }

    let (w, h) = (source.width, source.height);
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;

    // Exact values for the four axis-aligned angles; no trig error to clamp
    let (sin, cos) = match state.rotation_degrees % 360 {
        0 => (0.0, 1.0),
        90 => (1.0, 0.0),
        180 => (0.0, -1.0),
        270 => (-1.0, 0.0),
        other => unreachable!("rotation must be a multiple of 90, got {other}"),
    };

    let mut output = vec![0u8; (w * h * 3) as usize];

    for dst_y in 0..h {
        for dst_x in 0..w {
            // Destination pixel center relative to the canvas center
            let x = dst_x as f64 + 0.5 - cx;
            let y = dst_y as f64 + 0.5 - cy;

            // Inverse rotation, then inverse mirror (mirror is its own inverse)
            let rx = x * cos + y * sin;
            let ry = -x * sin + y * cos;
            let sx = if state.flip_horizontal { -rx } else { rx };
            let sy = if state.flip_vertical { -ry } else { ry };

            let px = (sx + cx).floor();
            let py = (sy + cy).floor();

            if px >= 0.0 && px < w as f64 && py >= 0.0 && py < h as f64 {
                let rgb = source.rgb_at(px as u32, py as u32);
                let dst_idx = ((dst_y * w + dst_x) * 3) as usize;
                output[dst_idx] = rgb[0];
                output[dst_idx + 1] = rgb[1];
                output[dst_idx + 2] = rgb[2];
            }
            // Out-of-bounds source stays black (cleared canvas)
        }
    }

    Bitmap::new(w, h, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=40, 1u32..=40)
    }

    fn state_strategy() -> impl Strategy<Value = TransformState> {
        (0u16..4, any::<bool>(), any::<bool>()).prop_map(|(r, fh, fv)| TransformState {
            rotation_degrees: r * 90,
            flip_horizontal: fh,
            flip_vertical: fv,
        })
    }

    fn gradient_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    proptest! {
        /// Property: the surface is never resized by a transform.
        #[test]
        fn prop_dimensions_preserved(
            (width, height) in dimensions_strategy(),
            state in state_strategy(),
        ) {
            let bmp = gradient_bitmap(width, height);
            let rendered = render_transformed(&bmp, &state);

            prop_assert_eq!(rendered.width, width);
            prop_assert_eq!(rendered.height, height);
            prop_assert_eq!(rendered.pixels.len(), bmp.pixels.len());
        }

        /// Property: rendering is deterministic.
        #[test]
        fn prop_render_is_deterministic(
            (width, height) in dimensions_strategy(),
            state in state_strategy(),
        ) {
            let bmp = gradient_bitmap(width, height);
            let a = render_transformed(&bmp, &state);
            let b = render_transformed(&bmp, &state);
            prop_assert_eq!(a, b);
        }

        /// Property: applying the same flip twice in sequence restores the
        /// source (flips commute with themselves and are involutions).
        #[test]
        fn prop_flips_are_involutions(
            (width, height) in dimensions_strategy(),
            horizontal in any::<bool>(),
        ) {
            let bmp = gradient_bitmap(width, height);
            let state = TransformState {
                flip_horizontal: horizontal,
                flip_vertical: !horizontal,
                ..Default::default()
            };

            let twice = render_transformed(&render_transformed(&bmp, &state), &state);
            prop_assert_eq!(twice, bmp);
        }
    }
}
