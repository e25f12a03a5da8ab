//! Crop region mapping from display percentages to natural pixels.
//!
//! The selection rectangle is expressed in percentages of the *displayed*
//! image. On commit the percentages are converted to displayed pixels and
//! then to natural pixels with `scale = natural / displayed`, independently
//! per axis, so a preview shown at half size still crops the full-resolution
//! source.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner, (100, 100) = bottom-right corner
//! - width/height are percentages of the displayed dimensions

use serde::{Deserialize, Serialize};

use crate::decode::Bitmap;

/// A selection rectangle in percentages of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge, percent of displayed width.
    pub x_percent: f64,
    /// Top edge, percent of displayed height.
    pub y_percent: f64,
    /// Width, percent of displayed width.
    pub width_percent: f64,
    /// Height, percent of displayed height.
    pub height_percent: f64,
}

impl CropRegion {
    pub fn new(x_percent: f64, y_percent: f64, width_percent: f64, height_percent: f64) -> Self {
        Self {
            x_percent,
            y_percent,
            width_percent,
            height_percent,
        }
    }

    /// The default selection proposed when crop mode is entered: a centered
    /// region spanning 90% of the displayed width.
    ///
    /// Without an aspect ratio the region is a centered 90% box. With one,
    /// the height derives from the width; if that overflows the displayed
    /// height the region is re-fitted against the height instead, then
    /// centered.
    pub fn centered_default(display_w: u32, display_h: u32, aspect_ratio: Option<f64>) -> Self {
        let (mut width_pct, mut height_pct) = (90.0, 90.0);

        if let Some(aspect) = aspect_ratio {
            let width_px = 0.9 * display_w as f64;
            let height_px = width_px / aspect;
            height_pct = height_px / display_h as f64 * 100.0;

            if height_pct > 100.0 {
                height_pct = 100.0;
                let width_px = display_h as f64 * aspect;
                width_pct = width_px / display_w as f64 * 100.0;
            }
        }

        Self {
            x_percent: (100.0 - width_pct) / 2.0,
            y_percent: (100.0 - height_pct) / 2.0,
            width_percent: width_pct,
            height_percent: height_pct,
        }
    }

    /// Whether this region may be committed: it must lie within [0, 100] on
    /// both axes and have positive width and height.
    pub fn is_valid(&self) -> bool {
        self.x_percent >= 0.0
            && self.y_percent >= 0.0
            && self.width_percent > 0.0
            && self.height_percent > 0.0
            && self.x_percent + self.width_percent <= 100.0
            && self.y_percent + self.height_percent <= 100.0
    }
}

/// Extract the natural-pixel rectangle a [`CropRegion`] selects.
///
/// `display_w`/`display_h` are the dimensions at which the source was shown
/// when the region was drawn. Percentages convert to displayed pixels, then
/// to natural pixels with an independent scale per axis. Coordinates are
/// clamped to the source bounds and the output is never smaller than 1x1.
pub fn crop_to_natural(
    source: &Bitmap,
    region: &CropRegion,
    display_w: u32,
    display_h: u32,
) -> Bitmap {
    let scale_x = source.width as f64 / display_w as f64;
    let scale_y = source.height as f64 / display_h as f64;

    let px_left = (region.x_percent / 100.0 * display_w as f64 * scale_x).round() as i64;
    let px_top = (region.y_percent / 100.0 * display_h as f64 * scale_y).round() as i64;
    let px_width = (region.width_percent / 100.0 * display_w as f64 * scale_x).round() as i64;
    let px_height = (region.height_percent / 100.0 * display_h as f64 * scale_y).round() as i64;

    // Clamp to source bounds
    let px_left = px_left.clamp(0, source.width.saturating_sub(1) as i64) as u32;
    let px_top = px_top.clamp(0, source.height.saturating_sub(1) as i64) as u32;
    let px_right = ((px_left as i64 + px_width.max(0)) as u32).min(source.width);
    let px_bottom = ((px_top as i64 + px_height.max(0)) as u32).min(source.height);

    // Ensure minimum dimensions
    let out_width = px_right.saturating_sub(px_left).max(1);
    let out_height = px_bottom.saturating_sub(px_top).max(1);

    let mut output = vec![0u8; (out_width * out_height * 3) as usize];

    // Copy pixel rows out of the source rectangle
    for y in 0..out_height {
        let src_y = px_top + y;
        let src_start = ((src_y * source.width + px_left) * 3) as usize;
        let src_end = src_start + (out_width * 3) as usize;
        let dst_start = (y * out_width * 3) as usize;
        let dst_end = dst_start + (out_width * 3) as usize;

        output[dst_start..dst_end].copy_from_slice(&source.pixels[src_start..src_end]);
    }

    Bitmap::new(out_width, out_height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
