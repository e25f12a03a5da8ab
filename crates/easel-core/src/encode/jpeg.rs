//! JPEG encoding for export.
//!
//! The export pipeline hands the rendered surface here to produce the
//! compressed blob stored in the gallery. Quality is configurable at this
//! layer; the session pins it to the export default.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::Bitmap;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer length doesn't match the bitmap dimensions
    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidPixelBuffer { expected: usize, actual: usize },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a bitmap to JPEG bytes.
///
/// `quality` is clamped to 1-100; the gallery export uses 95 (the engine's
/// rendition of the original 0.95 canvas quality factor).
pub fn encode_jpeg(bitmap: &Bitmap, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if bitmap.width == 0 || bitmap.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: bitmap.width,
            height: bitmap.height,
        });
    }

    let expected = (bitmap.width as usize) * (bitmap.height as usize) * 3;
    if bitmap.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelBuffer {
            expected,
            actual: bitmap.pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(
            &bitmap.pixels,
            bitmap.width,
            bitmap.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
