//! Raster decoding with EXIF orientation handling.
//!
//! Input arrives from the file-picker collaborator as raw bytes plus the
//! declared mime type. Any raster format the `image` crate recognizes is
//! accepted as long as the declared type is `image/*`; the actual format is
//! sniffed from the bytes, not trusted from the declaration.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{Bitmap, DecodeError, Orientation};

/// Decode raster bytes into a [`Bitmap`], applying EXIF orientation.
///
/// # Arguments
///
/// * `bytes` - Raw image file bytes
/// * `mime_type` - The declared mime type; must be an `image/*` type
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedMimeType` for non-image declarations,
/// `DecodeError::InvalidFormat` if the bytes are not a recognizable raster
/// format, and `DecodeError::CorruptedData` for truncated or damaged data.
pub fn decode_image(bytes: &[u8], mime_type: &str) -> Result<Bitmap, DecodeError> {
    if !mime_type.starts_with("image/") {
        return Err(DecodeError::UnsupportedMimeType(mime_type.to_string()));
    }

    // Extract EXIF orientation before decoding; cameras commonly store
    // sideways pixels plus an orientation tag.
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedData(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedData(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    Ok(Bitmap::from_rgb_image(oriented.into_rgb8()))
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => {
            if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
                if let Some(value) = field.value.get_uint(0) {
                    return Orientation::from(value);
                }
            }
            Orientation::Normal
        }
        Err(_) => Orientation::Normal,
    }
}

/// Apply an EXIF orientation transformation to a decoded image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
