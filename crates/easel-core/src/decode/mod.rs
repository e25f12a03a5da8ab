//! Image decoding for the editing engine.
//!
//! The engine receives raw file bytes plus a declared mime type from the
//! file-picker collaborator and turns them into a [`Bitmap`] ready for
//! transform and crop operations. EXIF orientation is normalized here so the
//! rest of the pipeline always sees upright pixels.

mod reader;
mod types;

pub use reader::decode_image;
pub use types::{Bitmap, DecodeError, Orientation};
