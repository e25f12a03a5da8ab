//! Easel Core - pixel operations for the gallery editing engine
//!
//! This crate provides the stateless building blocks of the editor: raster
//! decoding with EXIF orientation handling, the rotate/flip compositing math,
//! crop coordinate mapping from display percentages to natural pixels, and
//! JPEG export encoding. Session state (modes, guards, metadata, resource
//! handles) lives in `easel-session`.

pub mod decode;
pub mod encode;
pub mod transform;

pub use decode::{decode_image, Bitmap, DecodeError, Orientation};
pub use encode::{encode_jpeg, EncodeError};
pub use transform::{crop_to_natural, render_transformed, CropRegion, TransformState};
