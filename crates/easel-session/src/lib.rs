//! Easel Session - the stateful editing session for the gallery engine
//!
//! This crate drives `easel-core`'s pixel operations through one explicit
//! mode machine: a session opens from picked file bytes, applies rotate/
//! flip/crop edits, carries title/description metadata, and exports a JPEG
//! blob plus metadata as an [`ExportRecord`] for the gallery collaborator.
//!
//! # Module Structure
//!
//! - `session` - the [`EditSession`] mode machine and its guards
//! - `surface` - the displayed pixel buffer
//! - `export` - export record assembly
//! - `metadata` - title/description handling
//! - `handle` - scoped display-handle lifetimes
//! - `config` - tunable parameters and fixed constants

mod config;
mod error;
mod export;
mod handle;
mod metadata;
mod session;
mod surface;

pub use config::{SessionConfig, DESCRIPTION_MAX_LEN, EXPORT_JPEG_QUALITY};
pub use error::{ExportError, SessionError};
pub use export::ExportRecord;
pub use handle::{DisplayHandle, HandleStore};
pub use metadata::{title_from_filename, SessionMetadata};
pub use session::{CropOutcome, EditSession, Mode};
pub use surface::RenderSurface;

// Re-export the core value types session callers handle directly
pub use easel_core::{Bitmap, CropRegion, DecodeError, EncodeError, TransformState};

use easel_core::decode_image;

/// Decode picked bytes into a source bitmap.
///
/// This is the session's decode suspension point; the work itself runs
/// inline on the calling task, matching the engine's single-threaded
/// cooperative model.
pub(crate) async fn decode_source(bytes: &[u8], mime_type: &str) -> Result<Bitmap, DecodeError> {
    decode_image(bytes, mime_type)
}
