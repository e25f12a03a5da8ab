//! Export record assembly.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use easel_core::encode_jpeg;

use crate::config::EXPORT_JPEG_QUALITY;
use crate::error::ExportError;
use crate::surface::RenderSurface;

/// The packaged output handed to the gallery collaborator.
///
/// Created only on successful export and immutable afterwards; the engine
/// keeps no copy.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    /// JPEG-compressed image bytes.
    pub blob: Vec<u8>,
    /// Always `image/jpeg`.
    pub mime_type: String,
    /// Trimmed title plus the `.jpg` extension.
    pub filename: String,
    /// Trimmed title.
    pub title: String,
    /// Trimmed description.
    pub description: String,
    /// ISO-8601 timestamp with millisecond precision, UTC.
    pub timestamp: String,
}

/// Encode the surface and assemble the record.
///
/// The caller has already validated the title as non-empty after trimming
/// and established that a surface exists.
pub(crate) fn build_record(
    surface: &RenderSurface,
    title: &str,
    description: &str,
) -> Result<ExportRecord, ExportError> {
    let title = title.trim();
    debug_assert!(!title.is_empty(), "caller validates the title");

    let blob = encode_jpeg(surface.bitmap(), EXPORT_JPEG_QUALITY)?;

    Ok(ExportRecord {
        blob,
        mime_type: "image/jpeg".to_string(),
        filename: format!("{title}.jpg"),
        title: title.to_string(),
        description: description.trim().to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
