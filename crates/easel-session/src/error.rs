//! Error types for the editing session.

use easel_core::{DecodeError, EncodeError};
use thiserror::Error;

/// Errors surfaced by session operations other than export.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The source bytes could not be decoded. Fatal to the load operation;
    /// the session (if any) is left unchanged.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An action was attempted in a mode that does not allow it. Callers use
    /// this to disable the affordance; it is not a user-facing failure and
    /// the session state is guaranteed unchanged.
    #[error("{action} is not allowed while {mode}")]
    Guard {
        action: &'static str,
        mode: &'static str,
    },
}

/// Errors surfaced by the export pipeline.
///
/// All variants leave the session in its last stable mode with title,
/// description and image intact, so the user may correct and retry.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The trimmed title is empty.
    #[error("Title must not be empty")]
    EmptyTitle,

    /// No render surface exists to encode.
    #[error("Render surface is not ready")]
    SurfaceNotReady,

    /// Export was requested while the session was not in viewing mode.
    #[error("Export is not available while {0}")]
    Busy(&'static str),

    /// Compression failed during export.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
