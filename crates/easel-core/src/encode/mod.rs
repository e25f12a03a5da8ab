//! Image encoding for export serialization.
//!
//! The editing session renders to a fixed-size surface and exports it as a
//! compressed JPEG blob. All operations are synchronous; the session layer
//! decides where the suspension points are.

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError};
