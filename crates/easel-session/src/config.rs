//! Session configuration and fixed engine constants.

use serde::{Deserialize, Serialize};

/// Maximum description length in characters; longer input is truncated at
/// entry, never surfaced as an error after the fact.
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// JPEG quality used by the export pipeline (the 0.95 canvas quality factor
/// on the encoder's 1-100 scale).
pub const EXPORT_JPEG_QUALITY: u8 = 95;

/// Externally tunable parameters for an editing session.
///
/// Everything not listed here is internal policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed width/height ratio for crop selections. `None` leaves the
    /// selection free-form.
    pub aspect_ratio: Option<f64>,
}
