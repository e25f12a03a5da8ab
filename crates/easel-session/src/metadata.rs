//! Title/description metadata attached to the edited image.

use serde::{Deserialize, Serialize};

use crate::config::DESCRIPTION_MAX_LEN;

/// User-entered metadata for the current session.
///
/// The description is truncated at entry to [`DESCRIPTION_MAX_LEN`]
/// characters; export validates the title separately. On file replacement
/// the title is re-derived from the new filename while the description is
/// left untouched (specified behavior, preserved as-is).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    title: String,
    description: String,
}

impl SessionMetadata {
    /// Create metadata with the title derived from a filename.
    pub fn from_filename(filename: &str) -> Self {
        Self {
            title: title_from_filename(filename),
            description: String::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the description, truncating past the character limit.
    pub fn set_description(&mut self, description: &str) {
        self.description = truncate_chars(description, DESCRIPTION_MAX_LEN);
    }

    /// Re-derive the title from a new filename, keeping the description.
    pub fn reset_title_from_filename(&mut self, filename: &str) {
        self.title = title_from_filename(filename);
    }
}

/// Default title for a file: the text before the first `.`.
///
/// "photo.final.jpg" becomes "photo", matching the picker's behavior, not
/// merely stripping the last extension.
pub fn title_from_filename(filename: &str) -> String {
    filename
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Truncate a string to at most `max` characters on a char boundary.
fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
