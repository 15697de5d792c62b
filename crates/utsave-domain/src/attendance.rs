//! RSVP attendance responses.

use serde::{Deserialize, Serialize};

/// A guest's answer to an event invitation.
///
/// Wire/storage format: lowercase string (`yes`, `no`, `maybe`, `pending`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attendance {
    Yes,
    No,
    Maybe,
    Pending,
}

impl Attendance {
    /// Parse the stored string form. Unknown values read as `Pending` so a
    /// stray value never grants access.
    pub fn from_db(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            "maybe" => Self::Maybe,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
            Self::Pending => "pending",
        }
    }

    /// Only guests who answered "yes" may verify into the gallery.
    pub fn is_attending(self) -> bool {
        matches!(self, Self::Yes)
    }
}
