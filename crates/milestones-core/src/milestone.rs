use chrono::{DateTime, Datelike, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Stored timestamps keep microseconds; anything finer is dropped on creation.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// A user-created record pairing a target moment with a title and notes.
///
/// `id` and `created_at` are fixed at creation. The other fields are edited
/// in place and written back through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub target: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub notes: String,
}

impl Milestone {
    /// Build a new milestone with a fresh id, created at `now`.
    ///
    /// Both timestamps are truncated to the precision the store keeps.
    pub fn new(
        title: impl Into<String>,
        notes: impl Into<String>,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: to_stored_precision(now),
            target: to_stored_precision(target),
            title: title.into(),
            notes: notes.into(),
        }
    }

    /// A milestone can only be saved with a non-blank title.
    pub fn has_title(&self) -> bool {
        title_is_present(&self.title)
    }

    /// Whether the target has been reached at `now`.
    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.target <= now
    }
}

pub(crate) fn title_is_present(title: &str) -> bool {
    !title.trim().is_empty()
}

pub(crate) fn to_stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// RFC 3339 text only spells four-digit years, so the store holds 0000..=9999.
pub fn check_storable(field: &str, ts: &DateTime<Utc>) -> Result<(), ValidationError> {
    if (0..=9999).contains(&ts.year()) {
        return Ok(());
    }
    Err(ValidationError::InvalidValue {
        field: field.into(),
        message: format!("year {} is outside 0000-9999", ts.year()),
    })
}
