//! Revision model
//!
//! A revision is one entry in the append-only ledger written alongside every
//! news mutation. Entries are never updated or deleted; a revert does not
//! rewind the ledger, it appends a new head matching an old snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::NewsSnapshot;

/// Subject type recorded for news revisions.
pub const SUBJECT_NEWS: &str = "news";

/// One entry in the revision ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    /// Unique identifier; treated as an opaque revision id by revert
    pub id: i64,
    /// Subject entity type (currently always `news`)
    pub subject_type: String,
    /// Subject entity id
    pub subject_id: i64,
    /// What kind of mutation produced this entry
    pub event: RevisionEvent,
    /// Tracked attributes as of this save
    pub snapshot: NewsSnapshot,
    /// Acting user id
    pub caused_by: i64,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

/// The mutation kind that produced a revision entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionEvent {
    /// Entity was created
    Created,
    /// Entity was updated (includes restore and revert)
    Updated,
    /// Entity was soft-deleted
    Deleted,
}

impl RevisionEvent {
    /// Convert event to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionEvent::Created => "created",
            RevisionEvent::Updated => "updated",
            RevisionEvent::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RevisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RevisionEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(RevisionEvent::Created),
            "updated" => Ok(RevisionEvent::Updated),
            "deleted" => Ok(RevisionEvent::Deleted),
            _ => Err(anyhow::anyhow!("Invalid revision event: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trip() {
        for event in [
            RevisionEvent::Created,
            RevisionEvent::Updated,
            RevisionEvent::Deleted,
        ] {
            assert_eq!(RevisionEvent::from_str(event.as_str()).unwrap(), event);
        }
        assert!(RevisionEvent::from_str("reverted").is_err());
    }
}
