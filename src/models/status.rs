//! Publication status shared by users, categories and news.
//!
//! The status enum is the single lifecycle mechanism: `Trashed` is the
//! soft-deleted state, there is no separate deletion marker. Public read
//! paths only ever return `Published` entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a user, category or news entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    /// Visible on public read paths
    Published,
    /// Hidden from public reads, not deleted
    Unpublished,
    /// Hidden from public reads, kept for the record
    Archived,
    /// Soft-deleted; restorable via restore()
    Trashed,
}

impl Default for EntityStatus {
    fn default() -> Self {
        Self::Published
    }
}

impl EntityStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Published => "published",
            EntityStatus::Unpublished => "unpublished",
            EntityStatus::Archived => "archived",
            EntityStatus::Trashed => "trashed",
        }
    }

    /// Check if the entity is visible to public reads
    pub fn is_published(&self) -> bool {
        matches!(self, EntityStatus::Published)
    }

    /// Check if the entity is soft-deleted
    pub fn is_trashed(&self) -> bool {
        matches!(self, EntityStatus::Trashed)
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "published" => Ok(EntityStatus::Published),
            "unpublished" => Ok(EntityStatus::Unpublished),
            "archived" => Ok(EntityStatus::Archived),
            "trashed" => Ok(EntityStatus::Trashed),
            _ => Err(anyhow::anyhow!("Invalid entity status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            EntityStatus::Published,
            EntityStatus::Unpublished,
            EntityStatus::Archived,
            EntityStatus::Trashed,
        ] {
            assert_eq!(EntityStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_from_str_case_insensitive() {
        assert_eq!(
            EntityStatus::from_str("PUBLISHED").unwrap(),
            EntityStatus::Published
        );
        assert!(EntityStatus::from_str("deleted").is_err());
    }

    #[test]
    fn test_status_default_is_published() {
        assert_eq!(EntityStatus::default(), EntityStatus::Published);
        assert!(EntityStatus::default().is_published());
    }

    #[test]
    fn test_trashed_is_not_published() {
        assert!(!EntityStatus::Trashed.is_published());
        assert!(EntityStatus::Trashed.is_trashed());
    }
}
