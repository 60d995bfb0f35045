//! News model
//!
//! This module provides:
//! - `News` entity representing a news article
//! - `NewsSnapshot`, the fixed set of tracked attributes recorded in the
//!   revision ledger on every mutation and re-applied on revert
//! - Input types for creating and updating news

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityStatus;

/// News entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct News {
    /// Unique identifier
    pub id: i64,
    /// Category this entry belongs to (required)
    pub category_id: i64,
    /// Headline
    pub title: String,
    /// Subheading
    pub title_second: String,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Short summary
    pub summary: String,
    /// Body text
    pub body: String,
    /// Stored image filename (optional)
    pub image: Option<String>,
    /// Free-text tags
    pub tags: String,
    /// Lifecycle status
    pub status: EntityStatus,
    /// Creating user ID
    pub created_by: i64,
    /// Last updating user ID
    pub updated_by: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl News {
    /// Capture the tracked attributes of this entity as a snapshot.
    pub fn snapshot(&self) -> NewsSnapshot {
        NewsSnapshot {
            title: self.title.clone(),
            title_second: self.title_second.clone(),
            slug: self.slug.clone(),
            summary: self.summary.clone(),
            body: self.body.clone(),
            image: self.image.clone(),
            tags: self.tags.clone(),
            status: self.status,
        }
    }

    /// Overwrite all tracked attributes from a snapshot.
    ///
    /// This is a full overwrite, not a merge: every tracked field takes the
    /// snapshot's value, including `None` for the image.
    pub fn apply_snapshot(&mut self, snapshot: &NewsSnapshot) {
        self.title = snapshot.title.clone();
        self.title_second = snapshot.title_second.clone();
        self.slug = snapshot.slug.clone();
        self.summary = snapshot.summary.clone();
        self.body = snapshot.body.clone();
        self.image = snapshot.image.clone();
        self.tags = snapshot.tags.clone();
        self.status = snapshot.status;
    }
}

/// The tracked attributes of a news entity at one point in time.
///
/// Serialized to JSON in the revision ledger. The field set is fixed so the
/// revert step is statically checkable; it must round-trip exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsSnapshot {
    pub title: String,
    pub title_second: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub image: Option<String>,
    pub tags: String,
    pub status: EntityStatus,
}

/// Input for creating a news entry
#[derive(Debug, Clone)]
pub struct CreateNewsInput {
    /// Category the entry belongs to
    pub category_id: i64,
    /// Headline
    pub title: String,
    /// Subheading
    pub title_second: String,
    /// URL-friendly slug
    pub slug: String,
    /// Short summary
    pub summary: String,
    /// Body text
    pub body: String,
    /// Stored image filename (optional)
    pub image: Option<String>,
    /// Free-text tags
    pub tags: String,
    /// Status (defaults to published when not supplied)
    pub status: Option<EntityStatus>,
}

/// Input for updating a news entry (partial patch; `None` leaves a field as-is)
#[derive(Debug, Clone, Default)]
pub struct UpdateNewsInput {
    /// New category (optional)
    pub category_id: Option<i64>,
    /// New headline (optional)
    pub title: Option<String>,
    /// New subheading (optional)
    pub title_second: Option<String>,
    /// New slug (optional)
    pub slug: Option<String>,
    /// New summary (optional)
    pub summary: Option<String>,
    /// New body (optional)
    pub body: Option<String>,
    /// New image filename (optional)
    pub image: Option<String>,
    /// New tags (optional)
    pub tags: Option<String>,
    /// New status (optional)
    pub status: Option<EntityStatus>,
}

impl UpdateNewsInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.category_id.is_some()
            || self.title.is_some()
            || self.title_second.is_some()
            || self.slug.is_some()
            || self.summary.is_some()
            || self.body.is_some()
            || self.image.is_some()
            || self.tags.is_some()
            || self.status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_news() -> News {
        News {
            id: 1,
            category_id: 2,
            title: "Headline".to_string(),
            title_second: "Sub".to_string(),
            slug: "headline".to_string(),
            summary: "Summary".to_string(),
            body: "Body".to_string(),
            image: Some("img.png".to_string()),
            tags: "a,b".to_string(),
            status: EntityStatus::Published,
            created_by: 1,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_captures_tracked_fields() {
        let news = sample_news();
        let snap = news.snapshot();
        assert_eq!(snap.title, "Headline");
        assert_eq!(snap.image, Some("img.png".to_string()));
        assert_eq!(snap.status, EntityStatus::Published);
    }

    #[test]
    fn test_apply_snapshot_is_full_overwrite() {
        let mut news = sample_news();
        let snap = NewsSnapshot {
            title: "Old".to_string(),
            title_second: String::new(),
            slug: "old".to_string(),
            summary: String::new(),
            body: "old body".to_string(),
            image: None,
            tags: String::new(),
            status: EntityStatus::Unpublished,
        };
        news.apply_snapshot(&snap);
        assert_eq!(news.title, "Old");
        assert_eq!(news.image, None);
        assert_eq!(news.status, EntityStatus::Unpublished);
        // identity and bookkeeping fields are untouched
        assert_eq!(news.id, 1);
        assert_eq!(news.category_id, 2);
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snap = sample_news().snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: NewsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdateNewsInput::default().has_changes());
        let input = UpdateNewsInput {
            title: Some("New".to_string()),
            ..Default::default()
        };
        assert!(input.has_changes());
    }
}
