//! Category model
//!
//! Categories form a two-level-or-deeper taxonomy through an optional
//! parent reference. News entities always belong to exactly one category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityStatus;

/// Category entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category title
    pub title: String,
    /// Parent category ID (None for root categories)
    pub parent_id: Option<i64>,
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

impl Category {
    /// Create a new Category. The ID is assigned by the database.
    pub fn new(
        title: String,
        parent_id: Option<i64>,
        status: EntityStatus,
        created_by: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            parent_id,
            status,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a root category (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category title
    pub title: String,
    /// Parent category ID (optional)
    pub parent_id: Option<i64>,
    /// Status (defaults to published when not supplied)
    pub status: Option<EntityStatus>,
}

/// Input for updating a category (partial patch; `None` leaves a field as-is)
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New parent ID (optional; there is no way to clear the parent here)
    pub parent_id: Option<i64>,
    /// New status (optional)
    pub status: Option<EntityStatus>,
}
