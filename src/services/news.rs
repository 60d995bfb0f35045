//! News service
//!
//! Business logic for news entries:
//! - Public reads (published only)
//! - Create/update with category and slug validation
//! - Soft delete / restore
//! - Revision history and revert-to-revision
//!
//! Every mutation leaves exactly one entry in the revision ledger; the
//! repository commits the entity write and the ledger append atomically.

use crate::db::repositories::{CategoryRepository, NewsRepository, RevisionRepository};
use crate::models::{
    Actor, CreateNewsInput, EntityStatus, ListParams, News, PagedResult, Revision, RevisionEvent,
    UpdateNewsInput, SUBJECT_NEWS,
};
use crate::services::policy::{self, PolicyError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for news service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    /// Missing or insufficient privileges
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// News entry not found
    #[error("News not found: {0}")]
    NotFound(i64),

    /// Referenced category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Revision missing, or belonging to a different news entry
    #[error("Revision not found: {0}")]
    RevisionNotFound(i64),

    /// Snapshot could not be applied or persisted
    #[error("Revert failed: {0}")]
    RevertFailed(String),

    /// Slug already in use
    #[error("Slug already exists: {0}")]
    SlugExists(String),

    /// Malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying persistence error
    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<PolicyError> for NewsServiceError {
    fn from(e: PolicyError) -> Self {
        NewsServiceError::Unauthorized(e.to_string())
    }
}

/// News service
pub struct NewsService {
    news_repo: Arc<dyn NewsRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    revision_repo: Arc<dyn RevisionRepository>,
}

impl NewsService {
    /// Create a new news service
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        revision_repo: Arc<dyn RevisionRepository>,
    ) -> Self {
        Self {
            news_repo,
            category_repo,
            revision_repo,
        }
    }

    /// List published news (public read path)
    pub async fn get_all(&self, params: &ListParams) -> Result<PagedResult<News>, NewsServiceError> {
        let items = self
            .news_repo
            .list_published(params.offset(), params.limit())
            .await
            .context("Failed to list news")?;
        let total = self
            .news_repo
            .count_published()
            .await
            .context("Failed to count news")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Get a published news entry by id (public read path)
    pub async fn get_by_id(&self, id: i64) -> Result<News, NewsServiceError> {
        self.news_repo
            .get_published_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))
    }

    /// Create a news entry.
    ///
    /// Requires an authenticated actor. The category must exist and not be
    /// trashed; the slug must be unique and URL-safe.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateNewsInput,
    ) -> Result<News, NewsServiceError> {
        validate_title(&input.title)?;
        validate_slug(&input.slug)?;

        self.validate_category(input.category_id).await?;

        if self
            .news_repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(NewsServiceError::SlugExists(input.slug));
        }

        let created = self
            .news_repo
            .create(&input, actor.id)
            .await
            .context("Failed to create news")?;

        Ok(created)
    }

    /// Partially update a news entry.
    ///
    /// Requires an authenticated actor; only supplied fields overwrite.
    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: UpdateNewsInput,
    ) -> Result<News, NewsServiceError> {
        let existing = self
            .news_repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))?;

        if let Some(ref title) = input.title {
            validate_title(title)?;
        }

        if let Some(ref slug) = input.slug {
            validate_slug(slug)?;
            if slug != &existing.slug
                && self
                    .news_repo
                    .exists_by_slug_excluding(slug, id)
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Err(NewsServiceError::SlugExists(slug.clone()));
            }
        }

        if let Some(category_id) = input.category_id {
            self.validate_category(category_id).await?;
        }

        let updated = self
            .news_repo
            .update(id, &input, actor.id)
            .await
            .context("Failed to update news")?;

        Ok(updated)
    }

    /// Soft-delete a news entry (admin only)
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), NewsServiceError> {
        policy::require_admin(actor)?;

        self.news_repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))?;

        self.news_repo
            .set_status(id, EntityStatus::Trashed, RevisionEvent::Deleted, actor.id)
            .await
            .context("Failed to trash news")?;

        Ok(())
    }

    /// Restore a soft-deleted news entry to the published state (admin only)
    pub async fn restore(&self, actor: &Actor, id: i64) -> Result<News, NewsServiceError> {
        policy::require_admin(actor)?;

        self.news_repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))?;

        let restored = self
            .news_repo
            .set_status(id, EntityStatus::Published, RevisionEvent::Updated, actor.id)
            .await
            .context("Failed to restore news")?;

        Ok(restored)
    }

    /// List the revision history of a news entry, newest first (admin only)
    pub async fn revisions(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<Vec<Revision>, NewsServiceError> {
        policy::require_admin(actor)?;

        self.news_repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))?;

        let revisions = self
            .revision_repo
            .list_by_subject(SUBJECT_NEWS, id)
            .await
            .context("Failed to list revisions")?;

        Ok(revisions)
    }

    /// Revert a news entry to a prior revision (admin only).
    ///
    /// The revision must belong to the given news entry; reverting applies
    /// the historical snapshot as a full overwrite and appends a new ledger
    /// entry — history is extended, never rewound.
    pub async fn revert_to_revision(
        &self,
        actor: &Actor,
        news_id: i64,
        revision_id: i64,
    ) -> Result<News, NewsServiceError> {
        policy::require_admin(actor)?;

        self.news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(news_id))?;

        let revision = self
            .revision_repo
            .get_by_id(revision_id)
            .await
            .context("Failed to get revision")?
            .ok_or(NewsServiceError::RevisionNotFound(revision_id))?;

        // Cross-entity guard: the entry must describe this news entry.
        if revision.subject_type != SUBJECT_NEWS || revision.subject_id != news_id {
            return Err(NewsServiceError::RevisionNotFound(revision_id));
        }

        let reverted = self
            .news_repo
            .overwrite(news_id, &revision.snapshot, actor.id)
            .await
            .map_err(|e| NewsServiceError::RevertFailed(e.to_string()))?;

        Ok(reverted)
    }

    /// The category must exist and must not be soft-deleted.
    async fn validate_category(&self, category_id: i64) -> Result<(), NewsServiceError> {
        let category = self
            .category_repo
            .get_by_id(category_id)
            .await
            .context("Failed to get category")?
            .ok_or(NewsServiceError::CategoryNotFound(category_id))?;

        if category.status.is_trashed() {
            return Err(NewsServiceError::Validation(format!(
                "Category {} is trashed",
                category_id
            )));
        }

        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), NewsServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NewsServiceError::Validation(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.len() > 255 {
        return Err(NewsServiceError::Validation(
            "Title must be at most 255 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), NewsServiceError> {
    if slug.is_empty() || slug.len() > 255 {
        return Err(NewsServiceError::Validation(
            "Slug must be between 1 and 255 characters".to_string(),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(NewsServiceError::Validation(format!(
            "Slug may only contain lowercase letters, digits, '-' and '_': {}",
            slug
        )));
    }
    Ok(())
}
