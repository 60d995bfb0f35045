//! Category service
//!
//! Business logic for the category taxonomy:
//! - Public listing and per-category news listing (published only)
//! - Create with parent validation
//! - Partial update with cycle guard
//! - Soft delete / restore

use crate::db::repositories::{CategoryRepository, NewsRepository};
use crate::models::{
    Actor, Category, CreateCategoryInput, EntityStatus, ListParams, News, PagedResult,
    UpdateCategoryInput,
};
use crate::services::policy::{self, PolicyError};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Missing or insufficient privileges
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(i64),

    /// Referenced parent category not found
    #[error("Parent category not found: {0}")]
    ParentNotFound(i64),

    /// A category may not become its own ancestor
    #[error("Circular reference detected: category cannot be its own ancestor")]
    CircularReference,

    /// Malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying persistence error
    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<PolicyError> for CategoryServiceError {
    fn from(e: PolicyError) -> Self {
        CategoryServiceError::Unauthorized(e.to_string())
    }
}

/// Category service
pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository>,
    news_repo: Arc<dyn NewsRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(
        category_repo: Arc<dyn CategoryRepository>,
        news_repo: Arc<dyn NewsRepository>,
    ) -> Self {
        Self {
            category_repo,
            news_repo,
        }
    }

    /// List published categories (public read path)
    pub async fn get_all(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<Category>, CategoryServiceError> {
        let items = self
            .category_repo
            .list_published(params.offset(), params.limit())
            .await
            .context("Failed to list categories")?;
        let total = self
            .category_repo
            .count_published()
            .await
            .context("Failed to count categories")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// List published news in a category (public read path).
    ///
    /// The category itself must be published; a trashed, archived or
    /// unpublished category is reported as not found.
    pub async fn news(
        &self,
        category_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<News>, CategoryServiceError> {
        self.category_repo
            .get_published_by_id(category_id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound(category_id))?;

        let items = self
            .news_repo
            .list_published_by_category(category_id, params.offset(), params.limit())
            .await
            .context("Failed to list news by category")?;
        let total = self
            .news_repo
            .count_published_by_category(category_id)
            .await
            .context("Failed to count news by category")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Create a new category.
    ///
    /// Requires an authenticated actor. A supplied parent must exist and not
    /// be trashed.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        validate_title(&input.title)?;

        if let Some(parent_id) = input.parent_id {
            self.validate_parent(parent_id).await?;
        }

        let category = Category::new(
            input.title,
            input.parent_id,
            input.status.unwrap_or_default(),
            actor.id,
        );

        let created = self
            .category_repo
            .create(&category)
            .await
            .context("Failed to create category")?;

        Ok(created)
    }

    /// Partially update a category (admin only).
    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        policy::require_admin(actor)?;

        let mut category = self
            .category_repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound(id))?;

        if let Some(ref title) = input.title {
            validate_title(title)?;
            category.title = title.clone();
        }

        if let Some(parent_id) = input.parent_id {
            self.validate_parent(parent_id).await?;
            if self.would_create_cycle(id, parent_id).await? {
                return Err(CategoryServiceError::CircularReference);
            }
            category.parent_id = Some(parent_id);
        }

        if let Some(status) = input.status {
            category.status = status;
        }

        category.updated_by = Some(actor.id);
        category.updated_at = Utc::now();

        let updated = self
            .category_repo
            .update(&category)
            .await
            .context("Failed to update category")?;

        Ok(updated)
    }

    /// Soft-delete a category (admin only)
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), CategoryServiceError> {
        policy::require_admin(actor)?;

        let mut category = self
            .category_repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound(id))?;

        category.status = EntityStatus::Trashed;
        category.updated_by = Some(actor.id);
        category.updated_at = Utc::now();
        self.category_repo
            .update(&category)
            .await
            .context("Failed to trash category")?;

        Ok(())
    }

    /// Restore a soft-deleted category to the published state (admin only)
    pub async fn restore(&self, actor: &Actor, id: i64) -> Result<Category, CategoryServiceError> {
        policy::require_admin(actor)?;

        let mut category = self
            .category_repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound(id))?;

        category.status = EntityStatus::Published;
        category.updated_by = Some(actor.id);
        category.updated_at = Utc::now();
        let restored = self
            .category_repo
            .update(&category)
            .await
            .context("Failed to restore category")?;

        Ok(restored)
    }

    /// A parent must exist and must not be soft-deleted.
    async fn validate_parent(&self, parent_id: i64) -> Result<(), CategoryServiceError> {
        let parent = self
            .category_repo
            .get_by_id(parent_id)
            .await
            .context("Failed to get parent category")?
            .ok_or(CategoryServiceError::ParentNotFound(parent_id))?;

        if parent.status.is_trashed() {
            return Err(CategoryServiceError::Validation(format!(
                "Parent category {} is trashed",
                parent_id
            )));
        }

        Ok(())
    }

    /// Walk up from the proposed parent; reaching the category itself means
    /// the new parent is a descendant (or the category itself).
    async fn would_create_cycle(
        &self,
        category_id: i64,
        new_parent_id: i64,
    ) -> Result<bool, CategoryServiceError> {
        let mut current = Some(new_parent_id);
        while let Some(id) = current {
            if id == category_id {
                return Ok(true);
            }
            current = self
                .category_repo
                .get_by_id(id)
                .await
                .context("Failed to walk category ancestors")?
                .and_then(|c| c.parent_id);
        }
        Ok(false)
    }
}

fn validate_title(title: &str) -> Result<(), CategoryServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CategoryServiceError::Validation(
            "Category title cannot be empty".to_string(),
        ));
    }
    if title.len() > 255 {
        return Err(CategoryServiceError::Validation(
            "Category title must be at most 255 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCategoryRepository, SqlxNewsRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateNewsInput, UserRole};

    async fn setup() -> (CategoryService, Arc<dyn NewsRepository>, Actor, Actor) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let sqlite_pool = pool.as_sqlite().unwrap();
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, role) VALUES ('admin', 'a@x.com', 'h', 'admin')",
        )
        .execute(sqlite_pool)
        .await
        .expect("Failed to create admin");
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, role) VALUES ('reg', 'r@x.com', 'h', 'regular')",
        )
        .execute(sqlite_pool)
        .await
        .expect("Failed to create regular user");

        let news_repo = SqlxNewsRepository::boxed(pool.clone());
        let service = CategoryService::new(SqlxCategoryRepository::boxed(pool), news_repo.clone());

        let admin = Actor {
            id: 1,
            role: UserRole::Admin,
        };
        let regular = Actor {
            id: 2,
            role: UserRole::Regular,
        };
        (service, news_repo, admin, regular)
    }

    fn create_input(title: &str, parent_id: Option<i64>) -> CreateCategoryInput {
        CreateCategoryInput {
            title: title.to_string(),
            parent_id,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_published() {
        let (service, _news_repo, admin, _) = setup().await;

        let created = service
            .create(&admin, create_input("World", None))
            .await
            .expect("create failed");
        assert_eq!(created.status, EntityStatus::Published);
        assert_eq!(created.created_by, admin.id);
    }

    #[tokio::test]
    async fn test_create_with_missing_parent_fails() {
        let (service, _news_repo, admin, _) = setup().await;

        let result = service.create(&admin, create_input("Orphan", Some(99))).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::ParentNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_create_with_trashed_parent_fails() {
        let (service, _news_repo, admin, _) = setup().await;

        let parent = service
            .create(&admin, create_input("Old", None))
            .await
            .expect("create failed");
        service.delete(&admin, parent.id).await.expect("delete failed");

        let result = service
            .create(&admin, create_input("Child", Some(parent.id)))
            .await;
        assert!(matches!(result, Err(CategoryServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let (service, _news_repo, admin, _) = setup().await;
        let result = service.create(&admin, create_input("   ", None)).await;
        assert!(matches!(result, Err(CategoryServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_is_partial_patch() {
        let (service, _news_repo, admin, _) = setup().await;

        let parent = service
            .create(&admin, create_input("Parent", None))
            .await
            .expect("create failed");
        let child = service
            .create(&admin, create_input("Child", None))
            .await
            .expect("create failed");

        let input = UpdateCategoryInput {
            parent_id: Some(parent.id),
            ..Default::default()
        };
        let updated = service
            .update(&admin, child.id, input)
            .await
            .expect("update failed");

        assert_eq!(updated.parent_id, Some(parent.id));
        assert_eq!(updated.title, "Child"); // Unchanged
        assert_eq!(updated.updated_by, Some(admin.id));
    }

    #[tokio::test]
    async fn test_update_requires_admin_before_existence() {
        let (service, _news_repo, _admin, regular) = setup().await;

        let result = service
            .update(&regular, 999, UpdateCategoryInput::default())
            .await;
        assert!(matches!(result, Err(CategoryServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_self_parent() {
        let (service, _news_repo, admin, _) = setup().await;

        let category = service
            .create(&admin, create_input("Loop", None))
            .await
            .expect("create failed");

        let input = UpdateCategoryInput {
            parent_id: Some(category.id),
            ..Default::default()
        };
        let result = service.update(&admin, category.id, input).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::CircularReference)
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_descendant_parent() {
        let (service, _news_repo, admin, _) = setup().await;

        let root = service
            .create(&admin, create_input("Root", None))
            .await
            .expect("create failed");
        let child = service
            .create(&admin, create_input("Child", Some(root.id)))
            .await
            .expect("create failed");

        let input = UpdateCategoryInput {
            parent_id: Some(child.id),
            ..Default::default()
        };
        let result = service.update(&admin, root.id, input).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::CircularReference)
        ));
    }

    #[tokio::test]
    async fn test_delete_then_restore_round_trip() {
        let (service, _news_repo, admin, _) = setup().await;

        let category = service
            .create(&admin, create_input("Transient", None))
            .await
            .expect("create failed");

        service.delete(&admin, category.id).await.expect("delete failed");
        let listed = service
            .get_all(&ListParams::default())
            .await
            .expect("list failed");
        assert_eq!(listed.total, 0);

        let restored = service
            .restore(&admin, category.id)
            .await
            .expect("restore failed");
        assert_eq!(restored.status, EntityStatus::Published);

        // repeated restore keeps it published
        let again = service
            .restore(&admin, category.id)
            .await
            .expect("restore failed");
        assert_eq!(again.status, EntityStatus::Published);
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let (service, _news_repo, admin, regular) = setup().await;

        let category = service
            .create(&admin, create_input("Guarded", None))
            .await
            .expect("create failed");

        let result = service.delete(&regular, category.id).await;
        assert!(matches!(result, Err(CategoryServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_news_listing_of_trashed_category_is_not_found() {
        let (service, news_repo, admin, _) = setup().await;

        let category = service
            .create(&admin, create_input("Doomed", None))
            .await
            .expect("create failed");
        news_repo
            .create(
                &CreateNewsInput {
                    category_id: category.id,
                    title: "Story".to_string(),
                    title_second: String::new(),
                    slug: "story".to_string(),
                    summary: String::new(),
                    body: String::new(),
                    image: None,
                    tags: String::new(),
                    status: None,
                },
                admin.id,
            )
            .await
            .expect("news create failed");

        // published category lists its news
        let page = service
            .news(category.id, &ListParams::default())
            .await
            .expect("news listing failed");
        assert_eq!(page.total, 1);

        // trashing the category makes the listing NotFound
        service.delete(&admin, category.id).await.expect("delete failed");
        let result = service.news(category.id, &ListParams::default()).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_news_listing_excludes_unpublished_entries() {
        let (service, news_repo, admin, _) = setup().await;

        let category = service
            .create(&admin, create_input("Mixed", None))
            .await
            .expect("create failed");

        for (slug, status) in [
            ("visible", None),
            ("invisible", Some(EntityStatus::Unpublished)),
        ] {
            news_repo
                .create(
                    &CreateNewsInput {
                        category_id: category.id,
                        title: slug.to_string(),
                        title_second: String::new(),
                        slug: slug.to_string(),
                        summary: String::new(),
                        body: String::new(),
                        image: None,
                        tags: String::new(),
                        status,
                    },
                    admin.id,
                )
                .await
                .expect("news create failed");
        }

        let page = service
            .news(category.id, &ListParams::default())
            .await
            .expect("news listing failed");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "visible");
    }
}
