//! Category repository
//!
//! Database operations for the category taxonomy.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, EntityStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get a category by ID regardless of status
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get a published category by ID (public read path)
    async fn get_published_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// List published categories with pagination
    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<Category>>;

    /// Count published categories
    async fn count_published(&self) -> Result<i64>;

    /// Persist the full state of an existing category
    async fn update(&self, category: &Category) -> Result<Category>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_category_sqlite(self.pool.as_sqlite().unwrap(), category).await
            }
            DatabaseDriver::Mysql => {
                create_category_mysql(self.pool.as_mysql().unwrap(), category).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, false).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_id_mysql(self.pool.as_mysql().unwrap(), id, false).await
            }
        }
    }

    async fn get_published_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, true).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_id_mysql(self.pool.as_mysql().unwrap(), id, true).await
            }
        }
    }

    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_published_sqlite(self.pool.as_sqlite().unwrap(), offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_published_mysql(self.pool.as_mysql().unwrap(), offset, limit).await
            }
        }
    }

    async fn count_published(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_published_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_published_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_category_sqlite(self.pool.as_sqlite().unwrap(), category).await
            }
            DatabaseDriver::Mysql => {
                update_category_mysql(self.pool.as_mysql().unwrap(), category).await
            }
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, title, parent_id, status, created_by, updated_by, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, parent_id, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.title)
    .bind(category.parent_id)
    .bind(category.status.as_str())
    .bind(category.created_by)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    let mut created = category.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_category_by_id_sqlite(
    pool: &SqlitePool,
    id: i64,
    published_only: bool,
) -> Result<Option<Category>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM categories WHERE id = ? AND status = 'published'",
            SELECT_COLUMNS
        )
    } else {
        format!("SELECT {} FROM categories WHERE id = ?", SELECT_COLUMNS)
    };

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_category_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_published_sqlite(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> Result<Vec<Category>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM categories WHERE status = 'published' ORDER BY id ASC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published categories")?;

    let mut categories = Vec::new();
    for row in rows {
        categories.push(row_to_category_sqlite(&row)?);
    }

    Ok(categories)
}

async fn count_published_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE status = 'published'")
        .fetch_one(pool)
        .await
        .context("Failed to count published categories")?;

    Ok(row.get("count"))
}

async fn update_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let result = sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, parent_id = ?, status = ?, updated_by = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.title)
    .bind(category.parent_id)
    .bind(category.status.as_str())
    .bind(category.updated_by)
    .bind(category.updated_at)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Category not found: {}", category.id);
    }

    Ok(category.clone())
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    let status_str: String = row.get("status");
    let status = EntityStatus::from_str(&status_str)?;

    Ok(Category {
        id: row.get("id"),
        title: row.get("title"),
        parent_id: row.get("parent_id"),
        status,
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, parent_id, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.title)
    .bind(category.parent_id)
    .bind(category.status.as_str())
    .bind(category.created_by)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    let mut created = category.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_category_by_id_mysql(
    pool: &MySqlPool,
    id: i64,
    published_only: bool,
) -> Result<Option<Category>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM categories WHERE id = ? AND status = 'published'",
            SELECT_COLUMNS
        )
    } else {
        format!("SELECT {} FROM categories WHERE id = ?", SELECT_COLUMNS)
    };

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_category_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_published_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<Category>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM categories WHERE status = 'published' ORDER BY id ASC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published categories")?;

    let mut categories = Vec::new();
    for row in rows {
        categories.push(row_to_category_mysql(&row)?);
    }

    Ok(categories)
}

async fn count_published_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE status = 'published'")
        .fetch_one(pool)
        .await
        .context("Failed to count published categories")?;

    Ok(row.get("count"))
}

async fn update_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let result = sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, parent_id = ?, status = ?, updated_by = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.title)
    .bind(category.parent_id)
    .bind(category.status.as_str())
    .bind(category.updated_by)
    .bind(category.updated_at)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Category not found: {}", category.id);
    }

    Ok(category.clone())
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    let status_str: String = row.get("status");
    let status = EntityStatus::from_str(&status_str)?;

    Ok(Category {
        id: row.get("id"),
        title: row.get("title"),
        parent_id: row.get("parent_id"),
        status,
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup() -> (DynDatabasePool, SqlxCategoryRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let sqlite_pool = pool.as_sqlite().unwrap();
        let user = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES ('u', 'u@x.com', 'h')",
        )
        .execute(sqlite_pool)
        .await
        .expect("Failed to create user");

        let repo = SqlxCategoryRepository::new(pool.clone());
        (pool, repo, user.last_insert_rowid())
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let (_pool, repo, user_id) = setup().await;

        let category = Category::new("World".to_string(), None, EntityStatus::Published, user_id);
        let created = repo.create(&category).await.expect("create failed");

        assert!(created.id > 0);
        let found = repo
            .get_by_id(created.id)
            .await
            .expect("get failed")
            .expect("not found");
        assert_eq!(found.title, "World");
        assert!(found.is_root());
    }

    #[tokio::test]
    async fn test_get_published_filters_status() {
        let (_pool, repo, user_id) = setup().await;

        let category = Category::new("Drafts".to_string(), None, EntityStatus::Unpublished, user_id);
        let created = repo.create(&category).await.expect("create failed");

        assert!(repo
            .get_published_by_id(created.id)
            .await
            .expect("get failed")
            .is_none());
        assert!(repo
            .get_by_id(created.id)
            .await
            .expect("get failed")
            .is_some());
    }

    #[tokio::test]
    async fn test_list_published_with_pagination() {
        let (_pool, repo, user_id) = setup().await;

        for i in 1..=3 {
            let category = Category::new(
                format!("Cat {}", i),
                None,
                EntityStatus::Published,
                user_id,
            );
            repo.create(&category).await.expect("create failed");
        }
        let trashed = Category::new("Gone".to_string(), None, EntityStatus::Trashed, user_id);
        repo.create(&trashed).await.expect("create failed");

        let page = repo.list_published(0, 2).await.expect("list failed");
        assert_eq!(page.len(), 2);
        assert_eq!(repo.count_published().await.expect("count failed"), 3);
    }

    #[tokio::test]
    async fn test_update_category() {
        let (_pool, repo, user_id) = setup().await;

        let parent = repo
            .create(&Category::new("Parent".to_string(), None, EntityStatus::Published, user_id))
            .await
            .expect("create failed");
        let mut child = repo
            .create(&Category::new("Child".to_string(), None, EntityStatus::Published, user_id))
            .await
            .expect("create failed");

        child.title = "Renamed".to_string();
        child.parent_id = Some(parent.id);
        child.updated_by = Some(user_id);
        let updated = repo.update(&child).await.expect("update failed");

        let found = repo
            .get_by_id(updated.id)
            .await
            .expect("get failed")
            .expect("not found");
        assert_eq!(found.title, "Renamed");
        assert_eq!(found.parent_id, Some(parent.id));
        assert_eq!(found.updated_by, Some(user_id));
    }

    #[tokio::test]
    async fn test_update_missing_category_fails() {
        let (_pool, repo, user_id) = setup().await;

        let mut phantom = Category::new("Ghost".to_string(), None, EntityStatus::Published, user_id);
        phantom.id = 999;
        assert!(repo.update(&phantom).await.is_err());
    }
}
