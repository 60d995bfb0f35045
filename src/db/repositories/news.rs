//! News repository
//!
//! Database operations for news entries. Every mutation (create, partial
//! update, status transition, snapshot overwrite) runs in a single
//! transaction together with the revision ledger append, so an entity can
//! never change state without a matching ledger entry.

use crate::config::DatabaseDriver;
use crate::db::repositories::revision::{insert_revision_mysql, insert_revision_sqlite};
use crate::db::DynDatabasePool;
use crate::models::{
    CreateNewsInput, EntityStatus, News, NewsSnapshot, RevisionEvent, UpdateNewsInput,
    SUBJECT_NEWS,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a news entry and record its creation in the ledger
    async fn create(&self, input: &CreateNewsInput, actor_id: i64) -> Result<News>;

    /// Get a news entry by ID regardless of status
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Get a published news entry by ID (public read path)
    async fn get_published_by_id(&self, id: i64) -> Result<Option<News>>;

    /// List published news entries with pagination
    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<News>>;

    /// Count published news entries
    async fn count_published(&self) -> Result<i64>;

    /// List published news entries in a category with pagination
    async fn list_published_by_category(
        &self,
        category_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<News>>;

    /// Count published news entries in a category
    async fn count_published_by_category(&self, category_id: i64) -> Result<i64>;

    /// Partially update a news entry and record the result in the ledger
    async fn update(&self, id: i64, input: &UpdateNewsInput, actor_id: i64) -> Result<News>;

    /// Change the status of a news entry and record it under the given event
    async fn set_status(
        &self,
        id: i64,
        status: EntityStatus,
        event: RevisionEvent,
        actor_id: i64,
    ) -> Result<News>;

    /// Overwrite all tracked fields from a snapshot and record the result
    async fn overwrite(&self, id: i64, snapshot: &NewsSnapshot, actor_id: i64) -> Result<News>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists for a different news entry (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based news repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput, actor_id: i64) -> Result<News> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_news_sqlite(self.pool.as_sqlite().unwrap(), input, actor_id).await
            }
            DatabaseDriver::Mysql => {
                create_news_mysql(self.pool.as_mysql().unwrap(), input, actor_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_news_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, false).await
            }
            DatabaseDriver::Mysql => {
                get_news_by_id_mysql(self.pool.as_mysql().unwrap(), id, false).await
            }
        }
    }

    async fn get_published_by_id(&self, id: i64) -> Result<Option<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_news_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, true).await
            }
            DatabaseDriver::Mysql => {
                get_news_by_id_mysql(self.pool.as_mysql().unwrap(), id, true).await
            }
        }
    }

    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<News>> {
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

    async fn list_published_by_category(
        &self,
        category_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_published_by_category_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    category_id,
                    offset,
                    limit,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                list_published_by_category_mysql(
                    self.pool.as_mysql().unwrap(),
                    category_id,
                    offset,
                    limit,
                )
                .await
            }
        }
    }

    async fn count_published_by_category(&self, category_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_published_by_category_sqlite(self.pool.as_sqlite().unwrap(), category_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                count_published_by_category_mysql(self.pool.as_mysql().unwrap(), category_id).await
            }
        }
    }

    async fn update(&self, id: i64, input: &UpdateNewsInput, actor_id: i64) -> Result<News> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_news_sqlite(self.pool.as_sqlite().unwrap(), id, input, actor_id).await
            }
            DatabaseDriver::Mysql => {
                update_news_mysql(self.pool.as_mysql().unwrap(), id, input, actor_id).await
            }
        }
    }

    async fn set_status(
        &self,
        id: i64,
        status: EntityStatus,
        event: RevisionEvent,
        actor_id: i64,
    ) -> Result<News> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_status_sqlite(self.pool.as_sqlite().unwrap(), id, status, event, actor_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                set_status_mysql(self.pool.as_mysql().unwrap(), id, status, event, actor_id).await
            }
        }
    }

    async fn overwrite(&self, id: i64, snapshot: &NewsSnapshot, actor_id: i64) -> Result<News> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                overwrite_news_sqlite(self.pool.as_sqlite().unwrap(), id, snapshot, actor_id).await
            }
            DatabaseDriver::Mysql => {
                overwrite_news_mysql(self.pool.as_mysql().unwrap(), id, snapshot, actor_id).await
            }
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug, None).await
            }
            DatabaseDriver::Mysql => {
                exists_by_slug_mysql(self.pool.as_mysql().unwrap(), slug, None).await
            }
        }
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug, Some(exclude_id)).await
            }
            DatabaseDriver::Mysql => {
                exists_by_slug_mysql(self.pool.as_mysql().unwrap(), slug, Some(exclude_id)).await
            }
        }
    }
}

const SELECT_COLUMNS: &str = "id, category_id, title, title_second, slug, summary, body, image, tags, status, created_by, updated_by, created_at, updated_at";

const UPDATE_SQL: &str = r#"
    UPDATE news
    SET category_id = ?, title = ?, title_second = ?, slug = ?, summary = ?, body = ?,
        image = ?, tags = ?, status = ?, updated_by = ?, updated_at = ?
    WHERE id = ?
"#;

/// Merge a partial update into an existing entity and stamp the actor.
fn merge_update(existing: &News, input: &UpdateNewsInput, actor_id: i64) -> News {
    let mut news = existing.clone();
    if let Some(category_id) = input.category_id {
        news.category_id = category_id;
    }
    if let Some(ref title) = input.title {
        news.title = title.clone();
    }
    if let Some(ref title_second) = input.title_second {
        news.title_second = title_second.clone();
    }
    if let Some(ref slug) = input.slug {
        news.slug = slug.clone();
    }
    if let Some(ref summary) = input.summary {
        news.summary = summary.clone();
    }
    if let Some(ref body) = input.body {
        news.body = body.clone();
    }
    if let Some(ref image) = input.image {
        news.image = Some(image.clone());
    }
    if let Some(ref tags) = input.tags {
        news.tags = tags.clone();
    }
    if let Some(status) = input.status {
        news.status = status;
    }
    news.updated_by = Some(actor_id);
    news.updated_at = Utc::now();
    news
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_news_sqlite(
    pool: &SqlitePool,
    input: &CreateNewsInput,
    actor_id: i64,
) -> Result<News> {
    let now = Utc::now();
    let status = input.status.unwrap_or_default();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO news (category_id, title, title_second, slug, summary, body, image, tags, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.category_id)
    .bind(&input.title)
    .bind(&input.title_second)
    .bind(&input.slug)
    .bind(&input.summary)
    .bind(&input.body)
    .bind(&input.image)
    .bind(&input.tags)
    .bind(status.as_str())
    .bind(actor_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create news")?;

    let id = result.last_insert_rowid();

    let news = News {
        id,
        category_id: input.category_id,
        title: input.title.clone(),
        title_second: input.title_second.clone(),
        slug: input.slug.clone(),
        summary: input.summary.clone(),
        body: input.body.clone(),
        image: input.image.clone(),
        tags: input.tags.clone(),
        status,
        created_by: actor_id,
        updated_by: None,
        created_at: now,
        updated_at: now,
    };

    insert_revision_sqlite(
        &mut tx,
        SUBJECT_NEWS,
        id,
        RevisionEvent::Created,
        &news.snapshot(),
        actor_id,
    )
    .await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn get_news_by_id_sqlite(
    pool: &SqlitePool,
    id: i64,
    published_only: bool,
) -> Result<Option<News>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM news WHERE id = ? AND status = 'published'",
            SELECT_COLUMNS
        )
    } else {
        format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS)
    };

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_news_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_published_sqlite(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM news WHERE status = 'published' ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published news")?;

    let mut news = Vec::new();
    for row in rows {
        news.push(row_to_news_sqlite(&row)?);
    }

    Ok(news)
}

async fn count_published_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM news WHERE status = 'published'")
        .fetch_one(pool)
        .await
        .context("Failed to count published news")?;

    Ok(row.get("count"))
}

async fn list_published_by_category_sqlite(
    pool: &SqlitePool,
    category_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<News>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM news WHERE category_id = ? AND status = 'published' ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(category_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list news by category")?;

    let mut news = Vec::new();
    for row in rows {
        news.push(row_to_news_sqlite(&row)?);
    }

    Ok(news)
}

async fn count_published_by_category_sqlite(pool: &SqlitePool, category_id: i64) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM news WHERE category_id = ? AND status = 'published'",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await
    .context("Failed to count news by category")?;

    Ok(row.get("count"))
}

async fn update_news_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdateNewsInput,
    actor_id: i64,
) -> Result<News> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get news for update")?;

    let existing = match row {
        Some(row) => row_to_news_sqlite(&row)?,
        None => anyhow::bail!("News not found: {}", id),
    };

    let news = merge_update(&existing, input, actor_id);
    persist_news_sqlite(&mut tx, &news, RevisionEvent::Updated, actor_id).await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn set_status_sqlite(
    pool: &SqlitePool,
    id: i64,
    status: EntityStatus,
    event: RevisionEvent,
    actor_id: i64,
) -> Result<News> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get news for status change")?;

    let mut news = match row {
        Some(row) => row_to_news_sqlite(&row)?,
        None => anyhow::bail!("News not found: {}", id),
    };

    news.status = status;
    news.updated_by = Some(actor_id);
    news.updated_at = Utc::now();
    persist_news_sqlite(&mut tx, &news, event, actor_id).await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn overwrite_news_sqlite(
    pool: &SqlitePool,
    id: i64,
    snapshot: &NewsSnapshot,
    actor_id: i64,
) -> Result<News> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get news for overwrite")?;

    let mut news = match row {
        Some(row) => row_to_news_sqlite(&row)?,
        None => anyhow::bail!("News not found: {}", id),
    };

    news.apply_snapshot(snapshot);
    news.updated_by = Some(actor_id);
    news.updated_at = Utc::now();
    persist_news_sqlite(&mut tx, &news, RevisionEvent::Updated, actor_id).await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

/// Write the full tracked state of a news entity and append the matching
/// ledger entry. Runs on an open transaction.
async fn persist_news_sqlite(
    tx: &mut sqlx::SqliteConnection,
    news: &News,
    event: RevisionEvent,
    actor_id: i64,
) -> Result<()> {
    sqlx::query(UPDATE_SQL)
        .bind(news.category_id)
        .bind(&news.title)
        .bind(&news.title_second)
        .bind(&news.slug)
        .bind(&news.summary)
        .bind(&news.body)
        .bind(&news.image)
        .bind(&news.tags)
        .bind(news.status.as_str())
        .bind(news.updated_by)
        .bind(news.updated_at)
        .bind(news.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update news")?;

    insert_revision_sqlite(
        tx,
        SUBJECT_NEWS,
        news.id,
        event,
        &news.snapshot(),
        actor_id,
    )
    .await?;

    Ok(())
}

async fn exists_by_slug_sqlite(
    pool: &SqlitePool,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let count: i64 = match exclude_id {
        Some(id) => {
            let row = sqlx::query("SELECT COUNT(*) as count FROM news WHERE slug = ? AND id != ?")
                .bind(slug)
                .bind(id)
                .fetch_one(pool)
                .await
                .context("Failed to check slug existence")?;
            row.get("count")
        }
        None => {
            let row = sqlx::query("SELECT COUNT(*) as count FROM news WHERE slug = ?")
                .bind(slug)
                .fetch_one(pool)
                .await
                .context("Failed to check slug existence")?;
            row.get("count")
        }
    };
    Ok(count > 0)
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<News> {
    let status_str: String = row.get("status");
    let status = EntityStatus::from_str(&status_str)?;

    Ok(News {
        id: row.get("id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        title_second: row.get("title_second"),
        slug: row.get("slug"),
        summary: row.get("summary"),
        body: row.get("body"),
        image: row.get("image"),
        tags: row.get("tags"),
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

async fn create_news_mysql(
    pool: &MySqlPool,
    input: &CreateNewsInput,
    actor_id: i64,
) -> Result<News> {
    let now = Utc::now();
    let status = input.status.unwrap_or_default();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO news (category_id, title, title_second, slug, summary, body, image, tags, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.category_id)
    .bind(&input.title)
    .bind(&input.title_second)
    .bind(&input.slug)
    .bind(&input.summary)
    .bind(&input.body)
    .bind(&input.image)
    .bind(&input.tags)
    .bind(status.as_str())
    .bind(actor_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create news")?;

    let id = result.last_insert_id() as i64;

    let news = News {
        id,
        category_id: input.category_id,
        title: input.title.clone(),
        title_second: input.title_second.clone(),
        slug: input.slug.clone(),
        summary: input.summary.clone(),
        body: input.body.clone(),
        image: input.image.clone(),
        tags: input.tags.clone(),
        status,
        created_by: actor_id,
        updated_by: None,
        created_at: now,
        updated_at: now,
    };

    insert_revision_mysql(
        &mut tx,
        SUBJECT_NEWS,
        id,
        RevisionEvent::Created,
        &news.snapshot(),
        actor_id,
    )
    .await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn get_news_by_id_mysql(
    pool: &MySqlPool,
    id: i64,
    published_only: bool,
) -> Result<Option<News>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM news WHERE id = ? AND status = 'published'",
            SELECT_COLUMNS
        )
    } else {
        format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS)
    };

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_news_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_published_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM news WHERE status = 'published' ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published news")?;

    let mut news = Vec::new();
    for row in rows {
        news.push(row_to_news_mysql(&row)?);
    }

    Ok(news)
}

async fn count_published_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM news WHERE status = 'published'")
        .fetch_one(pool)
        .await
        .context("Failed to count published news")?;

    Ok(row.get("count"))
}

async fn list_published_by_category_mysql(
    pool: &MySqlPool,
    category_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<News>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM news WHERE category_id = ? AND status = 'published' ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(category_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list news by category")?;

    let mut news = Vec::new();
    for row in rows {
        news.push(row_to_news_mysql(&row)?);
    }

    Ok(news)
}

async fn count_published_by_category_mysql(pool: &MySqlPool, category_id: i64) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM news WHERE category_id = ? AND status = 'published'",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await
    .context("Failed to count news by category")?;

    Ok(row.get("count"))
}

async fn update_news_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdateNewsInput,
    actor_id: i64,
) -> Result<News> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get news for update")?;

    let existing = match row {
        Some(row) => row_to_news_mysql(&row)?,
        None => anyhow::bail!("News not found: {}", id),
    };

    let news = merge_update(&existing, input, actor_id);
    persist_news_mysql(&mut tx, &news, RevisionEvent::Updated, actor_id).await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn set_status_mysql(
    pool: &MySqlPool,
    id: i64,
    status: EntityStatus,
    event: RevisionEvent,
    actor_id: i64,
) -> Result<News> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get news for status change")?;

    let mut news = match row {
        Some(row) => row_to_news_mysql(&row)?,
        None => anyhow::bail!("News not found: {}", id),
    };

    news.status = status;
    news.updated_by = Some(actor_id);
    news.updated_at = Utc::now();
    persist_news_mysql(&mut tx, &news, event, actor_id).await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn overwrite_news_mysql(
    pool: &MySqlPool,
    id: i64,
    snapshot: &NewsSnapshot,
    actor_id: i64,
) -> Result<News> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get news for overwrite")?;

    let mut news = match row {
        Some(row) => row_to_news_mysql(&row)?,
        None => anyhow::bail!("News not found: {}", id),
    };

    news.apply_snapshot(snapshot);
    news.updated_by = Some(actor_id);
    news.updated_at = Utc::now();
    persist_news_mysql(&mut tx, &news, RevisionEvent::Updated, actor_id).await?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(news)
}

async fn persist_news_mysql(
    tx: &mut sqlx::MySqlConnection,
    news: &News,
    event: RevisionEvent,
    actor_id: i64,
) -> Result<()> {
    sqlx::query(UPDATE_SQL)
        .bind(news.category_id)
        .bind(&news.title)
        .bind(&news.title_second)
        .bind(&news.slug)
        .bind(&news.summary)
        .bind(&news.body)
        .bind(&news.image)
        .bind(&news.tags)
        .bind(news.status.as_str())
        .bind(news.updated_by)
        .bind(news.updated_at)
        .bind(news.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update news")?;

    insert_revision_mysql(
        tx,
        SUBJECT_NEWS,
        news.id,
        event,
        &news.snapshot(),
        actor_id,
    )
    .await?;

    Ok(())
}

async fn exists_by_slug_mysql(
    pool: &MySqlPool,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let count: i64 = match exclude_id {
        Some(id) => {
            let row = sqlx::query("SELECT COUNT(*) as count FROM news WHERE slug = ? AND id != ?")
                .bind(slug)
                .bind(id)
                .fetch_one(pool)
                .await
                .context("Failed to check slug existence")?;
            row.get("count")
        }
        None => {
            let row = sqlx::query("SELECT COUNT(*) as count FROM news WHERE slug = ?")
                .bind(slug)
                .fetch_one(pool)
                .await
                .context("Failed to check slug existence")?;
            row.get("count")
        }
    };
    Ok(count > 0)
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> Result<News> {
    let status_str: String = row.get("status");
    let status = EntityStatus::from_str(&status_str)?;

    Ok(News {
        id: row.get("id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        title_second: row.get("title_second"),
        slug: row.get("slug"),
        summary: row.get("summary"),
        body: row.get("body"),
        image: row.get("image"),
        tags: row.get("tags"),
        status,
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
