//! Revision repository
//!
//! Read side of the append-only revision ledger, plus the insert helpers the
//! news repository calls inside its own transactions so an entity mutation
//! and its ledger entry commit atomically. Nothing ever updates or deletes a
//! revision row.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{NewsSnapshot, Revision, RevisionEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlConnection, MySqlPool, Row, SqliteConnection, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Revision repository trait
#[async_trait]
pub trait RevisionRepository: Send + Sync {
    /// Get a revision by its id
    async fn get_by_id(&self, id: i64) -> Result<Option<Revision>>;

    /// List all revisions of one subject, newest first
    async fn list_by_subject(&self, subject_type: &str, subject_id: i64) -> Result<Vec<Revision>>;
}

/// SQLx-based revision repository implementation
pub struct SqlxRevisionRepository {
    pool: DynDatabasePool,
}

impl SqlxRevisionRepository {
    /// Create a new SQLx revision repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RevisionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RevisionRepository for SqlxRevisionRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Revision>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_revision_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_revision_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_by_subject(&self, subject_type: &str, subject_id: i64) -> Result<Vec<Revision>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_subject_sqlite(self.pool.as_sqlite().unwrap(), subject_type, subject_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                list_by_subject_mysql(self.pool.as_mysql().unwrap(), subject_type, subject_id)
                    .await
            }
        }
    }
}

// ============================================================================
// Insert helpers (called from inside entity transactions)
// ============================================================================

const INSERT_SQL: &str = r#"
    INSERT INTO revisions (subject_type, subject_id, event, snapshot, caused_by, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

/// Append a ledger entry on a SQLite connection (usually a transaction).
pub(crate) async fn insert_revision_sqlite(
    conn: &mut SqliteConnection,
    subject_type: &str,
    subject_id: i64,
    event: RevisionEvent,
    snapshot: &NewsSnapshot,
    caused_by: i64,
) -> Result<()> {
    let payload = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;

    sqlx::query(INSERT_SQL)
        .bind(subject_type)
        .bind(subject_id)
        .bind(event.as_str())
        .bind(&payload)
        .bind(caused_by)
        .bind(Utc::now())
        .execute(conn)
        .await
        .context("Failed to append revision")?;

    Ok(())
}

/// Append a ledger entry on a MySQL connection (usually a transaction).
pub(crate) async fn insert_revision_mysql(
    conn: &mut MySqlConnection,
    subject_type: &str,
    subject_id: i64,
    event: RevisionEvent,
    snapshot: &NewsSnapshot,
    caused_by: i64,
) -> Result<()> {
    let payload = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;

    sqlx::query(INSERT_SQL)
        .bind(subject_type)
        .bind(subject_id)
        .bind(event.as_str())
        .bind(&payload)
        .bind(caused_by)
        .bind(Utc::now())
        .execute(conn)
        .await
        .context("Failed to append revision")?;

    Ok(())
}

// ============================================================================
// SQLite implementations
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, subject_type, subject_id, event, snapshot, caused_by, created_at";

async fn get_revision_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Revision>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM revisions WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get revision by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_revision_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_by_subject_sqlite(
    pool: &SqlitePool,
    subject_type: &str,
    subject_id: i64,
) -> Result<Vec<Revision>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM revisions WHERE subject_type = ? AND subject_id = ? ORDER BY id DESC",
        SELECT_COLUMNS
    ))
    .bind(subject_type)
    .bind(subject_id)
    .fetch_all(pool)
    .await
    .context("Failed to list revisions")?;

    let mut revisions = Vec::new();
    for row in rows {
        revisions.push(row_to_revision_sqlite(&row)?);
    }

    Ok(revisions)
}

fn row_to_revision_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Revision> {
    let event_str: String = row.get("event");
    let event = RevisionEvent::from_str(&event_str)?;

    let payload: String = row.get("snapshot");
    let snapshot: NewsSnapshot =
        serde_json::from_str(&payload).context("Failed to deserialize revision snapshot")?;

    Ok(Revision {
        id: row.get("id"),
        subject_type: row.get("subject_type"),
        subject_id: row.get("subject_id"),
        event,
        snapshot,
        caused_by: row.get("caused_by"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_revision_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Revision>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM revisions WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get revision by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_revision_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_by_subject_mysql(
    pool: &MySqlPool,
    subject_type: &str,
    subject_id: i64,
) -> Result<Vec<Revision>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM revisions WHERE subject_type = ? AND subject_id = ? ORDER BY id DESC",
        SELECT_COLUMNS
    ))
    .bind(subject_type)
    .bind(subject_id)
    .fetch_all(pool)
    .await
    .context("Failed to list revisions")?;

    let mut revisions = Vec::new();
    for row in rows {
        revisions.push(row_to_revision_mysql(&row)?);
    }

    Ok(revisions)
}

fn row_to_revision_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Revision> {
    let event_str: String = row.get("event");
    let event = RevisionEvent::from_str(&event_str)?;

    let payload: String = row.get("snapshot");
    let snapshot: NewsSnapshot =
        serde_json::from_str(&payload).context("Failed to deserialize revision snapshot")?;

    Ok(Revision {
        id: row.get("id"),
        subject_type: row.get("subject_type"),
        subject_id: row.get("subject_id"),
        event,
        snapshot,
        caused_by: row.get("caused_by"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{EntityStatus, SUBJECT_NEWS};

    async fn setup() -> (crate::db::DynDatabasePool, SqlxRevisionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxRevisionRepository::new(pool.clone());
        (pool, repo)
    }

    fn sample_snapshot(title: &str) -> NewsSnapshot {
        NewsSnapshot {
            title: title.to_string(),
            title_second: String::new(),
            slug: title.to_lowercase().replace(' ', "-"),
            summary: String::new(),
            body: "body".to_string(),
            image: None,
            tags: String::new(),
            status: EntityStatus::Published,
        }
    }

    async fn seed_user(pool: &SqlitePool) -> i64 {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES ('u', 'u@x.com', 'h')",
        )
        .execute(pool)
        .await
        .expect("Failed to create user");
        result.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_insert_and_get_revision() {
        let (pool, repo) = setup().await;
        let sqlite_pool = pool.as_sqlite().unwrap();
        let user_id = seed_user(sqlite_pool).await;

        let mut conn = sqlite_pool.acquire().await.expect("acquire failed");
        insert_revision_sqlite(
            &mut conn,
            SUBJECT_NEWS,
            42,
            RevisionEvent::Created,
            &sample_snapshot("First"),
            user_id,
        )
        .await
        .expect("Failed to insert revision");
        drop(conn);

        let revision = repo
            .get_by_id(1)
            .await
            .expect("Failed to get revision")
            .expect("Revision not found");

        assert_eq!(revision.subject_type, SUBJECT_NEWS);
        assert_eq!(revision.subject_id, 42);
        assert_eq!(revision.event, RevisionEvent::Created);
        assert_eq!(revision.snapshot.title, "First");
        assert_eq!(revision.caused_by, user_id);
    }

    #[tokio::test]
    async fn test_get_revision_not_found() {
        let (_pool, repo) = setup().await;
        let revision = repo.get_by_id(999).await.expect("Failed to query");
        assert!(revision.is_none());
    }

    #[tokio::test]
    async fn test_list_by_subject_newest_first() {
        let (pool, repo) = setup().await;
        let sqlite_pool = pool.as_sqlite().unwrap();
        let user_id = seed_user(sqlite_pool).await;

        let mut conn = sqlite_pool.acquire().await.expect("acquire failed");
        for title in ["One", "Two", "Three"] {
            insert_revision_sqlite(
                &mut conn,
                SUBJECT_NEWS,
                7,
                RevisionEvent::Updated,
                &sample_snapshot(title),
                user_id,
            )
            .await
            .expect("Failed to insert revision");
        }
        // A different subject, to ensure the filter holds
        insert_revision_sqlite(
            &mut conn,
            SUBJECT_NEWS,
            8,
            RevisionEvent::Created,
            &sample_snapshot("Other"),
            user_id,
        )
        .await
        .expect("Failed to insert revision");
        drop(conn);

        let revisions = repo
            .list_by_subject(SUBJECT_NEWS, 7)
            .await
            .expect("Failed to list revisions");

        assert_eq!(revisions.len(), 3);
        assert_eq!(revisions[0].snapshot.title, "Three");
        assert_eq!(revisions[2].snapshot.title, "One");
    }
}
