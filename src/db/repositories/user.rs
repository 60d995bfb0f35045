//! User repository
//!
//! Database operations for user accounts.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{EntityStatus, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get a user by ID regardless of status
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a published user by ID (public read path)
    async fn get_published_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List published users with pagination
    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<User>>;

    /// Count published users
    async fn count_published(&self) -> Result<i64>;

    /// Count all users regardless of status
    async fn count_all(&self) -> Result<i64>;

    /// Persist the full state of an existing user
    async fn update(&self, user: &User) -> Result<User>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => create_user_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, false).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_id_mysql(self.pool.as_mysql().unwrap(), id, false).await
            }
        }
    }

    async fn get_published_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, true).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_id_mysql(self.pool.as_mysql().unwrap(), id, true).await
            }
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_field_sqlite(self.pool.as_sqlite().unwrap(), "username", username).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_field_mysql(self.pool.as_mysql().unwrap(), "username", username).await
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_field_sqlite(self.pool.as_sqlite().unwrap(), "email", email).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_field_mysql(self.pool.as_mysql().unwrap(), "email", email).await
            }
        }
    }

    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
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
            DatabaseDriver::Sqlite => {
                count_users_sqlite(self.pool.as_sqlite().unwrap(), true).await
            }
            DatabaseDriver::Mysql => count_users_mysql(self.pool.as_mysql().unwrap(), true).await,
        }
    }

    async fn count_all(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_users_sqlite(self.pool.as_sqlite().unwrap(), false).await
            }
            DatabaseDriver::Mysql => count_users_mysql(self.pool.as_mysql().unwrap(), false).await,
        }
    }

    async fn update(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_user_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => update_user_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }
}

const SELECT_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, role, status, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, first_name, last_name, role, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.to_string())
    .bind(user.status.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    let mut created = user.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_user_by_id_sqlite(
    pool: &SqlitePool,
    id: i64,
    published_only: bool,
) -> Result<Option<User>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM users WHERE id = ? AND status = 'published'",
            SELECT_COLUMNS
        )
    } else {
        format!("SELECT {} FROM users WHERE id = ?", SELECT_COLUMNS)
    };

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_user_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_user_by_field_sqlite(
    pool: &SqlitePool,
    field: &str,
    value: &str,
) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE {} = ?",
        SELECT_COLUMNS, field
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get user by {}", field))?;

    match row {
        Some(row) => Ok(Some(row_to_user_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_published_sqlite(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users WHERE status = 'published' ORDER BY id ASC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published users")?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row_to_user_sqlite(&row)?);
    }

    Ok(users)
}

async fn count_users_sqlite(pool: &SqlitePool, published_only: bool) -> Result<i64> {
    let query = if published_only {
        "SELECT COUNT(*) as count FROM users WHERE status = 'published'"
    } else {
        "SELECT COUNT(*) as count FROM users"
    };

    let row = sqlx::query(query)
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn update_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, first_name = ?, last_name = ?,
            role = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.to_string())
    .bind(user.status.as_str())
    .bind(user.updated_at)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("User not found: {}", user.id);
    }

    Ok(user.clone())
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)?;
    let status_str: String = row.get("status");
    let status = EntityStatus::from_str(&status_str)?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role,
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, first_name, last_name, role, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.to_string())
    .bind(user.status.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    let mut created = user.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_user_by_id_mysql(
    pool: &MySqlPool,
    id: i64,
    published_only: bool,
) -> Result<Option<User>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM users WHERE id = ? AND status = 'published'",
            SELECT_COLUMNS
        )
    } else {
        format!("SELECT {} FROM users WHERE id = ?", SELECT_COLUMNS)
    };

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_user_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_user_by_field_mysql(
    pool: &MySqlPool,
    field: &str,
    value: &str,
) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE {} = ?",
        SELECT_COLUMNS, field
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get user by {}", field))?;

    match row {
        Some(row) => Ok(Some(row_to_user_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_published_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users WHERE status = 'published' ORDER BY id ASC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list published users")?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row_to_user_mysql(&row)?);
    }

    Ok(users)
}

async fn count_users_mysql(pool: &MySqlPool, published_only: bool) -> Result<i64> {
    let query = if published_only {
        "SELECT COUNT(*) as count FROM users WHERE status = 'published'"
    } else {
        "SELECT COUNT(*) as count FROM users"
    };

    let row = sqlx::query(query)
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn update_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, first_name = ?, last_name = ?,
            role = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.to_string())
    .bind(user.status.as_str())
    .bind(user.updated_at)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("User not found: {}", user.id);
    }

    Ok(user.clone())
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)?;
    let status_str: String = row.get("status");
    let status = EntityStatus::from_str(&status_str)?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role,
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn sample_user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            "hash".to_string(),
            "First".to_string(),
            "Last".to_string(),
            UserRole::Regular,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (_pool, repo) = setup().await;

        let created = repo
            .create(&sample_user("alice", "alice@x.com"))
            .await
            .expect("create failed");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("get failed")
            .expect("not found");
        assert_eq!(found.username, "alice");
        assert_eq!(found.role, UserRole::Regular);
        assert_eq!(found.status, EntityStatus::Published);
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let (_pool, repo) = setup().await;

        repo.create(&sample_user("bob", "bob@x.com"))
            .await
            .expect("create failed");

        assert!(repo
            .get_by_username("bob")
            .await
            .expect("get failed")
            .is_some());
        assert!(repo
            .get_by_email("bob@x.com")
            .await
            .expect("get failed")
            .is_some());
        assert!(repo
            .get_by_email("nobody@x.com")
            .await
            .expect("get failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (_pool, repo) = setup().await;

        repo.create(&sample_user("carol", "carol@x.com"))
            .await
            .expect("create failed");
        let result = repo.create(&sample_user("carol2", "carol@x.com")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_published_excludes_trashed() {
        let (_pool, repo) = setup().await;

        repo.create(&sample_user("visible", "v@x.com"))
            .await
            .expect("create failed");
        let mut trashed = sample_user("gone", "g@x.com");
        trashed.status = EntityStatus::Trashed;
        repo.create(&trashed).await.expect("create failed");

        let users = repo.list_published(0, 10).await.expect("list failed");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "visible");
        assert_eq!(repo.count_published().await.expect("count failed"), 1);
        assert_eq!(repo.count_all().await.expect("count failed"), 2);
    }

    #[tokio::test]
    async fn test_update_user_status() {
        let (_pool, repo) = setup().await;

        let mut user = repo
            .create(&sample_user("dave", "dave@x.com"))
            .await
            .expect("create failed");

        user.status = EntityStatus::Trashed;
        repo.update(&user).await.expect("update failed");

        let found = repo
            .get_by_id(user.id)
            .await
            .expect("get failed")
            .expect("not found");
        assert_eq!(found.status, EntityStatus::Trashed);
        assert!(repo
            .get_published_by_id(user.id)
            .await
            .expect("get failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_fails() {
        let (_pool, repo) = setup().await;

        let mut phantom = sample_user("ghost", "ghost@x.com");
        phantom.id = 999;
        assert!(repo.update(&phantom).await.is_err());
    }
}
