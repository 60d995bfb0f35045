//! User service
//!
//! Business logic for account management and authentication:
//! - Registration (first user becomes admin)
//! - Login/logout with opaque session tokens
//! - Session validation for the auth middleware
//! - Account lifecycle (partial update, soft delete, restore)

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Actor, EntityStatus, ListParams, PagedResult, Session, UpdateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::policy::{self, PolicyError};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Default session lifetime in days
const DEFAULT_SESSION_LIFETIME_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Missing or insufficient privileges
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(i64),

    /// Malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    Exists(String),

    /// Underlying persistence error
    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<PolicyError> for UserServiceError {
    fn from(e: PolicyError) -> Self {
        UserServiceError::Unauthorized(e.to_string())
    }
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// User service for managing accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_lifetime_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime_days: DEFAULT_SESSION_LIFETIME_DAYS,
        }
    }

    /// Register a new user.
    ///
    /// The first registered account becomes an admin; all later accounts are
    /// regular users.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::Exists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::Exists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let is_first = self
            .user_repo
            .count_all()
            .await
            .context("Failed to count users")?
            == 0;
        let role = if is_first {
            UserRole::Admin
        } else {
            UserRole::Regular
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(
            input.username,
            input.email,
            password_hash,
            input.first_name,
            input.last_name,
            role,
        );

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Login with email and password.
    ///
    /// An account whose status is not published cannot log in, even with
    /// valid credentials.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationFailed("Invalid email or password".to_string())
            })?;

        let password_valid =
            verify_password(password, &user.password_hash).context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::AuthenticationFailed(
                "Invalid email or password".to_string(),
            ));
        }

        if !user.status.is_published() {
            return Err(UserServiceError::Unauthorized(
                "Account is not published".to_string(),
            ));
        }

        let session = Session::new(user.id, self.session_lifetime_days);
        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    /// Logout (invalidate the session token)
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are removed lazily and treated as absent.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// List published users (public read path)
    pub async fn get_all(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        let items = self
            .user_repo
            .list_published(params.offset(), params.limit())
            .await
            .context("Failed to list users")?;
        let total = self
            .user_repo
            .count_published()
            .await
            .context("Failed to count users")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Get a published user by id (public read path)
    pub async fn get_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.user_repo
            .get_published_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))
    }

    /// Partially update a user account.
    ///
    /// Regular users may only update themselves; admins may update anyone.
    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        policy::require_self_or_admin(actor, id)?;

        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))?;

        if let Some(ref username) = input.username {
            validate_username(username)?;
            if username != &user.username {
                if self
                    .user_repo
                    .get_by_username(username)
                    .await
                    .context("Failed to check username")?
                    .is_some()
                {
                    return Err(UserServiceError::Exists(format!(
                        "Username '{}' is already taken",
                        username
                    )));
                }
                user.username = username.clone();
            }
        }

        if let Some(ref email) = input.email {
            validate_email(email)?;
            if email != &user.email {
                if self
                    .user_repo
                    .get_by_email(email)
                    .await
                    .context("Failed to check email")?
                    .is_some()
                {
                    return Err(UserServiceError::Exists(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
                user.email = email.clone();
            }
        }

        if let Some(ref password) = input.password {
            validate_password(password)?;
            user.password_hash = hash_password(password).context("Failed to hash password")?;
        }

        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }

        user.updated_at = Utc::now();

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        Ok(updated)
    }

    /// Soft-delete a user (admin only)
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), UserServiceError> {
        policy::require_admin(actor)?;

        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))?;

        user.status = EntityStatus::Trashed;
        user.updated_at = Utc::now();
        self.user_repo
            .update(&user)
            .await
            .context("Failed to trash user")?;

        Ok(())
    }

    /// Restore a soft-deleted user to the published state (admin only)
    pub async fn restore(&self, actor: &Actor, id: i64) -> Result<User, UserServiceError> {
        policy::require_admin(actor)?;

        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))?;

        user.status = EntityStatus::Published;
        user.updated_at = Utc::now();
        let restored = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to restore user")?;

        Ok(restored)
    }

    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), UserServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 50 {
        return Err(UserServiceError::Validation(
            "Username must be between 3 and 50 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(UserServiceError::Validation(
            "Username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    let email = email.trim();
    if email.len() > 255 || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(UserServiceError::Validation(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.len() < 8 {
        return Err(UserServiceError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn register_input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup().await;

        let first = service
            .register(register_input("first", "first@x.com"))
            .await
            .expect("register failed");
        assert_eq!(first.role, UserRole::Admin);

        let second = service
            .register(register_input("second", "second@x.com"))
            .await
            .expect("register failed");
        assert_eq!(second.role, UserRole::Regular);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = setup().await;

        service
            .register(register_input("taken", "taken@x.com"))
            .await
            .expect("register failed");

        let dup_name = service
            .register(register_input("taken", "other@x.com"))
            .await;
        assert!(matches!(dup_name, Err(UserServiceError::Exists(_))));

        let dup_email = service
            .register(register_input("other", "taken@x.com"))
            .await;
        assert!(matches!(dup_email, Err(UserServiceError::Exists(_))));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let service = setup().await;

        let mut input = register_input("ab", "short@x.com");
        let result = service.register(input.clone()).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));

        input = register_input("goodname", "not-an-email");
        let result = service.register(input.clone()).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));

        input = register_input("goodname", "good@x.com");
        input.password = "short".to_string();
        let result = service.register(input).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let service = setup().await;

        let user = service
            .register(register_input("login", "login@x.com"))
            .await
            .expect("register failed");

        let (logged_in, session) = service
            .login("login@x.com", "password123")
            .await
            .expect("login failed");
        assert_eq!(logged_in.id, user.id);

        let validated = service
            .validate_session(&session.id)
            .await
            .expect("validate failed")
            .expect("session should resolve");
        assert_eq!(validated.id, user.id);

        service.logout(&session.id).await.expect("logout failed");
        assert!(service
            .validate_session(&session.id)
            .await
            .expect("validate failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup().await;

        service
            .register(register_input("secure", "secure@x.com"))
            .await
            .expect("register failed");

        let result = service.login("secure@x.com", "wrongpassword").await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_trashed_user_cannot_login() {
        let service = setup().await;

        let admin = service
            .register(register_input("admin", "admin@x.com"))
            .await
            .expect("register failed");
        let victim = service
            .register(register_input("victim", "victim@x.com"))
            .await
            .expect("register failed");

        service
            .delete(&admin.actor(), victim.id)
            .await
            .expect("delete failed");

        let result = service.login("victim@x.com", "password123").await;
        assert!(matches!(result, Err(UserServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_delete_then_restore_is_published_again() {
        let service = setup().await;

        let admin = service
            .register(register_input("boss", "boss@x.com"))
            .await
            .expect("register failed");
        let user = service
            .register(register_input("worker", "worker@x.com"))
            .await
            .expect("register failed");

        service
            .delete(&admin.actor(), user.id)
            .await
            .expect("delete failed");
        assert!(matches!(
            service.get_by_id(user.id).await,
            Err(UserServiceError::NotFound(_))
        ));

        let restored = service
            .restore(&admin.actor(), user.id)
            .await
            .expect("restore failed");
        assert_eq!(restored.status, EntityStatus::Published);

        // restore is idempotent
        let restored_again = service
            .restore(&admin.actor(), user.id)
            .await
            .expect("restore failed");
        assert_eq!(restored_again.status, EntityStatus::Published);
    }

    #[tokio::test]
    async fn test_delete_requires_admin_before_existence_check() {
        let service = setup().await;

        service
            .register(register_input("root", "root@x.com"))
            .await
            .expect("register failed");
        let regular = service
            .register(register_input("plain", "plain@x.com"))
            .await
            .expect("register failed");

        // missing id, wrong role: authorization must win
        let result = service.delete(&regular.actor(), 9999).await;
        assert!(matches!(result, Err(UserServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_partial_patch() {
        let service = setup().await;

        let user = service
            .register(register_input("patcher", "patcher@x.com"))
            .await
            .expect("register failed");

        let input = UpdateUserInput {
            first_name: Some("Grace".to_string()),
            ..Default::default()
        };
        let updated = service
            .update(&user.actor(), user.id, input)
            .await
            .expect("update failed");

        assert_eq!(updated.first_name, "Grace");
        assert_eq!(updated.last_name, "User"); // Unchanged
        assert_eq!(updated.username, "patcher"); // Unchanged
    }

    #[tokio::test]
    async fn test_update_other_requires_admin() {
        let service = setup().await;

        service
            .register(register_input("one", "one@x.com"))
            .await
            .expect("register failed");
        let a = service
            .register(register_input("usera", "usera@x.com"))
            .await
            .expect("register failed");
        let b = service
            .register(register_input("userb", "userb@x.com"))
            .await
            .expect("register failed");

        let input = UpdateUserInput {
            first_name: Some("Hacked".to_string()),
            ..Default::default()
        };
        let result = service.update(&a.actor(), b.id, input).await;
        assert!(matches!(result, Err(UserServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_get_all_filters_published() {
        let service = setup().await;

        let admin = service
            .register(register_input("chief", "chief@x.com"))
            .await
            .expect("register failed");
        let user = service
            .register(register_input("listed", "listed@x.com"))
            .await
            .expect("register failed");
        service
            .delete(&admin.actor(), user.id)
            .await
            .expect("delete failed");

        let page = service
            .get_all(&ListParams::default())
            .await
            .expect("list failed");
        assert_eq!(page.total, 1);
        assert!(page.items.iter().all(|u| u.username == "chief"));
    }
}
