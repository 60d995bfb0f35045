//! User model
//!
//! This module defines the User entity, the role enum used by the access
//! policy, and the `Actor` carried through every mutating service call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::EntityStatus;

/// User entity representing a registered account.
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// User role
    pub role: UserRole,
    /// Lifecycle status
    pub status: EntityStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: the password must already be hashed before calling this.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            first_name,
            last_name,
            role,
            status: EntityStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// The actor identity of this user, passed into service calls
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

/// User role for authorization.
///
/// Admins may delete, restore and manage other accounts; regular users
/// may only create content and manage their own account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Regular user - limited to own content and account
    Regular,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Regular
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Regular => write!(f, "regular"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "regular" => Ok(UserRole::Regular),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// The authenticated identity performing an operation.
///
/// Services receive the actor explicitly instead of reading an ambient
/// authentication context; policy checks run before any entity lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Acting user id, stamped into created_by/updated_by
    pub id: i64,
    /// Acting user role
    pub role: UserRole,
}

impl Actor {
    /// Check if the actor has the admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Input for updating a user (partial patch; `None` leaves a field as-is)
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New username (optional)
    pub username: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
    /// New plaintext password (optional, will be hashed)
    pub password: Option<String>,
    /// New first name (optional)
    pub first_name: Option<String>,
    /// New last name (optional)
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole) -> User {
        User::new(
            "reporter".to_string(),
            "reporter@example.com".to_string(),
            "hashed".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            role,
        )
    }

    #[test]
    fn test_user_new_defaults() {
        let user = sample_user(UserRole::Regular);
        assert_eq!(user.id, 0);
        assert_eq!(user.status, EntityStatus::Published);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_actor_from_user() {
        let mut user = sample_user(UserRole::Admin);
        user.id = 7;
        let actor = user.actor();
        assert_eq!(actor.id, 7);
        assert!(actor.is_admin());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("Regular").unwrap(), UserRole::Regular);
        assert!(UserRole::from_str("editor").is_err());
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user(UserRole::Regular);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed"));
        assert!(!json.contains("password_hash"));
    }
}
