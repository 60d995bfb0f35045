//! Access policy gate
//!
//! Role checks applied by services before anything else, including entity
//! existence lookups, so a caller with the wrong role always gets an
//! authorization error and never learns whether an id exists.
//!
//! Authentication itself happens at the API layer; services express the
//! requirement by taking an [`Actor`] argument.

use crate::models::Actor;

/// Error type for policy violations
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The operation requires the admin role
    #[error("Admin privileges required")]
    AdminRequired,

    /// The operation is limited to the account owner or an admin
    #[error("Not allowed to manage another user's account")]
    NotAccountOwner,
}

/// Require the admin role.
pub fn require_admin(actor: &Actor) -> Result<(), PolicyError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(PolicyError::AdminRequired)
    }
}

/// Require that the actor is the given user, or an admin.
pub fn require_self_or_admin(actor: &Actor, user_id: i64) -> Result<(), PolicyError> {
    if actor.is_admin() || actor.id == user_id {
        Ok(())
    } else {
        Err(PolicyError::NotAccountOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn admin() -> Actor {
        Actor {
            id: 1,
            role: UserRole::Admin,
        }
    }

    fn regular(id: i64) -> Actor {
        Actor {
            id,
            role: UserRole::Regular,
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&admin()).is_ok());
        assert!(require_admin(&regular(2)).is_err());
    }

    #[test]
    fn test_require_self_or_admin() {
        assert!(require_self_or_admin(&admin(), 99).is_ok());
        assert!(require_self_or_admin(&regular(2), 2).is_ok());
        assert!(require_self_or_admin(&regular(2), 3).is_err());
    }
}
