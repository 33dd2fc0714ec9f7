//! Consistency core: every mutation that touches the post/comment/reaction
//! invariants goes through here. Functions are generic over the store traits
//! so the same code runs on Postgres and, in tests, on `db::memory`.

pub mod chat;
pub mod comment;
pub mod post;
pub mod reaction;
pub mod user;

use uuid::Uuid;

use crate::error::{ErrorMessage, ServiceError};
use crate::models::{User, UserRole};

/// Identity and role of the caller, as resolved by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Actor { id, role }
    }

    /// Owner-or-admin check
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.role == UserRole::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor::new(user.id, user.role)
    }
}

/// Map a failed insert whose parent row vanished to `NotFound`
///
/// Postgres reports it as a foreign key violation, the in-memory store as
/// `RowNotFound`.
pub(crate) fn missing_parent(e: sqlx::Error, message: ErrorMessage) -> ServiceError {
    match &e {
        sqlx::Error::RowNotFound => ServiceError::NotFound(message),
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            ServiceError::NotFound(message)
        }
        _ => ServiceError::Persistence(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_or_admin_may_modify() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(Actor::new(owner, UserRole::User).can_modify(owner));
        assert!(!Actor::new(other, UserRole::User).can_modify(owner));
        assert!(Actor::new(other, UserRole::Admin).can_modify(owner));
    }
}
