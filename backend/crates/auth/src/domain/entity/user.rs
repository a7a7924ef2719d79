//! User Entity
//!
//! A local account. Accounts exist either because the user registered
//! here directly or because they were auto-provisioned after a
//! successful cabinet authentication.

use crate::domain::value_object::{Email, PrimaryGroup, UserId, UserName, UserPassword};
use chrono::{DateTime, Utc};

/// User entity (aggregate root)
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
    pub password_hash: UserPassword,
    pub primary_group: PrimaryGroup,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(
        user_name: UserName,
        email: Email,
        password_hash: UserPassword,
        primary_group: PrimaryGroup,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password_hash,
            primary_group,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstruct from database row
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        user_id: UserId,
        user_name: UserName,
        email: Email,
        password_hash: UserPassword,
        primary_group: PrimaryGroup,
        last_login_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            user_name,
            email,
            password_hash,
            primary_group,
            last_login_at,
            created_at,
            updated_at,
        }
    }

    /// Record a successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Replace the password hash
    pub fn update_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Whether this account still carries the sentinel email
    pub fn has_unknown_email(&self) -> bool {
        self.email.is_unknown()
    }
}
