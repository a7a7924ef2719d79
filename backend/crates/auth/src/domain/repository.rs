//! Repository Traits
//!
//! Persistence boundary for the local credential store. Implemented by
//! `infra::postgres::PgUserRepository` and by in-memory doubles in
//! tests.

use crate::domain::entity::User;
use crate::domain::value_object::{Email, UserName};
use crate::error::AuthResult;

/// Local user store
///
/// Lookups by name use the canonical (lowercased) form; lookups by
/// email match the stored address exactly, so the sentinel `"unknown"`
/// can collide across provisioned accounts and must not be used as a
/// lookup key by callers.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. Fails with `AuthError::DuplicateAccount` when
    /// the canonical user name is already taken.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find by user name (canonical match)
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find by email address (exact match)
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Whether the canonical user name is already taken
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    /// Persist changes to an existing user
    async fn update(&self, user: &User) -> AuthResult<()>;
}
