//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database and remote service implementations
//!
//! ## Features
//! - Local username/password verification (Argon2id)
//! - Remote "cabinet" identity backend as a fallback, with local
//!   auto-provisioning on first remote success
//! - Best-effort cabinet mirroring of local registrations
//! - Signed, expiring password-reset tokens (stateless verification)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Reset tokens are HMAC-SHA256 signed and bound to one user
//! - Login rejection is a single generic outcome; callers never learn
//!   whether the local store or the cabinet rejected the attempt

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::log_in::{LogInInput, LogInOutcome, LogInUseCase};
pub use error::{AuthError, AuthResult};
pub use infra::cabinet::CabinetClient;
pub use infra::postgres::PgUserRepository;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

pub mod store {
    pub use crate::infra::postgres::PgUserRepository as UserStore;
}

#[cfg(test)]
mod tests;
