//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Remote cabinet failures are not represented here: they are swallowed
//! at the client boundary (see `infra::cabinet`), logged, and collapsed
//! into an ordinary authentication failure. Only token errors remain
//! user-distinguishable, because "expired" and "invalid" call for
//! different remediation.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password, unknown user, or cabinet rejection)
    #[error("Wrong username or password")]
    InvalidCredentials,

    /// User name already exists (registration)
    #[error("User name already exists")]
    UserNameTaken,

    /// Storage uniqueness violation during auto-provisioning
    #[error("Account already provisioned")]
    DuplicateAccount,

    /// Reset requested for an email that matches no account
    #[error("This email address is not linked with any account")]
    EmailNotLinked,

    /// Reset token signature or identity binding failed
    #[error("Password reset token is invalid")]
    TokenInvalid,

    /// Reset token signature is intact but the window elapsed
    #[error("Password reset token is expired")]
    TokenExpired,

    /// Input validation error (user name, email)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::UserNameTaken | AuthError::DuplicateAccount => ErrorKind::Conflict,
            AuthError::EmailNotLinked => ErrorKind::NotFound,
            AuthError::TokenInvalid => ErrorKind::UnprocessableEntity,
            AuthError::TokenExpired => ErrorKind::Gone,
            AuthError::Validation(_) | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError for the surrounding web layer
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenInvalid => {
                tracing::warn!("Invalid password reset token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
