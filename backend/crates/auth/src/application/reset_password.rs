//! Reset Password Use Case
//!
//! Consumes a token issued by the forgot-password flow and sets a new
//! password. The account is looked up by email again, so the token
//! alone is not enough; the caller must also know the address it was
//! sent to.

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::token::ResetTokenService;
use crate::domain::value_object::{Email, RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};
use std::sync::Arc;

/// Reset request
#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    tokens: ResetTokenService,
}

impl<U> ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        let tokens =
            ResetTokenService::new(config.reset_token_secret, config.reset_token_ttl_ms());
        Self {
            user_repo,
            config,
            tokens,
        }
    }

    /// Verify the token and replace the password.
    ///
    /// Check order is fixed: account lookup, token integrity, token
    /// expiry, then password policy. An invalid token is reported as
    /// `TokenInvalid` even when it would also be expired.
    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        let email = Email::new(&input.email).map_err(|_| AuthError::EmailNotLinked)?;

        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::EmailNotLinked)?;

        let check = self.tokens.verify(&user, &input.token);
        if check.invalid {
            return Err(AuthError::TokenInvalid);
        }
        if check.expired {
            return Err(AuthError::TokenExpired);
        }

        let raw = RawPassword::new(input.new_password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;
        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;

        user.update_password(password_hash);
        self.user_repo.update(&user).await?;

        tracing::info!(
            user_name = %user.user_name.canonical(),
            "Password reset completed"
        );

        Ok(())
    }
}
