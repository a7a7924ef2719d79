//! Forgot Password Use Case
//!
//! Issues a reset token for the account behind an email address and
//! hands it to the notifier. Unknown and malformed addresses get the
//! same answer, so the endpoint cannot be used to probe which emails
//! have accounts.

use crate::application::config::AuthConfig;
use crate::domain::notify::ResetNotifier;
use crate::domain::repository::UserRepository;
use crate::domain::token::ResetTokenService;
use crate::domain::value_object::Email;
use crate::error::{AuthError, AuthResult};
use std::sync::Arc;

pub struct ForgotPasswordUseCase<U, N>
where
    U: UserRepository,
    N: ResetNotifier,
{
    user_repo: Arc<U>,
    notifier: Arc<N>,
    tokens: ResetTokenService,
}

impl<U, N> ForgotPasswordUseCase<U, N>
where
    U: UserRepository,
    N: ResetNotifier,
{
    pub fn new(user_repo: Arc<U>, notifier: Arc<N>, config: &AuthConfig) -> Self {
        Self {
            user_repo,
            notifier,
            tokens: ResetTokenService::new(config.reset_token_secret, config.reset_token_ttl_ms()),
        }
    }

    /// Issue and deliver a reset token for the given email.
    ///
    /// `EmailNotLinked` covers both "no such account" and "not a valid
    /// address". The sentinel `"unknown"` never parses as an email, so
    /// provisioned accounts without a real address cannot be targeted
    /// here.
    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email).map_err(|_| AuthError::EmailNotLinked)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::EmailNotLinked)?;

        let token = self.tokens.issue(&user);
        self.notifier.deliver_reset_token(&user, &token).await?;

        tracing::info!(
            user_name = %user.user_name.canonical(),
            "Issued password reset token"
        );

        Ok(())
    }
}
