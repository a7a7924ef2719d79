//! Account Provisioner
//!
//! Creates a local account for a login the cabinet just accepted. The
//! cabinet is the source of truth for the credentials at that moment;
//! the local row lets subsequent logins resolve without a remote call.

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, RawPassword, UserName, UserPassword};
use crate::domain::User;
use crate::error::{AuthError, AuthResult};
use std::sync::Arc;

pub struct AccountProvisioner<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> AccountProvisioner<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Create a local account from cabinet-verified credentials.
    ///
    /// The email comes from the cabinet response; when absent or
    /// unparseable the sentinel `"unknown"` is stored instead. The
    /// password is hashed locally so the next login verifies without
    /// the cabinet.
    ///
    /// A concurrent provision of the same login surfaces as
    /// `AuthError::DuplicateAccount`; callers re-check the local store.
    pub async fn provision(
        &self,
        login: &str,
        password: &str,
        remote_email: Option<String>,
    ) -> AuthResult<User> {
        let user_name = UserName::new(login)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let email = remote_email
            .and_then(|raw| Email::new(raw).ok())
            .unwrap_or_else(Email::unknown);

        let raw = RawPassword::new(password.to_string())
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;
        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;

        let user = User::new(user_name, email, password_hash, self.config.default_group);
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_name = %user.user_name.canonical(),
            has_email = !user.email.is_unknown(),
            "Provisioned local account from cabinet credentials"
        );

        Ok(user)
    }
}
