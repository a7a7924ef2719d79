//! Register Use Case
//!
//! Creates a local account and mirrors it to the cabinet. The local
//! insert is authoritative; the remote mirror is best-effort and its
//! failure never rolls back the local account.

use crate::application::config::AuthConfig;
use crate::domain::cabinet::IdentityBackend;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, RawPassword, UserName, UserPassword};
use crate::domain::User;
use crate::error::{AuthError, AuthResult};
use std::sync::Arc;

/// Registration request
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<U, C>
where
    U: UserRepository,
    C: IdentityBackend,
{
    user_repo: Arc<U>,
    cabinet: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<U, C> RegisterUseCase<U, C>
where
    U: UserRepository,
    C: IdentityBackend,
{
    pub fn new(user_repo: Arc<U>, cabinet: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            cabinet,
            config,
        }
    }

    /// Register a new account.
    ///
    /// Validation happens before any store access. The user-name
    /// uniqueness check races with concurrent inserts; the database
    /// constraint is the backstop and both paths report
    /// `UserNameTaken`.
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let user_name = UserName::new(&input.user_name)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let email =
            Email::new(&input.email).map_err(|e| AuthError::Validation(e.message().to_string()))?;
        let raw = RawPassword::new(input.password.clone())
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;

        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }

        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;
        let user = User::new(user_name, email, password_hash, self.config.default_group);

        match self.user_repo.create(&user).await {
            Ok(()) => {}
            Err(AuthError::DuplicateAccount) => return Err(AuthError::UserNameTaken),
            Err(e) => return Err(e),
        }

        tracing::info!(
            user_name = %user.user_name.canonical(),
            "Registered new account"
        );

        let mirrored = self
            .cabinet
            .register(
                user.user_name.original(),
                &input.password,
                user.email.as_str(),
            )
            .await;
        if !mirrored {
            tracing::warn!(
                user_name = %user.user_name.canonical(),
                "Cabinet registration mirror failed, local account kept"
            );
        }

        Ok(user)
    }
}
