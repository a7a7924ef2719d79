//! Log In Use Case
//!
//! Local-first authentication with cabinet fallback. The local store
//! answers first; only when it cannot authenticate does the cabinet
//! get asked, and a cabinet-accepted login is provisioned locally so
//! the next attempt stays local.

use crate::application::config::AuthConfig;
use crate::application::provisioner::AccountProvisioner;
use crate::application::verifier::CredentialVerifier;
use crate::domain::cabinet::IdentityBackend;
use crate::domain::repository::UserRepository;
use crate::domain::User;
use crate::error::{AuthError, AuthResult};
use std::sync::Arc;

/// Login request
#[derive(Debug, Clone)]
pub struct LogInInput {
    /// User name or email address
    pub login: String,
    pub password: String,
}

/// Result of a login attempt
///
/// Rejection carries no detail. Whether the account exists, which
/// backend declined, or why is never exposed to the caller.
#[derive(Debug)]
pub enum LogInOutcome {
    Authenticated(User),
    Rejected,
}

impl LogInOutcome {
    /// Collapse the outcome into a `Result` for callers that report
    /// rejection as an error value. The error is always the generic
    /// `InvalidCredentials`, regardless of which backend declined.
    pub fn into_result(self) -> AuthResult<User> {
        match self {
            LogInOutcome::Authenticated(user) => Ok(user),
            LogInOutcome::Rejected => Err(AuthError::InvalidCredentials),
        }
    }
}

pub struct LogInUseCase<U, C>
where
    U: UserRepository,
    C: IdentityBackend,
{
    user_repo: Arc<U>,
    cabinet: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<U, C> LogInUseCase<U, C>
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

    /// Attempt to authenticate.
    ///
    /// Order is fixed: local store first, cabinet second. A local hit
    /// never triggers a remote call. Errors are infrastructure
    /// failures only; a wrong password is `Rejected`, not an error.
    pub async fn execute(&self, input: LogInInput) -> AuthResult<LogInOutcome> {
        let verifier =
            CredentialVerifier::new(Arc::clone(&self.user_repo), Arc::clone(&self.config));

        let (user, verified) = verifier.authenticate(&input.login, &input.password).await?;

        if let Some(mut user) = user {
            if verified {
                user.record_login();
                self.user_repo.update(&user).await?;
                tracing::info!(
                    user_name = %user.user_name.canonical(),
                    "Authenticated against local store"
                );
                return Ok(LogInOutcome::Authenticated(user));
            }
            // Known account, wrong password locally. The cabinet still
            // gets a chance: the remote password may be newer.
        }

        let remote = self
            .cabinet
            .authenticate(&input.login, &input.password)
            .await;

        if !remote.ok {
            return Ok(LogInOutcome::Rejected);
        }

        let provisioner =
            AccountProvisioner::new(Arc::clone(&self.user_repo), Arc::clone(&self.config));

        match provisioner.provision(&input.login, &input.password, remote.email).await {
            Ok(mut user) => {
                user.record_login();
                self.user_repo.update(&user).await?;
                Ok(LogInOutcome::Authenticated(user))
            }
            Err(AuthError::DuplicateAccount) => {
                // Lost a provisioning race. The row now exists, so one
                // local re-check settles it.
                tracing::warn!(
                    login = %input.login,
                    "Concurrent provisioning detected, re-checking local store"
                );
                let (user, verified) =
                    verifier.authenticate(&input.login, &input.password).await?;
                match user {
                    Some(mut user) if verified => {
                        user.record_login();
                        self.user_repo.update(&user).await?;
                        Ok(LogInOutcome::Authenticated(user))
                    }
                    _ => Ok(LogInOutcome::Rejected),
                }
            }
            Err(AuthError::Validation(reason)) | Err(AuthError::PasswordValidation(reason)) => {
                // Cabinet accepted credentials our value objects refuse
                // (reserved name, out-of-policy password). No local row
                // can be created for them.
                tracing::warn!(
                    login = %input.login,
                    %reason,
                    "Cabinet-accepted credentials failed local validation"
                );
                Ok(LogInOutcome::Rejected)
            }
            Err(e) => Err(e),
        }
    }
}
