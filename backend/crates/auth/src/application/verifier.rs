//! Credential Verifier
//!
//! Checks a login/password pair against the local store. Read-only:
//! callers decide what to do with the outcome (record the login, fall
//! back to the cabinet, reject).

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, RawPassword, UserName};
use crate::domain::User;
use crate::error::AuthResult;
use std::sync::Arc;

/// Local credential check
///
/// A login containing `@` is looked up as an email address, otherwise
/// as a user name. Input that fails value-object validation cannot
/// match any stored account, so it short-circuits without touching the
/// store.
pub struct CredentialVerifier<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> CredentialVerifier<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Returns the matched user (if any) and whether the password
    /// verified against that user's hash.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> AuthResult<(Option<User>, bool)> {
        let user = self.lookup(login).await?;

        let Some(user) = user else {
            return Ok((None, false));
        };

        // A password outside policy bounds can never have produced a
        // stored hash, so skip the argon2 work.
        let Ok(raw) = RawPassword::new(password.to_string()) else {
            return Ok((Some(user), false));
        };

        let verified = user.password_hash.verify(&raw, self.config.pepper());
        Ok((Some(user), verified))
    }

    async fn lookup(&self, login: &str) -> AuthResult<Option<User>> {
        if login.contains('@') {
            match Email::new(login) {
                Ok(email) => self.user_repo.find_by_email(&email).await,
                Err(_) => Ok(None),
            }
        } else {
            match UserName::new(login) {
                Ok(user_name) => self.user_repo.find_by_user_name(&user_name).await,
                Err(_) => Ok(None),
            }
        }
    }
}
