//! Auth Configuration
//!
//! Runtime settings shared across the use cases. The host application
//! builds one of these at startup and hands it around in an `Arc`.

use crate::domain::value_object::PrimaryGroup;
use platform::crypto::random_bytes;
use std::time::Duration;

/// Default reset-token lifetime
const DEFAULT_RESET_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Authentication subsystem configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Cabinet authentication endpoint
    pub cabinet_auth_url: String,
    /// Cabinet registration endpoint
    pub cabinet_register_url: String,
    /// HMAC key for reset tokens. Rotating it invalidates all
    /// outstanding tokens.
    pub reset_token_secret: [u8; 32],
    /// How long an issued reset token stays accepted
    pub reset_token_ttl: Duration,
    /// Group assigned to auto-provisioned and newly registered accounts
    pub default_group: PrimaryGroup,
    /// Application-wide pepper mixed into password hashing
    pub password_pepper: Option<Vec<u8>>,
}

impl AuthConfig {
    /// Config with a freshly generated token secret.
    ///
    /// Suitable for single-process deployments; multi-process setups
    /// must share a persisted secret or tokens issued by one process
    /// will not verify on another.
    pub fn with_random_secret(
        cabinet_auth_url: impl Into<String>,
        cabinet_register_url: impl Into<String>,
    ) -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&random_bytes(32));
        Self {
            cabinet_auth_url: cabinet_auth_url.into(),
            cabinet_register_url: cabinet_register_url.into(),
            reset_token_secret: secret,
            reset_token_ttl: DEFAULT_RESET_TOKEN_TTL,
            default_group: PrimaryGroup::Member,
            password_pepper: None,
        }
    }

    /// Pepper as a byte slice, if configured
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Token TTL in milliseconds, saturating on absurd values
    pub fn reset_token_ttl_ms(&self) -> i64 {
        i64::try_from(self.reset_token_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("cabinet_auth_url", &self.cabinet_auth_url)
            .field("cabinet_register_url", &self.cabinet_register_url)
            .field("reset_token_secret", &"[REDACTED]")
            .field("reset_token_ttl", &self.reset_token_ttl)
            .field("default_group", &self.default_group)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
