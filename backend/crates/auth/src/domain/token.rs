//! Reset Token Service
//!
//! Stateless HMAC-signed tokens for the password-reset flow. A token
//! binds the account identity and an issue timestamp; no server-side
//! record is kept, so a token stays usable until its TTL elapses even
//! after the password has been changed. Single-use semantics would
//! need an issued-token store or a password-generation claim.
//!
//! ## Format
//!
//! `base64url(claims_json) "." base64url(hmac_sha256(secret, claims_b64))`
//!
//! Both segments use the URL-safe alphabet without padding, so the
//! token survives being pasted into a URL.

use crate::domain::entity::User;
use chrono::Utc;
use hmac::{Hmac, Mac};
use platform::crypto::{from_base64url, to_base64url};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a reset token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Account the token was issued for
    pub user_id: uuid::Uuid,
    /// Issue time in Unix milliseconds
    pub issued_at_ms: i64,
}

/// Result of checking a presented token
///
/// `invalid` covers structural and signature problems and identity
/// mismatch; `expired` is only meaningful when the token was otherwise
/// valid. Callers report `invalid` before `expired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCheck {
    pub invalid: bool,
    pub expired: bool,
    pub claims: Option<ResetClaims>,
}

impl TokenCheck {
    fn invalid() -> Self {
        Self {
            invalid: true,
            expired: false,
            claims: None,
        }
    }

    pub fn valid(&self) -> bool {
        !self.invalid && !self.expired
    }
}

/// Issues and verifies reset tokens
#[derive(Clone)]
pub struct ResetTokenService {
    secret: [u8; 32],
    ttl_ms: i64,
}

impl ResetTokenService {
    pub fn new(secret: [u8; 32], ttl_ms: i64) -> Self {
        Self { secret, ttl_ms }
    }

    /// Issue a token for the given user, stamped with the current time
    pub fn issue(&self, user: &User) -> String {
        self.issue_at(user, Utc::now().timestamp_millis())
    }

    /// Issue with an explicit timestamp. Split out so expiry behavior
    /// is testable without sleeping.
    pub(crate) fn issue_at(&self, user: &User, issued_at_ms: i64) -> String {
        let claims = ResetClaims {
            user_id: *user.user_id.as_uuid(),
            issued_at_ms,
        };
        // Serialization of a plain struct with these field types cannot fail
        let claims_json = serde_json::to_vec(&claims).unwrap_or_default();
        let claims_b64 = to_base64url(&claims_json);

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts any key length");
        mac.update(claims_b64.as_bytes());
        let sig_b64 = to_base64url(&mac.finalize().into_bytes());

        format!("{}.{}", claims_b64, sig_b64)
    }

    /// Verify a presented token against the expected user.
    ///
    /// The signature check runs in constant time. A token issued for a
    /// different account is `invalid`, not `expired`.
    pub fn verify(&self, user: &User, token: &str) -> TokenCheck {
        self.verify_at(user, token, Utc::now().timestamp_millis())
    }

    pub(crate) fn verify_at(&self, user: &User, token: &str, now_ms: i64) -> TokenCheck {
        let Some((claims_b64, sig_b64)) = token.split_once('.') else {
            return TokenCheck::invalid();
        };

        let Ok(sig) = from_base64url(sig_b64) else {
            return TokenCheck::invalid();
        };

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts any key length");
        mac.update(claims_b64.as_bytes());
        if mac.verify_slice(&sig).is_err() {
            return TokenCheck::invalid();
        }

        let Ok(claims_json) = from_base64url(claims_b64) else {
            return TokenCheck::invalid();
        };
        let Ok(claims) = serde_json::from_slice::<ResetClaims>(&claims_json) else {
            return TokenCheck::invalid();
        };

        if claims.user_id != *user.user_id.as_uuid() {
            return TokenCheck::invalid();
        }

        let expired = now_ms.saturating_sub(claims.issued_at_ms) > self.ttl_ms;
        TokenCheck {
            invalid: false,
            expired,
            claims: Some(claims),
        }
    }
}

impl std::fmt::Debug for ResetTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}
