//! Cabinet HTTP Client
//!
//! Talks to the remote cabinet identity service over JSON-over-HTTP.
//! The wire contract is fixed by the existing service:
//!
//! - request: `{"login": ..., "password": ...}` (`register` adds
//!   `"email"`)
//! - response: `{"status": "OK", "email": ...}` where `email` may be
//!   absent and any `status` other than the literal `"OK"` means the
//!   request was declined
//!
//! Failures never escape as errors. They are logged and reported as
//! "not authenticated" per the `IdentityBackend` contract.

use crate::application::config::AuthConfig;
use crate::domain::cabinet::{IdentityBackend, RemoteAuthResult};
use serde::Deserialize;
use serde_json::json;

/// Literal success marker in the cabinet response
const STATUS_OK: &str = "OK";

/// Response body from both cabinet endpoints
#[derive(Debug, Deserialize)]
struct CabinetResponse {
    status: Option<String>,
    email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CabinetError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("empty response body")]
    EmptyBody,
    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct CabinetClient {
    http: reqwest::Client,
    auth_url: String,
    register_url: String,
}

impl CabinetClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: config.cabinet_auth_url.clone(),
            register_url: config.cabinet_register_url.clone(),
        }
    }

    pub fn with_client(config: &AuthConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            auth_url: config.cabinet_auth_url.clone(),
            register_url: config.cabinet_register_url.clone(),
        }
    }

    /// POST the body and return the raw response text.
    ///
    /// Non-2xx statuses and empty bodies are failures; the cabinet
    /// signals rejection through `status`, not through HTTP codes.
    async fn call(&self, url: &str, body: serde_json::Value) -> Result<String, CabinetError> {
        let response = self.http.post(url).json(&body).send().await?;
        let response = response.error_for_status()?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(CabinetError::EmptyBody);
        }
        Ok(text)
    }

    /// Parse and check the status marker. Returns the parsed body on
    /// success, `None` (after a warn log) when the cabinet declined.
    fn accept(url: &str, raw: &str) -> Result<Option<CabinetResponse>, CabinetError> {
        let parsed: CabinetResponse = serde_json::from_str(raw)?;
        if parsed.status.as_deref() != Some(STATUS_OK) {
            tracing::warn!(url, body = raw, "Cabinet declined request");
            return Ok(None);
        }
        Ok(Some(parsed))
    }
}

impl IdentityBackend for CabinetClient {
    async fn authenticate(&self, login: &str, password: &str) -> RemoteAuthResult {
        let body = json!({ "login": login, "password": password });

        let raw = match self.call(&self.auth_url, body).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(url = %self.auth_url, error = %e, "Cabinet authentication call failed");
                return RemoteAuthResult::rejected();
            }
        };

        match Self::accept(&self.auth_url, &raw) {
            Ok(Some(parsed)) => RemoteAuthResult::accepted(parsed.email),
            Ok(None) => RemoteAuthResult::rejected(),
            Err(e) => {
                tracing::error!(url = %self.auth_url, error = %e, "Cabinet authentication response unreadable");
                RemoteAuthResult::rejected()
            }
        }
    }

    async fn register(&self, login: &str, password: &str, email: &str) -> bool {
        let body = json!({ "login": login, "password": password, "email": email });

        let raw = match self.call(&self.register_url, body).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(url = %self.register_url, error = %e, "Cabinet registration call failed");
                return false;
            }
        };

        match Self::accept(&self.register_url, &raw) {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                tracing::error!(url = %self.register_url, error = %e, "Cabinet registration response unreadable");
                false
            }
        }
    }
}
