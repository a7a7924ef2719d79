//! Cabinet Backend Port
//!
//! Interface to the remote "cabinet" identity service. The concrete
//! HTTP client lives in `infra::cabinet`; tests substitute scripted
//! doubles.
//!
//! Remote failures are never surfaced as errors to callers. A cabinet
//! that is down, returns garbage, or rejects the credentials all
//! collapse to the same "not authenticated" answer, so local login
//! keeps working when the cabinet does not.

/// Outcome of a remote authentication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAuthResult {
    /// Whether the cabinet accepted the credentials
    pub ok: bool,
    /// Email address the cabinet holds for this account, if any
    pub email: Option<String>,
}

impl RemoteAuthResult {
    pub fn rejected() -> Self {
        Self {
            ok: false,
            email: None,
        }
    }

    pub fn accepted(email: Option<String>) -> Self {
        Self { ok: true, email }
    }
}

/// Remote identity backend
#[trait_variant::make(IdentityBackend: Send)]
pub trait LocalIdentityBackend {
    /// Verify credentials against the cabinet.
    ///
    /// Infallible by contract: transport errors, malformed responses
    /// and rejections all return `RemoteAuthResult::rejected()`.
    async fn authenticate(&self, login: &str, password: &str) -> RemoteAuthResult;

    /// Mirror a newly registered account to the cabinet.
    ///
    /// Returns whether the cabinet acknowledged the registration.
    /// Best-effort: callers log a failure and move on.
    async fn register(&self, login: &str, password: &str, email: &str) -> bool;
}
