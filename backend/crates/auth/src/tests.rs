//! Crate-level scenario tests
//!
//! Drives the use cases end to end against in-memory doubles for the
//! user store, the cabinet backend, and the reset notifier.

use crate::application::config::AuthConfig;
use crate::application::forgot_password::ForgotPasswordUseCase;
use crate::application::log_in::{LogInInput, LogInOutcome, LogInUseCase};
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::reset_password::{ResetPasswordInput, ResetPasswordUseCase};
use crate::domain::cabinet::{IdentityBackend, RemoteAuthResult};
use crate::domain::notify::ResetNotifier;
use crate::domain::repository::UserRepository;
use crate::domain::token::ResetTokenService;
use crate::domain::value_object::{Email, RawPassword, UserName, UserPassword};
use crate::domain::User;
use crate::error::{AuthError, AuthResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test doubles
// ============================================================================

/// In-memory user store with the same uniqueness behavior as the
/// Postgres implementation
#[derive(Default)]
struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    fn with_user(user: User) -> Self {
        Self {
            users: Mutex::new(vec![user]),
        }
    }

    fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn get_by_name(&self, canonical: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_name.canonical() == canonical)
            .cloned()
    }
}

impl UserRepository for InMemoryUserRepo {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.user_name.canonical() == user.user_name.canonical())
        {
            return Err(AuthError::DuplicateAccount);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self.get_by_name(user_name.canonical()))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self.get_by_name(user_name.canonical()).is_some())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.user_id == user.user_id) {
            *existing = user.clone();
        }
        Ok(())
    }
}

/// Cabinet double with scripted answers and call counters
struct ScriptedCabinet {
    auth_response: RemoteAuthResult,
    register_ok: bool,
    auth_calls: AtomicUsize,
    register_calls: AtomicUsize,
}

impl ScriptedCabinet {
    fn rejecting() -> Self {
        Self::new(RemoteAuthResult::rejected(), true)
    }

    fn accepting(email: Option<&str>) -> Self {
        Self::new(RemoteAuthResult::accepted(email.map(String::from)), true)
    }

    fn new(auth_response: RemoteAuthResult, register_ok: bool) -> Self {
        Self {
            auth_response,
            register_ok,
            auth_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
        }
    }

    fn auth_call_count(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

impl IdentityBackend for ScriptedCabinet {
    async fn authenticate(&self, _login: &str, _password: &str) -> RemoteAuthResult {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.auth_response.clone()
    }

    async fn register(&self, _login: &str, _password: &str, _email: &str) -> bool {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.register_ok
    }
}

/// Notifier double recording delivered tokens
#[derive(Default)]
struct RecordingNotifier {
    deliveries: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl ResetNotifier for RecordingNotifier {
    async fn deliver_reset_token(&self, user: &User, token: &str) -> AuthResult<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push((user.email.as_str().to_string(), token.to_string()));
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig {
        cabinet_auth_url: "https://cabinet.test/auth".to_string(),
        cabinet_register_url: "https://cabinet.test/register".to_string(),
        reset_token_secret: [42u8; 32],
        reset_token_ttl: std::time::Duration::from_secs(24 * 60 * 60),
        default_group: crate::domain::value_object::PrimaryGroup::Member,
        password_pepper: None,
    })
}

fn make_user(name: &str, email: &str, password: &str) -> User {
    let user_name = UserName::new(name).unwrap();
    let email = Email::new(email).unwrap();
    let raw = RawPassword::new(password.to_string()).unwrap();
    let password_hash = UserPassword::from_raw(&raw, None).unwrap();
    User::new(
        user_name,
        email,
        password_hash,
        crate::domain::value_object::PrimaryGroup::Member,
    )
}

fn log_in_use_case(
    repo: &Arc<InMemoryUserRepo>,
    cabinet: &Arc<ScriptedCabinet>,
) -> LogInUseCase<InMemoryUserRepo, ScriptedCabinet> {
    LogInUseCase::new(Arc::clone(repo), Arc::clone(cabinet), test_config())
}

// ============================================================================
// Login
// ============================================================================

mod log_in {
    use super::*;

    #[tokio::test]
    async fn local_success_never_calls_cabinet() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "CorrectHorse9!",
        )));
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "alice".to_string(),
                password: "CorrectHorse9!".to_string(),
            })
            .await
            .unwrap();

        let LogInOutcome::Authenticated(user) = outcome else {
            panic!("expected authentication");
        };
        assert_eq!(user.user_name.canonical(), "alice");
        assert!(user.last_login_at.is_some());
        assert_eq!(cabinet.auth_call_count(), 0);
    }

    #[tokio::test]
    async fn login_by_email_works() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "CorrectHorse9!",
        )));
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "alice@example.com".to_string(),
                password: "CorrectHorse9!".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, LogInOutcome::Authenticated(_)));
        assert_eq!(cabinet.auth_call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_user_provisioned_from_cabinet() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::accepting(Some("nina@x.com")));
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "nina".to_string(),
                password: "Password1!".to_string(),
            })
            .await
            .unwrap();

        let LogInOutcome::Authenticated(user) = outcome else {
            panic!("expected authentication");
        };
        assert_eq!(user.user_name.canonical(), "nina");
        assert_eq!(user.email.as_str(), "nina@x.com");
        assert_eq!(
            user.primary_group,
            crate::domain::value_object::PrimaryGroup::Member
        );
        assert_eq!(repo.user_count(), 1);
        assert_eq!(cabinet.auth_call_count(), 1);

        // Second login resolves locally, cabinet stays untouched
        let outcome = use_case
            .execute(LogInInput {
                login: "nina".to_string(),
                password: "Password1!".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, LogInOutcome::Authenticated(_)));
        assert_eq!(cabinet.auth_call_count(), 1);
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn cabinet_without_email_stores_sentinel() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::accepting(None));
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "drifter".to_string(),
                password: "Password1!".to_string(),
            })
            .await
            .unwrap();

        let LogInOutcome::Authenticated(user) = outcome else {
            panic!("expected authentication");
        };
        assert!(user.email.is_unknown());
        assert_eq!(user.email.as_str(), "unknown");
    }

    #[tokio::test]
    async fn both_backends_reject() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "nobody".to_string(),
                password: "Whatever123!".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, LogInOutcome::Rejected));
        assert_eq!(repo.user_count(), 0);
        assert_eq!(cabinet.auth_call_count(), 1);
    }

    #[tokio::test]
    async fn wrong_local_password_and_remote_reject() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "CorrectHorse9!",
        )));
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "alice".to_string(),
                password: "WrongPassword1!".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, LogInOutcome::Rejected));
        // No second account created for an existing name
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn provisioning_race_falls_back_to_local_recheck() {
        // Another process provisions the same login between our lookup
        // and our insert: the first name lookup misses, the insert
        // reports a duplicate, and the row is visible by re-check time.
        let inner = InMemoryUserRepo::with_user(make_user(
            "racer",
            "racer@example.com",
            "Password1!",
        ));
        let repo = Arc::new(RacingRepo {
            inner,
            lookups: AtomicUsize::new(0),
        });
        let cabinet = Arc::new(ScriptedCabinet::accepting(None));
        let use_case = LogInUseCase::new(Arc::clone(&repo), Arc::clone(&cabinet), test_config());

        let outcome = use_case
            .execute(LogInInput {
                login: "racer".to_string(),
                password: "Password1!".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, LogInOutcome::Authenticated(_)));
        assert_eq!(cabinet.auth_call_count(), 1);
        assert_eq!(repo.inner.user_count(), 1);
    }

    /// First name lookup misses, later ones hit, inserts always report
    /// a duplicate
    struct RacingRepo {
        inner: InMemoryUserRepo,
        lookups: AtomicUsize,
    }

    impl UserRepository for RacingRepo {
        async fn create(&self, _user: &User) -> AuthResult<()> {
            Err(AuthError::DuplicateAccount)
        }

        async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
            if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(None);
            }
            self.inner.find_by_user_name(user_name).await
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
            self.inner.find_by_email(email).await
        }

        async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
            self.inner.exists_by_user_name(user_name).await
        }

        async fn update(&self, user: &User) -> AuthResult<()> {
            self.inner.update(user).await
        }
    }

    #[tokio::test]
    async fn rejection_maps_to_generic_credentials_error() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "CorrectHorse9!",
        )));
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "alice".to_string(),
                password: "WrongPassword1!".to_string(),
            })
            .await
            .unwrap();
        let err = outcome.into_result().unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        // Same wording whether the account exists or not
        assert_eq!(err.to_string(), "Wrong username or password");

        let outcome = use_case
            .execute(LogInInput {
                login: "alice".to_string(),
                password: "CorrectHorse9!".to_string(),
            })
            .await
            .unwrap();
        let user = outcome.into_result().unwrap();
        assert_eq!(user.user_name.canonical(), "alice");
    }

    #[tokio::test]
    async fn malformed_login_is_rejected_without_error() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = log_in_use_case(&repo, &cabinet);

        let outcome = use_case
            .execute(LogInInput {
                login: "!!".to_string(),
                password: "Whatever123!".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, LogInOutcome::Rejected));
    }
}

// ============================================================================
// Registration
// ============================================================================

mod register {
    use super::*;

    fn register_use_case(
        repo: &Arc<InMemoryUserRepo>,
        cabinet: &Arc<ScriptedCabinet>,
    ) -> RegisterUseCase<InMemoryUserRepo, ScriptedCabinet> {
        RegisterUseCase::new(Arc::clone(repo), Arc::clone(cabinet), test_config())
    }

    #[tokio::test]
    async fn register_creates_account_and_mirrors() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = register_use_case(&repo, &cabinet);

        let user = use_case
            .execute(RegisterInput {
                user_name: "NewUser".to_string(),
                email: "new@example.com".to_string(),
                password: "FreshPassword1!".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.user_name.original(), "NewUser");
        assert_eq!(user.user_name.canonical(), "newuser");
        assert_eq!(repo.user_count(), 1);
        assert_eq!(cabinet.register_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mirror_failure_keeps_local_account() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::new(RemoteAuthResult::rejected(), false));
        let use_case = register_use_case(&repo, &cabinet);

        let result = use_case
            .execute(RegisterInput {
                user_name: "solo".to_string(),
                email: "solo@example.com".to_string(),
                password: "FreshPassword1!".to_string(),
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_user_name_rejected() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "taken",
            "taken@example.com",
            "Password1!",
        )));
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = register_use_case(&repo, &cabinet);

        let result = use_case
            .execute(RegisterInput {
                user_name: "Taken".to_string(),
                email: "other@example.com".to_string(),
                password: "Password1!".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::UserNameTaken)));
        assert_eq!(repo.user_count(), 1);
        // No mirror attempt for a failed registration
        assert_eq!(cabinet.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_input_rejected_before_store_access() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let cabinet = Arc::new(ScriptedCabinet::rejecting());
        let use_case = register_use_case(&repo, &cabinet);

        let result = use_case
            .execute(RegisterInput {
                user_name: "x".to_string(),
                email: "x@example.com".to_string(),
                password: "GoodPassword1!".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        let result = use_case
            .execute(RegisterInput {
                user_name: "validname".to_string(),
                email: "not-an-email".to_string(),
                password: "GoodPassword1!".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        let result = use_case
            .execute(RegisterInput {
                user_name: "validname".to_string(),
                email: "ok@example.com".to_string(),
                password: "short".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::PasswordValidation(_))));

        assert_eq!(repo.user_count(), 0);
    }
}

// ============================================================================
// Password reset flow
// ============================================================================

mod password_reset {
    use super::*;

    #[tokio::test]
    async fn forgot_password_delivers_token() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "Password1!",
        )));
        let notifier = Arc::new(RecordingNotifier::default());
        let use_case =
            ForgotPasswordUseCase::new(Arc::clone(&repo), Arc::clone(&notifier), &test_config());

        use_case.execute("alice@example.com").await.unwrap();

        let deliveries = notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "alice@example.com");
        assert!(deliveries[0].1.contains('.'));
    }

    #[tokio::test]
    async fn forgot_password_unknown_email() {
        let repo = Arc::new(InMemoryUserRepo::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let use_case =
            ForgotPasswordUseCase::new(Arc::clone(&repo), Arc::clone(&notifier), &test_config());

        let result = use_case.execute("ghost@example.com").await;
        assert!(matches!(result, Err(AuthError::EmailNotLinked)));
        assert!(notifier.deliveries().is_empty());

        // Malformed addresses get the same answer
        let result = use_case.execute("not-an-email").await;
        assert!(matches!(result, Err(AuthError::EmailNotLinked)));

        // The sentinel cannot be targeted
        let result = use_case.execute("unknown").await;
        assert!(matches!(result, Err(AuthError::EmailNotLinked)));
    }

    #[tokio::test]
    async fn reset_password_round_trip() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "OldPassword1!",
        )));
        let notifier = Arc::new(RecordingNotifier::default());
        let config = test_config();
        let forgot =
            ForgotPasswordUseCase::new(Arc::clone(&repo), Arc::clone(&notifier), &config);
        forgot.execute("alice@example.com").await.unwrap();
        let token = notifier.deliveries()[0].1.clone();

        let reset = ResetPasswordUseCase::new(Arc::clone(&repo), Arc::clone(&config));
        reset
            .execute(ResetPasswordInput {
                email: "alice@example.com".to_string(),
                token,
                new_password: "NewPassword2!".to_string(),
            })
            .await
            .unwrap();

        let user = repo.get_by_name("alice").unwrap();
        let new_raw = RawPassword::new("NewPassword2!".to_string()).unwrap();
        let old_raw = RawPassword::new("OldPassword1!".to_string()).unwrap();
        assert!(user.password_hash.verify(&new_raw, None));
        assert!(!user.password_hash.verify(&old_raw, None));
    }

    #[tokio::test]
    async fn reset_password_tampered_token() {
        let repo = Arc::new(InMemoryUserRepo::with_user(make_user(
            "alice",
            "alice@example.com",
            "OldPassword1!",
        )));
        let reset = ResetPasswordUseCase::new(Arc::clone(&repo), test_config());

        let result = reset
            .execute(ResetPasswordInput {
                email: "alice@example.com".to_string(),
                token: "bogus.token".to_string(),
                new_password: "NewPassword2!".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));

        let user = repo.get_by_name("alice").unwrap();
        let old_raw = RawPassword::new("OldPassword1!".to_string()).unwrap();
        assert!(user.password_hash.verify(&old_raw, None));
    }

    #[tokio::test]
    async fn reset_password_expired_token() {
        let config = test_config();
        let user = make_user("alice", "alice@example.com", "OldPassword1!");
        let tokens =
            ResetTokenService::new(config.reset_token_secret, config.reset_token_ttl_ms());
        // Issued far enough in the past to be past the TTL
        let stale = tokens.issue_at(&user, 0);

        let repo = Arc::new(InMemoryUserRepo::with_user(user));
        let reset = ResetPasswordUseCase::new(Arc::clone(&repo), config);

        let result = reset
            .execute(ResetPasswordInput {
                email: "alice@example.com".to_string(),
                token: stale,
                new_password: "NewPassword2!".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn reset_password_cross_user_token() {
        let config = test_config();
        let alice = make_user("alice", "alice@example.com", "Password1!");
        let bob = make_user("bob", "bob@example.com", "Password1!");
        let tokens =
            ResetTokenService::new(config.reset_token_secret, config.reset_token_ttl_ms());
        let bobs_token = tokens.issue(&bob);

        let repo = Arc::new(InMemoryUserRepo::with_user(alice));
        let reset = ResetPasswordUseCase::new(Arc::clone(&repo), config);

        let result = reset
            .execute(ResetPasswordInput {
                email: "alice@example.com".to_string(),
                token: bobs_token,
                new_password: "NewPassword2!".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn reset_password_weak_new_password() {
        let config = test_config();
        let user = make_user("alice", "alice@example.com", "OldPassword1!");
        let tokens =
            ResetTokenService::new(config.reset_token_secret, config.reset_token_ttl_ms());
        let token = tokens.issue(&user);

        let repo = Arc::new(InMemoryUserRepo::with_user(user));
        let reset = ResetPasswordUseCase::new(Arc::clone(&repo), config);

        let result = reset
            .execute(ResetPasswordInput {
                email: "alice@example.com".to_string(),
                token,
                new_password: "short".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::PasswordValidation(_))));
    }
}
