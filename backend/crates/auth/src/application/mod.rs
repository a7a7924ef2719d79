//! Application Layer
//!
//! Use cases composing the domain ports. Each use case is a generic
//! struct over the repository and backend traits, constructed with
//! `Arc`s and driven through `execute()`.

pub mod config;
pub mod forgot_password;
pub mod log_in;
pub mod provisioner;
pub mod register;
pub mod reset_password;
pub mod verifier;

pub use config::AuthConfig;
pub use forgot_password::ForgotPasswordUseCase;
pub use log_in::{LogInInput, LogInOutcome, LogInUseCase};
pub use provisioner::AccountProvisioner;
pub use register::{RegisterInput, RegisterUseCase};
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase};
pub use verifier::CredentialVerifier;
