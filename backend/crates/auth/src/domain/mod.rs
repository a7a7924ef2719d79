//! Domain Layer
//!
//! Contains entities, value objects, repository traits, and the
//! reset-token domain service.

pub mod cabinet;
pub mod entity;
pub mod notify;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use cabinet::{IdentityBackend, RemoteAuthResult};
pub use entity::user::User;
pub use notify::ResetNotifier;
pub use repository::UserRepository;
pub use token::{ResetTokenService, TokenCheck};
