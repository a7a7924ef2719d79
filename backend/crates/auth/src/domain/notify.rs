//! Reset Notification Port
//!
//! Delivery channel for password-reset tokens. The crate ships no
//! production implementation; the host application wires in mail or
//! whatever transport it uses.

use crate::domain::entity::User;
use crate::error::AuthResult;

/// Delivers a reset token to the account owner
#[trait_variant::make(ResetNotifier: Send)]
pub trait LocalResetNotifier {
    async fn deliver_reset_token(&self, user: &User, token: &str) -> AuthResult<()>;
}
