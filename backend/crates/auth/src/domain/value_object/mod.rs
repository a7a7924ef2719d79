//! Value Object Module

pub mod email;
pub mod primary_group;
pub mod user_id;
pub mod user_name;
pub mod user_password;

pub use email::Email;
pub use primary_group::PrimaryGroup;
pub use user_id::UserId;
pub use user_name::UserName;
pub use user_password::{RawPassword, UserPassword};
