//! Primary Group Value Object
//!
//! The group a user belongs to, determining default permissions. The
//! numeric IDs are fixed because they are shared with the existing user
//! table; Member (id 4) is the group assigned on auto-provisioning.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum PrimaryGroup {
    Administrator = 1,
    SuperModerator = 2,
    Moderator = 3,
    #[default]
    Member = 4,
    Banned = 5,
    Guest = 6,
}

impl PrimaryGroup {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use PrimaryGroup::*;
        match self {
            Administrator => "administrator",
            SuperModerator => "super_moderator",
            Moderator => "moderator",
            Member => "member",
            Banned => "banned",
            Guest => "guest",
        }
    }

    #[inline]
    pub const fn is_moderator_or_higher(&self) -> bool {
        use PrimaryGroup::*;
        matches!(self, Administrator | SuperModerator | Moderator)
    }

    #[inline]
    pub const fn is_banned(&self) -> bool {
        matches!(self, PrimaryGroup::Banned)
    }

    #[inline]
    pub fn from_id(id: i16) -> Self {
        use PrimaryGroup::*;
        match id {
            1 => Administrator,
            2 => SuperModerator,
            3 => Moderator,
            4 => Member,
            5 => Banned,
            6 => Guest,
            _ => {
                tracing::error!("Invalid PrimaryGroup id: {}", id);
                unreachable!("Invalid PrimaryGroup id: {}", id)
            }
        }
    }
}

impl fmt::Display for PrimaryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
