//! Caller roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AccessError;

/// Role carried in the caller's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Sees and manages every company.
    SuperUser,
    /// Heads one or more centres.
    CenterHead,
    /// Books and classifies transactions.
    Accountant,
    /// Manages properties and their vendors.
    PropertyManager,
}

impl Role {
    /// All roles, in wire order.
    pub const ALL: [Self; 4] = [
        Self::SuperUser,
        Self::CenterHead,
        Self::Accountant,
        Self::PropertyManager,
    ];

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperUser => "SUPER_USER",
            Self::CenterHead => "CENTER_HEAD",
            Self::Accountant => "ACCOUNTANT",
            Self::PropertyManager => "PROPERTY_MANAGER",
        }
    }

    /// Returns true for the role that bypasses every company boundary.
    #[must_use]
    pub const fn is_super_user(self) -> bool {
        matches!(self, Self::SuperUser)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AccessError::UnknownRole(s.to_string()))
    }
}
