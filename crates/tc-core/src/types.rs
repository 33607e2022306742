//! Identity types shared across the workspace.
//!
//! The identity provider is an external collaborator; per request it yields a
//! stable user identifier plus a role tag and a staff flag. These types are
//! the validated form of that triple.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid role value.
    #[error("invalid role: {value}")]
    InvalidRole { value: String },

    /// A time-of-day string that is neither `HH:MM` nor `HH:MM:SS`.
    #[error("invalid time of day: {value} (expected HH:MM or HH:MM:SS)")]
    InvalidTime { value: String },
}

/// A validated user identifier.
///
/// User IDs must be non-empty strings. They come from the identity provider
/// and are opaque to the ledger; uniqueness is the provider's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new user ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "user ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Role tag attached to an authenticated user.
///
/// This enum encodes the valid role values, preventing invalid strings from
/// circulating through the policy layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular employee; sees only their own segments.
    #[default]
    Worker,
    /// A company account; unrestricted scope.
    Company,
    /// An administrator; unrestricted scope.
    Admin,
}

impl Role {
    /// String representation for configuration and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Company => "company",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(Self::Worker),
            "company" => Ok(Self::Company),
            "admin" => Ok(Self::Admin),
            _ => Err(ValidationError::InvalidRole {
                value: s.to_string(),
            }),
        }
    }
}

/// The authenticated caller of a ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier.
    pub user: UserId,
    /// Role tag.
    pub role: Role,
    /// Staff flag; grants unrestricted scope regardless of role.
    pub staff: bool,
}

impl Identity {
    /// Whether this identity may see and modify segments it does not own.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.staff || matches!(self.role, Role::Company | Role::Admin)
    }
}
