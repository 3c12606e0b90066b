//! Account records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether an account represents one person or a whole family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// A single person managing their own finances.
    #[default]
    Individual,
    /// A household with several members.
    Family,
}

impl Role {
    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Individual => "INDIVIDUAL",
            Role::Family => "FAMILY",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => Ok(Role::Individual),
            "FAMILY" => Ok(Role::Family),
            other => Err(Error::validation_field(
                "role",
                format!("unknown role '{other}' (expected INDIVIDUAL or FAMILY)"),
            )),
        }
    }
}

/// A registered account.
///
/// The password hash is never serialized; it only travels between the
/// storage layer and the credential check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique e-mail address.
    pub email: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Account type.
    pub role: Role,
    /// Display name.
    pub name: Option<String>,
    /// Home city.
    pub city: Option<String>,
    /// PHC-formatted password hash.
    #[serde(skip)]
    pub password_hash: String,
    /// Registration time.
    pub created_at: Option<DateTime<Utc>>,
}

/// Everything needed to insert a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Unique e-mail address.
    pub email: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Account type.
    pub role: Role,
    /// Display name.
    pub name: Option<String>,
    /// Home city.
    pub city: Option<String>,
    /// PHC-formatted password hash.
    pub password_hash: String,
}
