use serde::{Deserialize, Serialize};
use std::fmt;

use super::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Client => f.write_str("client"),
        }
    }
}

/// Identity performing an operation
///
/// Operations receive an `Option<Actor>`: `None` stands for an anonymous caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_client(&self) -> bool {
        self.has_role(Role::Client)
    }
}

/// Password credential of a user
///
/// The value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Entry of the user directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub credential: Credential,
    pub role: Role,
    #[serde(default)]
    pub phone: String,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Self-service sign-up payload
///
/// Registered users always get the [`Role::Client`] role.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}
