use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::string_enum;

/// Account role. Players book courts, owners publish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Owner,
}

string_enum!(Role, "role", {
    Player => "player",
    Owner => "owner",
});

/// Stored account, including the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_completed: bool,
    pub terms_accepted: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub terms_accepted: bool,
}

/// Public view of an account (never carries the hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_completed: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_completed: user.profile_completed,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

impl User {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }
}
