use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The built-in administrator account. It can never be deleted.
pub const DEFAULT_ADMIN: &str = "admin";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub admins: Vec<String>,
}

impl UserDirectory {
    pub fn role_of(&self, username: &str) -> Role {
        if self.admins.iter().any(|admin| admin == username) {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn rows(&self) -> Vec<UserRow> {
        self.users
            .iter()
            .map(|username| UserRow {
                username: username.clone(),
                role: self.role_of(username),
                deletable: is_deletable(username),
            })
            .collect()
    }
}

pub fn is_deletable(username: &str) -> bool {
    username != DEFAULT_ADMIN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::User => write!(f, "User"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub username: String,
    pub role: Role,
    pub deletable: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub is_admin: bool,
}
