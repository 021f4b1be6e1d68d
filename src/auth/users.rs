//! Static in-memory user table.

use std::collections::HashMap;

use crate::config::UserConfig;

/// A known user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    password: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&UserConfig> for User {
    fn from(cfg: &UserConfig) -> Self {
        Self::new(cfg.id, cfg.username.clone(), cfg.password.clone())
    }
}

/// Username-indexed lookup over the configured users.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, User>,
}

impl UserStore {
    pub fn from_config(users: &[UserConfig]) -> Self {
        users.iter().map(User::from).collect()
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Return the user if `username` exists and `password` matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.get(username).filter(|u| u.password == password)
    }

    /// Usernames in a stable order.
    pub fn usernames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.users.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<User> for UserStore {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        Self {
            users: iter
                .into_iter()
                .map(|u| (u.username.clone(), u))
                .collect(),
        }
    }
}
