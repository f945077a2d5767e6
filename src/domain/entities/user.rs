use std::fmt;

use super::Id;

/// Represents a user in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub is_bot: bool,
    pub roles: Vec<Id>,
}

impl User {
    pub fn new(id: Id, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            is_bot: false,
            roles: Vec::new(),
        }
    }

    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    pub fn with_roles(mut self, roles: Vec<Id>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_any_role(&self, roles: &std::collections::HashSet<Id>) -> bool {
        self.roles.iter().any(|r| roles.contains(r))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}
