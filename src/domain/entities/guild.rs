use super::Id;

/// Server that owns channels and custom emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Id,
    pub name: String,
}

impl Guild {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}
