use super::Id;

/// Custom emoji known to the chat service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    pub id: Id,
    pub name: String,
    pub animated: bool,
    pub url: String,
}

impl Emoji {
    pub fn new(id: Id, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            animated: false,
            url: url.into(),
        }
    }

    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }
}
