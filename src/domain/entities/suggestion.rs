use super::Id;

/// A stored emoji suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: Id,
    /// Index shown to users, e.g. "Suggestion #12"
    pub idx: i64,
    pub emoji_name: String,
    pub emoji_url: String,
    /// Whether the suggestion is visible in the public voting queue
    pub in_public_queue: bool,
}

impl Suggestion {
    pub fn new(
        id: Id,
        idx: i64,
        emoji_name: impl Into<String>,
        emoji_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            idx,
            emoji_name: emoji_name.into(),
            emoji_url: emoji_url.into(),
            in_public_queue: false,
        }
    }

    pub fn public(mut self) -> Self {
        self.in_public_queue = true;
        self
    }
}
