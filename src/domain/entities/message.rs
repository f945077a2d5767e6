use super::{Id, User};

/// Link-preview thumbnail attached to an embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Cached copy served by the chat service
    pub proxy_url: String,
}

/// Rich embed the chat service attaches to a message after it is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub thumbnail: Option<Thumbnail>,
}

impl Embed {
    pub fn with_thumbnail(proxy_url: impl Into<String>) -> Self {
        Self {
            thumbnail: Some(Thumbnail {
                proxy_url: proxy_url.into(),
            }),
        }
    }
}

/// Represents an incoming message. Embeds arrive later; see `ChatService::fetch_embeds`.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Id,
    pub channel_id: Id,
    pub author: User,
    pub content: String,
}

impl Message {
    pub fn new(id: Id, channel_id: Id, author: User, content: impl Into<String>) -> Self {
        Self {
            id,
            channel_id,
            author,
            content: content.into(),
        }
    }
}
