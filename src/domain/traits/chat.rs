use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{Embed, Emoji, Guild, Id, User};

/// Chat service trait - abstraction over the remote chat platform session
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Application info for the logged-in bot account
    async fn application_info(&self) -> Result<AppInfo, BotError>;

    /// Send a message to a channel, returning the new message id
    async fn send_message(&self, channel_id: Id, text: &str) -> Result<Id, BotError>;

    /// Show a typing indicator in a channel
    async fn trigger_typing(&self, channel_id: Id) -> Result<(), BotError>;

    /// Current embeds of a message. Link previews are attached asynchronously,
    /// so repeated calls may observe more embeds over time.
    async fn fetch_embeds(&self, channel_id: Id, message_id: Id) -> Result<Vec<Embed>, BotError>;

    /// Look up a custom emoji by id
    async fn emoji_by_id(&self, id: Id) -> Result<Option<Emoji>, BotError>;

    /// Look up a custom emoji by name
    async fn emoji_by_name(&self, name: &str) -> Result<Option<Emoji>, BotError>;

    /// Guild a channel belongs to. `None` for unknown channels and direct messages.
    async fn channel_guild(&self, channel_id: Id) -> Result<Option<Guild>, BotError>;
}

/// Application information
#[derive(Debug, Clone)]
pub struct AppInfo {
    /// The logged-in bot account
    pub user: User,
    /// OAuth2 application owner
    pub owner: User,
}
