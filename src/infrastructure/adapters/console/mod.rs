//! Console adapter for development/testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::application::errors::BotError;
use crate::domain::entities::{Embed, Emoji, Guild, Id, User};
use crate::domain::traits::{AppInfo, ChatService};

/// Chat service printing outbound messages to stdout
pub struct ConsoleAdapter {
    info: AppInfo,
    next_message_id: AtomicU64,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: AppInfo {
                user: User::new(0, "console").bot(),
                owner: User::new(1, "console-owner"),
            },
            next_message_id: AtomicU64::new(1),
        }
    }

    /// The local user acts as the application owner
    pub fn owner(&self) -> &User {
        &self.info.owner
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for ConsoleAdapter {
    async fn application_info(&self) -> Result<AppInfo, BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(self.info.clone())
    }

    async fn send_message(&self, channel_id: Id, text: &str) -> Result<Id, BotError> {
        println!("[BOT #{}] {}", channel_id, text);
        Ok(self.next_message_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn trigger_typing(&self, _channel_id: Id) -> Result<(), BotError> {
        Ok(())
    }

    // The console never attaches link previews
    async fn fetch_embeds(&self, _channel_id: Id, _message_id: Id) -> Result<Vec<Embed>, BotError> {
        Ok(Vec::new())
    }

    // No guild, so no custom emoji
    async fn emoji_by_id(&self, _id: Id) -> Result<Option<Emoji>, BotError> {
        Ok(None)
    }

    async fn emoji_by_name(&self, _name: &str) -> Result<Option<Emoji>, BotError> {
        Ok(None)
    }

    async fn channel_guild(&self, _channel_id: Id) -> Result<Option<Guild>, BotError> {
        Ok(None)
    }
}
