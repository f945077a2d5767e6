//! In-memory chat service. Records outbound calls and serves scripted embeds.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::errors::BotError;
use crate::domain::entities::{Embed, Emoji, Guild, Id, User};
use crate::domain::traits::{AppInfo, ChatService};

/// Embeds that become visible after a number of fetches
struct ScriptedEmbeds {
    hidden_fetches: u32,
    embeds: Vec<Embed>,
}

#[derive(Default)]
struct State {
    emojis: Vec<Emoji>,
    channels: HashMap<Id, Guild>,
    embeds: HashMap<Id, ScriptedEmbeds>,
    sent: Vec<(Id, String)>,
    next_message_id: Id,
    typing_calls: usize,
    fetch_embeds_calls: u32,
    emoji_lookups: usize,
}

/// Chat service kept entirely in memory
pub struct MemoryChat {
    info: AppInfo,
    state: Mutex<State>,
}

impl MemoryChat {
    pub fn new() -> Self {
        Self {
            info: AppInfo {
                user: User::new(1, "queuebot").bot(),
                owner: User::new(2, "owner"),
            },
            state: Mutex::new(State {
                next_message_id: 1000,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_emoji(&self, emoji: Emoji) {
        self.state().emojis.push(emoji);
    }

    /// Place a channel inside a guild
    pub fn add_channel(&self, channel_id: Id, guild: Guild) {
        self.state().channels.insert(channel_id, guild);
    }

    /// `fetch_embeds` returns nothing for the first `hidden_fetches` calls on this message
    pub fn reveal_embeds_after(&self, message_id: Id, hidden_fetches: u32, embeds: Vec<Embed>) {
        self.state().embeds.insert(message_id, ScriptedEmbeds { hidden_fetches, embeds });
    }

    /// Messages sent so far as `(channel, text)`
    pub fn sent(&self) -> Vec<(Id, String)> {
        self.state().sent.clone()
    }

    pub fn typing_calls(&self) -> usize {
        self.state().typing_calls
    }

    pub fn fetch_embeds_calls(&self) -> u32 {
        self.state().fetch_embeds_calls
    }

    pub fn emoji_lookups(&self) -> usize {
        self.state().emoji_lookups
    }
}

impl Default for MemoryChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MemoryChat {
    async fn application_info(&self) -> Result<AppInfo, BotError> {
        Ok(self.info.clone())
    }

    async fn send_message(&self, channel_id: Id, text: &str) -> Result<Id, BotError> {
        let mut state = self.state();
        state.sent.push((channel_id, text.to_string()));
        state.next_message_id += 1;
        Ok(state.next_message_id)
    }

    async fn trigger_typing(&self, _channel_id: Id) -> Result<(), BotError> {
        self.state().typing_calls += 1;
        Ok(())
    }

    async fn fetch_embeds(&self, _channel_id: Id, message_id: Id) -> Result<Vec<Embed>, BotError> {
        let mut state = self.state();
        state.fetch_embeds_calls += 1;
        let Some(script) = state.embeds.get_mut(&message_id) else {
            return Ok(Vec::new());
        };
        if script.hidden_fetches > 0 {
            script.hidden_fetches -= 1;
            return Ok(Vec::new());
        }
        Ok(script.embeds.clone())
    }

    async fn emoji_by_id(&self, id: Id) -> Result<Option<Emoji>, BotError> {
        let mut state = self.state();
        state.emoji_lookups += 1;
        Ok(state.emojis.iter().find(|e| e.id == id).cloned())
    }

    async fn emoji_by_name(&self, name: &str) -> Result<Option<Emoji>, BotError> {
        let mut state = self.state();
        state.emoji_lookups += 1;
        Ok(state.emojis.iter().find(|e| e.name == name).cloned())
    }

    async fn channel_guild(&self, channel_id: Id) -> Result<Option<Guild>, BotError> {
        Ok(self.state().channels.get(&channel_id).cloned())
    }
}
