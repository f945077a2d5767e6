//! Runtime handle - process-wide state shared with extension handlers

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::application::errors::BotError;
use crate::domain::entities::{Guild, Id, User};
use crate::domain::traits::{ChatService, SuggestionStore};
use crate::infrastructure::config::Config;

struct Inner {
    config: Config,
    chat: Arc<dyn ChatService>,
    store: Arc<dyn SuggestionStore>,
    owner: RwLock<Option<User>>,
    started_at: DateTime<Utc>,
}

/// Cheaply cloneable handle to the chat session, config and datastore.
/// Handlers receive one at construction time.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl Runtime {
    pub fn new(
        config: Config,
        chat: Arc<dyn ChatService>,
        store: Arc<dyn SuggestionStore>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                chat,
                store,
                owner: RwLock::new(None),
                started_at: Utc::now(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn chat(&self) -> &dyn ChatService {
        self.inner.chat.as_ref()
    }

    pub fn store(&self) -> &dyn SuggestionStore {
        self.inner.store.as_ref()
    }

    pub fn uptime(&self) -> Duration {
        Utc::now() - self.inner.started_at
    }

    /// OAuth2 application owner, known once the bot is ready
    pub async fn owner(&self) -> Option<User> {
        self.inner.owner.read().await.clone()
    }

    pub(crate) async fn set_owner(&self, owner: User) {
        *self.inner.owner.write().await = Some(owner);
    }

    /// Configured admins and the application owner
    pub async fn is_owner(&self, user: &User) -> bool {
        if self.inner.config.bot.admins.contains(&user.id) {
            return true;
        }
        self.inner
            .owner
            .read()
            .await
            .as_ref()
            .is_some_and(|owner| owner.id == user.id)
    }

    pub fn council_roles(&self) -> HashSet<Id> {
        self.inner.config.bot.council_roles.iter().copied().collect()
    }

    pub fn is_council(&self, user: &User) -> bool {
        user.has_any_role(&self.council_roles())
    }

    /// Guild hosting the blob emoji, i.e. the one owning the suggestions channel
    pub async fn blob_emoji(&self) -> Result<Option<Guild>, BotError> {
        let Some(channel) = self.inner.config.bot.suggestions_channel else {
            return Ok(None);
        };
        self.inner.chat.channel_guild(channel).await
    }

    /// Post a timestamped line to the bot-log channel. `None` if no channel is configured.
    pub async fn log(&self, content: &str) -> Result<Option<Id>, BotError> {
        let Some(channel) = self.inner.config.bot.bot_log else {
            return Ok(None);
        };
        let timestamp = format!("`[{}]`", Utc::now().format("%H:%M"));
        let id = self
            .inner
            .chat
            .send_message(channel, &format!("{} {}", timestamp, content))
            .await?;
        Ok(Some(id))
    }
}
