//! Suggestion-aware converters
//!
//! `PartialSuggestionConverter` accepts a suggestion id, a custom emoji, or a pasted
//! image link whose preview the chat service attaches after the message is sent.
//! `PublicQueueOrEmojiConverter` accepts a suggestion id that must be in the public
//! queue, or a custom emoji.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::emoji::EmojiConverter;
use super::poll::poll_until;
use super::{Argument, Converter, Pipeline, Resolution, Strategy};
use crate::application::errors::{ConversionError, StorageError};
use crate::application::messaging::Context;
use crate::domain::entities::{Emoji, Id, Suggestion};

/// Message used when no strategy could resolve a suggestion or image
pub const UNRESOLVED_SUGGESTION_OR_IMAGE: &str = "Couldn't resolve to suggestion or image.";

/// An image, optionally tied to a stored suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSuggestion {
    pub idx: Option<i64>,
    pub image_url: String,
}

/// A public-queue suggestion or a bare emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    Suggestion(Suggestion),
    Emoji(Emoji),
}

impl QueueEntry {
    pub fn suggestion(&self) -> Option<&Suggestion> {
        match self {
            QueueEntry::Suggestion(s) => Some(s),
            QueueEntry::Emoji(_) => None,
        }
    }

    /// Suggestion index, or the emoji id
    pub fn key(&self) -> i128 {
        match self {
            QueueEntry::Suggestion(s) => s.idx as i128,
            QueueEntry::Emoji(e) => e.id as i128,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            QueueEntry::Suggestion(s) => &s.emoji_url,
            QueueEntry::Emoji(e) => &e.url,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            QueueEntry::Suggestion(s) => &s.emoji_name,
            QueueEntry::Emoji(e) => &e.name,
        }
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueEntry::Suggestion(s) => {
                write!(f, "Suggestion #{} :{}: {}", s.idx, s.emoji_name, s.emoji_url)
            }
            QueueEntry::Emoji(e) => write!(f, ":{}: ({}) {}", e.name, e.id, e.url),
        }
    }
}

/// Numeric token to stored suggestion. Parse failures and misses fall through.
async fn lookup_suggestion(ctx: &Context, token: &str) -> Resolution<Suggestion> {
    let Ok(id) = token.parse::<Id>() else {
        return Resolution::Fallthrough;
    };
    match ctx.store().get_suggestion_by_id(id).await {
        Ok(suggestion) => Resolution::Resolved(suggestion),
        Err(StorageError::NotFound(what)) => Resolution::Fatal(ConversionError::NotFound(what)),
        Err(e) => Resolution::Fatal(e.into()),
    }
}

struct SuggestionIdStrategy;

#[async_trait]
impl Strategy<PartialSuggestion> for SuggestionIdStrategy {
    fn name(&self) -> &'static str {
        "suggestion-id"
    }

    async fn attempt(&self, ctx: &Context, token: &str) -> Resolution<PartialSuggestion> {
        match lookup_suggestion(ctx, token).await {
            Resolution::Resolved(s) => Resolution::Resolved(PartialSuggestion {
                idx: Some(s.idx),
                image_url: s.emoji_url,
            }),
            Resolution::Fallthrough => Resolution::Fallthrough,
            Resolution::Fatal(e) => Resolution::Fatal(e),
        }
    }
}

struct EmojiImageStrategy;

#[async_trait]
impl Strategy<PartialSuggestion> for EmojiImageStrategy {
    fn name(&self) -> &'static str {
        "emoji"
    }

    async fn attempt(&self, ctx: &Context, token: &str) -> Resolution<PartialSuggestion> {
        match EmojiConverter.resolve(ctx, token).await {
            Ok(emoji) => Resolution::Resolved(PartialSuggestion {
                idx: None,
                image_url: emoji.url,
            }),
            Err(ConversionError::BadArgument(_)) => Resolution::Fallthrough,
            Err(e) => Resolution::Fatal(e),
        }
    }
}

/// Waits for the chat service to attach a link preview with a thumbnail
struct LinkPreviewStrategy;

#[async_trait]
impl Strategy<PartialSuggestion> for LinkPreviewStrategy {
    fn name(&self) -> &'static str {
        "link-preview"
    }

    async fn attempt(&self, ctx: &Context, token: &str) -> Resolution<PartialSuggestion> {
        if !(token.starts_with("http://") || token.starts_with("https://")) {
            return Resolution::Fallthrough;
        }

        let chat = ctx.chat();
        let (channel_id, message_id) = (ctx.message.channel_id, ctx.message.id);
        if let Err(e) = chat.trigger_typing(channel_id).await {
            warn!("Failed to trigger typing in {}: {}", channel_id, e);
        }

        let found = poll_until(ctx.poll_settings(), |attempt| async move {
            match chat.fetch_embeds(channel_id, message_id).await {
                Ok(embeds) => Ok::<_, ConversionError>(
                    embeds
                        .into_iter()
                        .next()
                        .and_then(|embed| embed.thumbnail)
                        .map(|thumbnail| thumbnail.proxy_url),
                ),
                Err(e) => {
                    debug!("Embed fetch {} for message {} failed: {}", attempt, message_id, e);
                    Ok(None)
                }
            }
        })
        .await;

        match found {
            Ok(Some(proxy_url)) => Resolution::Resolved(PartialSuggestion {
                idx: None,
                image_url: proxy_url,
            }),
            Ok(None) => Resolution::Fallthrough,
            Err(e) => Resolution::Fatal(e),
        }
    }
}

/// Suggestion id, emoji, or image link
pub struct PartialSuggestionConverter {
    pipeline: Pipeline<PartialSuggestion>,
}

impl PartialSuggestionConverter {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::new(UNRESOLVED_SUGGESTION_OR_IMAGE)
                .with_strategy(SuggestionIdStrategy)
                .with_strategy(EmojiImageStrategy)
                .with_strategy(LinkPreviewStrategy),
        }
    }

    pub async fn resolve(
        &self,
        ctx: &Context,
        token: &str,
    ) -> Result<PartialSuggestion, ConversionError> {
        self.pipeline.run(ctx, token).await
    }
}

impl Default for PartialSuggestionConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Converter for PartialSuggestionConverter {
    async fn convert(&self, ctx: &Context, token: &str) -> Result<Argument, ConversionError> {
        self.resolve(ctx, token).await.map(Argument::from)
    }
}

/// Suggestion id that must be in the public queue. Not-in-queue is a validation
/// failure and stops the pipeline.
struct PublicSuggestionStrategy;

#[async_trait]
impl Strategy<QueueEntry> for PublicSuggestionStrategy {
    fn name(&self) -> &'static str {
        "public-suggestion"
    }

    async fn attempt(&self, ctx: &Context, token: &str) -> Resolution<QueueEntry> {
        match lookup_suggestion(ctx, token).await {
            Resolution::Resolved(s) if !s.in_public_queue => {
                Resolution::Fatal(ConversionError::bad_argument(format!(
                    "Suggestion #{} is not in the public queue.",
                    s.idx
                )))
            }
            Resolution::Resolved(s) => Resolution::Resolved(QueueEntry::Suggestion(s)),
            Resolution::Fallthrough => Resolution::Fallthrough,
            Resolution::Fatal(e) => Resolution::Fatal(e),
        }
    }
}

/// Last resort: the emoji converter's own error is the user-facing one
struct EmojiEntryStrategy;

#[async_trait]
impl Strategy<QueueEntry> for EmojiEntryStrategy {
    fn name(&self) -> &'static str {
        "emoji"
    }

    async fn attempt(&self, ctx: &Context, token: &str) -> Resolution<QueueEntry> {
        match EmojiConverter.resolve(ctx, token).await {
            Ok(emoji) => Resolution::Resolved(QueueEntry::Emoji(emoji)),
            Err(e) => Resolution::Fatal(e),
        }
    }
}

/// Public-queue suggestion id or emoji
pub struct PublicQueueOrEmojiConverter {
    pipeline: Pipeline<QueueEntry>,
}

impl PublicQueueOrEmojiConverter {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::new(UNRESOLVED_SUGGESTION_OR_IMAGE)
                .with_strategy(PublicSuggestionStrategy)
                .with_strategy(EmojiEntryStrategy),
        }
    }

    pub async fn resolve(&self, ctx: &Context, token: &str) -> Result<QueueEntry, ConversionError> {
        self.pipeline.run(ctx, token).await
    }
}

impl Default for PublicQueueOrEmojiConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Converter for PublicQueueOrEmojiConverter {
    async fn convert(&self, ctx: &Context, token: &str) -> Result<Argument, ConversionError> {
        self.resolve(ctx, token).await.map(Argument::from)
    }
}
