//! Custom emoji converter

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{Argument, Converter};
use crate::application::errors::ConversionError;
use crate::application::messaging::Context;
use crate::domain::entities::{Emoji, Id};

static EMOJI_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{15,20})$").expect("valid emoji id pattern"));

static EMOJI_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<a?:[A-Za-z0-9_]{1,32}:([0-9]{15,20})>$").expect("valid emoji mention pattern")
});

/// Extract the emoji id from a bare id or a `<:name:id>` / `<a:name:id>` mention
pub fn parse_emoji_id(token: &str) -> Option<Id> {
    EMOJI_ID
        .captures(token)
        .or_else(|| EMOJI_MENTION.captures(token))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Resolves a token to a custom emoji by id, mention or name
pub struct EmojiConverter;

impl EmojiConverter {
    pub async fn resolve(&self, ctx: &Context, token: &str) -> Result<Emoji, ConversionError> {
        let chat = ctx.chat();
        let found = match parse_emoji_id(token) {
            Some(id) => chat.emoji_by_id(id).await?,
            None => chat.emoji_by_name(token).await?,
        };
        found.ok_or_else(|| {
            ConversionError::bad_argument(format!("Emoji \"{}\" not found.", token))
        })
    }
}

#[async_trait]
impl Converter for EmojiConverter {
    async fn convert(&self, ctx: &Context, token: &str) -> Result<Argument, ConversionError> {
        self.resolve(ctx, token).await.map(Argument::Emoji)
    }
}
