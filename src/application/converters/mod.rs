//! Argument converters - Turn raw command tokens into typed values
//!
//! A converter is either a single lookup (`TextConverter`, `EmojiConverter`) or a
//! [`Pipeline`] of ordered strategies. Each strategy resolves the token, falls
//! through to the next one, or fails the whole conversion.

pub mod emoji;
pub mod poll;
pub mod suggestion;

use async_trait::async_trait;
use tracing::debug;

use crate::application::errors::ConversionError;
use crate::application::messaging::Context;
use crate::domain::entities::Emoji;

pub use emoji::EmojiConverter;
pub use poll::{poll_until, PollSettings};
pub use suggestion::{
    PartialSuggestion, PartialSuggestionConverter, PublicQueueOrEmojiConverter, QueueEntry,
};

/// A bound command argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Text(String),
    Emoji(Emoji),
    PartialSuggestion(PartialSuggestion),
    QueueEntry(QueueEntry),
}

impl Argument {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Emoji> for Argument {
    fn from(emoji: Emoji) -> Self {
        Argument::Emoji(emoji)
    }
}

impl From<PartialSuggestion> for Argument {
    fn from(value: PartialSuggestion) -> Self {
        Argument::PartialSuggestion(value)
    }
}

impl From<QueueEntry> for Argument {
    fn from(value: QueueEntry) -> Self {
        Argument::QueueEntry(value)
    }
}

/// Converter trait - resolves one argument slot
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, ctx: &Context, token: &str) -> Result<Argument, ConversionError>;
}

/// Passes the token through unchanged
pub struct TextConverter;

#[async_trait]
impl Converter for TextConverter {
    async fn convert(&self, _ctx: &Context, token: &str) -> Result<Argument, ConversionError> {
        Ok(Argument::Text(token.to_string()))
    }
}

/// Outcome of a single strategy attempt
#[derive(Debug)]
pub enum Resolution<T> {
    Resolved(T),
    Fallthrough,
    Fatal(ConversionError),
}

/// One resolution attempt inside a [`Pipeline`]
#[async_trait]
pub trait Strategy<T: Send>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, ctx: &Context, token: &str) -> Resolution<T>;
}

/// Ordered strategy list with a fixed failure message when every strategy falls through
pub struct Pipeline<T: Send> {
    strategies: Vec<Box<dyn Strategy<T>>>,
    exhausted: String,
}

impl<T: Send> Pipeline<T> {
    pub fn new(exhausted: impl Into<String>) -> Self {
        Self {
            strategies: Vec::new(),
            exhausted: exhausted.into(),
        }
    }

    pub fn with_strategy<S: Strategy<T> + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order. A `NotFound` never escapes: it is treated as a fallthrough.
    pub async fn run(&self, ctx: &Context, token: &str) -> Result<T, ConversionError> {
        for strategy in &self.strategies {
            match strategy.attempt(ctx, token).await {
                Resolution::Resolved(value) => {
                    debug!("Strategy '{}' resolved {:?}", strategy.name(), token);
                    return Ok(value);
                }
                Resolution::Fallthrough => {
                    debug!("Strategy '{}' fell through for {:?}", strategy.name(), token);
                }
                Resolution::Fatal(ConversionError::NotFound(what)) => {
                    debug!("Strategy '{}' missed {}", strategy.name(), what);
                }
                Resolution::Fatal(err) => return Err(err),
            }
        }
        Err(ConversionError::BadArgument(self.exhausted.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::context::tests::test_context;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        outcome: fn() -> Resolution<u32>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Strategy<u32> for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn attempt(&self, _ctx: &Context, _token: &str) -> Resolution<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn fixed(outcome: fn() -> Resolution<u32>, calls: &Arc<AtomicUsize>) -> Fixed {
        Fixed {
            outcome,
            calls: Arc::clone(calls),
        }
    }

    #[tokio::test]
    async fn test_first_resolved_wins() {
        let (ctx, _chat, _store) = test_context("x");
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new("nope")
            .with_strategy(fixed(|| Resolution::Fallthrough, &calls))
            .with_strategy(fixed(|| Resolution::Resolved(7), &calls))
            .with_strategy(fixed(|| Resolution::Resolved(9), &calls));

        assert_eq!(pipeline.run(&ctx, "x").await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_stops_pipeline() {
        let (ctx, _chat, _store) = test_context("x");
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new("nope")
            .with_strategy(fixed(
                || Resolution::Fatal(ConversionError::bad_argument("invalid")),
                &calls,
            ))
            .with_strategy(fixed(|| Resolution::Resolved(9), &calls));

        let err = pipeline.run(&ctx, "x").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_never_escapes() {
        let (ctx, _chat, _store) = test_context("x");
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new("Couldn't resolve.")
            .with_strategy(fixed(
                || Resolution::Fatal(ConversionError::NotFound("row".into())),
                &calls,
            ))
            .with_strategy(fixed(|| Resolution::Fallthrough, &calls));

        let err = pipeline.run(&ctx, "x").await.unwrap_err();
        assert!(matches!(err, ConversionError::BadArgument(ref m) if m == "Couldn't resolve."));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
