//! Queue extension - suggestion and emoji lookups

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::converters::{
    Argument, PartialSuggestionConverter, PublicQueueOrEmojiConverter,
};
use crate::application::errors::{CommandError, ExtensionError};
use crate::application::services::Runtime;
use crate::domain::entities::{Command, Param};
use crate::extensions::{ExtensionUnit, Handler};

pub struct Queue;

impl Handler for Queue {
    fn name(&self) -> &str {
        "Queue"
    }

    fn commands(self: Arc<Self>) -> Vec<Command> {
        vec![
            Command::new("preview", |_ctx, args| async move {
                match args.first() {
                    Some(Argument::PartialSuggestion(partial)) => Ok(Some(match partial.idx {
                        Some(idx) => format!("Suggestion #{}: {}", idx, partial.image_url),
                        None => partial.image_url.clone(),
                    })),
                    _ => Err(CommandError::ExecutionFailed(
                        "preview bound no suggestion".to_string(),
                    )),
                }
            })
            .with_param(Param::new("suggestion", PartialSuggestionConverter::new())),
            Command::new("show", |_ctx, args| async move {
                match args.first() {
                    Some(Argument::QueueEntry(entry)) => Ok(Some(entry.to_string())),
                    _ => Err(CommandError::ExecutionFailed("show bound no entry".to_string())),
                }
            })
            .with_param(Param::new("entry", PublicQueueOrEmojiConverter::new())),
        ]
    }
}

fn setup(runtime: &Runtime) -> Result<(), ExtensionError> {
    match runtime.config().bot.suggestions_channel {
        Some(channel) => info!("Queue extension using suggestions channel {}", channel),
        None => warn!("No suggestions channel configured"),
    }
    Ok(())
}

pub fn extension() -> ExtensionUnit {
    ExtensionUnit::new("queue")
        .with_handler(|_runtime| Ok(Queue))
        .with_setup(setup)
}
