//! Invocation context passed to converters and command callbacks

use crate::application::converters::PollSettings;
use crate::application::services::Runtime;
use crate::domain::entities::{Message, User};
use crate::domain::traits::{ChatService, SuggestionStore};

use super::parser::Invocation;

/// Per-message request context. Built for each inbound command, discarded after dispatch.
#[derive(Clone)]
pub struct Context {
    pub message: Message,
    pub invocation: Invocation,
    runtime: Runtime,
}

impl Context {
    pub fn new(message: Message, invocation: Invocation, runtime: Runtime) -> Self {
        Self {
            message,
            invocation,
            runtime,
        }
    }

    pub fn author(&self) -> &User {
        &self.message.author
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn chat(&self) -> &dyn ChatService {
        self.runtime.chat()
    }

    pub fn store(&self) -> &dyn SuggestionStore {
        self.runtime.store()
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.runtime.config().converters.poll_settings()
    }
}
