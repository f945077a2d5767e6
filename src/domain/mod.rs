//! Domain layer - Core business objects with no infrastructure dependencies
//! 
//! This layer contains:
//! - Entities: Core objects (User, Message, Command, Suggestion, Emoji)
//! - Traits: Abstractions for infrastructure (ChatService, SuggestionStore)

pub mod entities;
pub mod traits;
