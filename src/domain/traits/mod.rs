//! Domain traits - Abstractions for infrastructure implementations

pub mod chat;
pub mod store;

pub use chat::{AppInfo, ChatService};
pub use store::SuggestionStore;
