//! Domain entities - Core business objects

pub mod user;
pub mod message;
pub mod command;
pub mod suggestion;
pub mod emoji;
pub mod guild;

/// Numeric identifier assigned by the chat service or the datastore
pub type Id = u64;

pub use user::User;
pub use message::{Embed, Message, Thumbnail};
pub use command::{Command, CommandCallback, CommandRegistry, Param, Reply};
pub use suggestion::Suggestion;
pub use emoji::Emoji;
pub use guild::Guild;
