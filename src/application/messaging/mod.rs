//! Message handling - Parsing, invocation context and command dispatch

pub mod context;
pub mod dispatcher;
pub mod parser;

pub use context::Context;
pub use dispatcher::{CommandDispatcher, RouterOutcome};
pub use parser::{Invocation, MessageParser};
