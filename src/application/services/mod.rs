//! Application services - Runtime state and lifecycle

pub mod bot;
pub mod runtime;

pub use bot::Queuebot;
pub use runtime::Runtime;
