//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Converters: Argument conversion pipelines
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing and command dispatch
//! - Services: Runtime handle and the bot shell

pub mod converters;
pub mod errors;
pub mod messaging;
pub mod services;
