//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite suggestion store
//! - Storage: In-memory suggestion store
//! - Adapters: Chat service implementations (console, in-memory)

pub mod adapters;
pub mod config;
pub mod database;
pub mod storage;
