//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Shown to the invoking user verbatim.
    #[error("{0}")]
    BadArgument(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,
}

/// Argument conversion errors
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The token could not be resolved, or failed validation. User-visible.
    #[error("{0}")]
    BadArgument(String),

    /// Lookup miss. Consumed inside the pipeline as a fallthrough.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Chat service error: {0}")]
    Chat(#[from] BotError),
}

impl ConversionError {
    pub fn bad_argument(msg: impl Into<String>) -> Self {
        ConversionError::BadArgument(msg.into())
    }
}

impl From<ConversionError> for CommandError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::BadArgument(msg) => CommandError::BadArgument(msg),
            other => CommandError::ExecutionFailed(other.to_string()),
        }
    }
}

/// Extension discovery and lifecycle errors
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Failed to discover extensions in {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load extension '{name}': {cause}")]
    Load { name: String, cause: String },

    #[error("Extension '{0}' is not loaded")]
    NotLoaded(String),
}

impl ExtensionError {
    pub fn load(name: impl Into<String>, cause: impl Into<String>) -> Self {
        ExtensionError::Load {
            name: name.into(),
            cause: cause.into(),
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage closed")]
    Closed,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
