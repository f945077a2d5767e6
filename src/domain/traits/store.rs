use async_trait::async_trait;

use crate::application::errors::StorageError;
use crate::domain::entities::{Id, Suggestion};

/// Store trait - abstraction over suggestion persistence
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Fails with `StorageError::NotFound` when no suggestion has this id.
    async fn get_suggestion_by_id(&self, id: Id) -> Result<Suggestion, StorageError>;

    /// Release the underlying connection
    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
