//! In-memory suggestion store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{Id, Suggestion};
use crate::domain::traits::SuggestionStore;

/// Suggestion store kept in memory, for development and tests
#[derive(Default)]
pub struct MemoryStore {
    suggestions: Arc<RwLock<HashMap<Id, Suggestion>>>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, suggestion: Suggestion) {
        let mut suggestions = self.suggestions.write().await;
        suggestions.insert(suggestion.id, suggestion);
    }

    /// Number of `get_suggestion_by_id` calls so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn get_suggestion_by_id(&self, id: Id) -> Result<Suggestion, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let suggestions = self.suggestions.read().await;
        suggestions
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("suggestion {}", id)))
    }
}
