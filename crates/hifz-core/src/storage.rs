use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::{EntryDraft, MemorizationEntry};
use crate::error::CoreError;

/// Result of an upsert keyed on (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub entry: MemorizationEntry,
    /// False when an existing entry for the same day was overwritten.
    pub created: bool,
}

/// Persistence for memorization entries.
///
/// The aggregator never talks to a store; callers load a snapshot with
/// [`EntryStore::list`] and hand it over.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries of a user. No ordering is guaranteed.
    async fn list(&self, user_id: Uuid) -> Result<Vec<MemorizationEntry>, CoreError>;

    /// Insert, or overwrite the entry already stored for the same (user, date).
    /// An overwrite keeps the original id.
    async fn upsert(&self, user_id: Uuid, draft: EntryDraft) -> Result<UpsertOutcome, CoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<MemorizationEntry>, CoreError>;

    /// Delete by id. Returns false when nothing was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, CoreError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    use crate::validation::Validator;

    /// In-memory entry store for testing.
    #[derive(Default)]
    pub struct InMemoryEntryStore {
        entries: RwLock<HashMap<Uuid, MemorizationEntry>>,
    }

    impl InMemoryEntryStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl EntryStore for InMemoryEntryStore {
        async fn list(&self, user_id: Uuid) -> Result<Vec<MemorizationEntry>, CoreError> {
            let entries = self.entries.read().unwrap();
            Ok(entries
                .values()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn upsert(
            &self,
            user_id: Uuid,
            draft: EntryDraft,
        ) -> Result<UpsertOutcome, CoreError> {
            Validator::validate_draft(&draft)?;
            let mut entries = self.entries.write().unwrap();

            let fresh = draft.into_entry(Uuid::new_v4(), user_id)?;
            let existing_id = entries
                .values()
                .find(|e| e.user_id == user_id && e.date == fresh.date)
                .map(|e| e.id);

            let (entry, created) = match existing_id {
                Some(id) => (MemorizationEntry { id, ..fresh }, false),
                None => (fresh, true),
            };
            entries.insert(entry.id, entry.clone());
            Ok(UpsertOutcome { entry, created })
        }

        async fn get(&self, id: Uuid) -> Result<Option<MemorizationEntry>, CoreError> {
            Ok(self.entries.read().unwrap().get(&id).cloned())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
            Ok(self.entries.write().unwrap().remove(&id).is_some())
        }
    }

}
