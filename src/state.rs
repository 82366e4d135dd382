use sqlx::SqlitePool;
use std::sync::Arc;

use hifz_core::EntryStore;

use crate::db::SqliteEntryStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub entries: Arc<dyn EntryStore>,
}

impl AppState {
    /// State backed entirely by the SQLite pool.
    pub fn new(pool: SqlitePool) -> Self {
        let entries = Arc::new(SqliteEntryStore::new(pool.clone()));
        Self { pool, entries }
    }

    /// State with a different entry store; the pool still holds the roster.
    pub fn with_entry_store(pool: SqlitePool, entries: Arc<dyn EntryStore>) -> Self {
        Self { pool, entries }
    }
}
