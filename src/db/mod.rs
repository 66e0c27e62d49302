//! Persistence layer. Both backends implement [`EntryStore`] so the UI and the
//! picker only ever hold a `Box<dyn EntryStore>` built from configuration.

mod categories;
mod connection;
mod entries;
mod json_file;
mod sqlite;

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{BackendKind, StoreConfig};
use crate::models::{Category, Entry, EntryDraft};

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Failures raised by a store backend. Reads never surface these; writes
/// hand them back to the caller untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed data in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl StoreError {
    pub(crate) fn entry_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "entry",
            id: id.to_string(),
        }
    }

    pub(crate) fn category_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "category",
            id: id.to_string(),
        }
    }
}

/// Contract shared by the SQLite and JSON-file backends.
pub trait EntryStore {
    /// Every entry, newest first. Backend failures are logged and produce an
    /// empty list.
    fn list_entries(&self) -> Vec<Entry>;

    /// Every category, seeding the default set first when the store has none.
    /// Read failures are logged and produce an empty list.
    fn list_categories(&self) -> Vec<Category>;

    /// Persist a new entry and return it with its assigned id.
    fn add_entry(&self, draft: &EntryDraft) -> Result<Entry, StoreError>;

    fn delete_entry(&self, id: &str) -> Result<(), StoreError>;

    /// Mark an entry used (stamping the current time) or available again.
    fn set_used(&self, id: &str, used: bool) -> Result<(), StoreError>;

    /// Insert or replace a category by id.
    fn add_category(&self, category: &Category) -> Result<(), StoreError>;

    fn delete_category(&self, id: &str) -> Result<(), StoreError>;
}

/// Outcome of a bulk add. Creates are independent, so some may land while
/// others fail; nothing is rolled back.
#[derive(Debug, Default)]
pub struct BulkAddReport {
    pub created: Vec<Entry>,
    pub failures: Vec<(String, StoreError)>,
}

impl BulkAddReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Create each draft with its own single-record write.
pub fn add_entries(store: &dyn EntryStore, drafts: &[EntryDraft]) -> BulkAddReport {
    let mut report = BulkAddReport::default();
    for draft in drafts {
        match store.add_entry(draft) {
            Ok(entry) => report.created.push(entry),
            Err(err) => {
                warn!(label = %draft.label, error = %err, "failed to add entry");
                report.failures.push((draft.label.clone(), err));
            }
        }
    }
    info!(
        created = report.created.len(),
        failed = report.failures.len(),
        "bulk add finished"
    );
    report
}

/// Build the configured backend.
pub fn open_store(config: &StoreConfig) -> anyhow::Result<Box<dyn EntryStore>> {
    let store: Box<dyn EntryStore> = match config.backend {
        BackendKind::Sqlite => Box::new(SqliteStore::open(&config.path)?),
        BackendKind::JsonFile => Box::new(JsonFileStore::open(&config.path)?),
    };
    info!(backend = ?config.backend, path = %config.path.display(), "store opened");
    Ok(store)
}
