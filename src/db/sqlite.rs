use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use tracing::{error, info};

use crate::models::{Category, Entry, EntryDraft};

use super::categories::{delete_category, fetch_categories, seed_default_categories, upsert_category};
use super::connection::{ensure_schema, open_database};
use super::entries::{create_entry, delete_entry, fetch_entries, update_used};
use super::{EntryStore, StoreError};

/// Document-store backend: the `beat_names` and `categories` collections live
/// as two tables in one SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    /// Wrap an existing connection, creating the schema if it is missing.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_categories(&self) -> rusqlite::Result<Vec<Category>> {
        let categories = fetch_categories(&self.conn)?;
        if !categories.is_empty() {
            return Ok(categories);
        }

        if seed_default_categories(&self.conn)? {
            info!("seeded default categories");
        }
        fetch_categories(&self.conn)
    }
}

impl EntryStore for SqliteStore {
    fn list_entries(&self) -> Vec<Entry> {
        fetch_entries(&self.conn).unwrap_or_else(|err| {
            error!(error = %err, "failed to list entries");
            Vec::new()
        })
    }

    fn list_categories(&self) -> Vec<Category> {
        self.load_categories().unwrap_or_else(|err| {
            error!(error = %err, "failed to list categories");
            Vec::new()
        })
    }

    fn add_entry(&self, draft: &EntryDraft) -> Result<Entry, StoreError> {
        let entry = create_entry(&self.conn, draft)?;
        info!(id = %entry.id, category = %entry.category_id, "entry added");
        Ok(entry)
    }

    fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        delete_entry(&self.conn, id)?;
        info!(id, "entry deleted");
        Ok(())
    }

    fn set_used(&self, id: &str, used: bool) -> Result<(), StoreError> {
        let used_at = used.then(Utc::now);
        update_used(&self.conn, id, used_at)?;
        info!(id, used, "entry usage updated");
        Ok(())
    }

    fn add_category(&self, category: &Category) -> Result<(), StoreError> {
        upsert_category(&self.conn, category)?;
        info!(id = %category.id, "category saved");
        Ok(())
    }

    fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        delete_category(&self.conn, id)?;
        info!(id, "category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> SqliteStore {
        let conn = Connection::open_in_memory().expect("in-memory db");
        SqliteStore::from_connection(conn).expect("store")
    }

    #[test]
    fn empty_store_seeds_and_persists_defaults() {
        let store = memory_store();
        let categories = store.list_categories();
        assert_eq!(categories.len(), 10);

        let persisted = fetch_categories(&store.conn).expect("fetch");
        assert_eq!(persisted, categories);
    }

    #[test]
    fn set_used_keeps_flag_and_timestamp_together() {
        let store = memory_store();
        let entry = store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");

        store.set_used(&entry.id, true).expect("mark used");
        let used: (bool, Option<i64>) = store
            .conn
            .query_row(
                "SELECT used, used_at FROM beat_names WHERE id = ?1",
                [&entry.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("row");
        assert!(used.0);
        assert!(used.1.is_some());

        store.set_used(&entry.id, false).expect("restore");
        let restored = store.list_entries().remove(0);
        assert_eq!(restored.used_at, None);
    }

    #[test]
    fn list_entries_swallows_backend_failures() {
        let store = memory_store();
        store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");
        store
            .conn
            .execute("DROP TABLE beat_names", [])
            .expect("drop table");

        assert!(store.list_entries().is_empty());
        assert!(store.add_entry(&EntryDraft::new("Passion", "1")).is_err());
    }
}
