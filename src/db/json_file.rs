use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{default_categories, Category, Entry, EntryDraft};

use super::{EntryStore, StoreError};

/// File holding the entry array.
const ENTRIES_FILE: &str = "beat-names-data.json";
/// File holding the category array.
const CATEGORIES_FILE: &str = "beat-names-categories.json";

/// Local-storage backend: two JSON arrays on disk, each read and rewritten as
/// a whole on every operation. Assumes a single writer.
pub struct JsonFileStore {
    entries_path: PathBuf,
    categories_path: PathBuf,
}

/// On-disk shape of an entry. Field names match the browser storage format
/// so exported data can be dropped in unchanged.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    id: String,
    name: String,
    category: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    added_at: DateTime<Utc>,
    #[serde(default)]
    used: bool,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    used_at: Option<DateTime<Utc>>,
}

impl From<&Entry> for EntryRecord {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.label.clone(),
            category: entry.category_id.clone(),
            added_at: entry.created_at,
            used: entry.is_used(),
            used_at: entry.used_at,
        }
    }
}

impl From<EntryRecord> for Entry {
    fn from(record: EntryRecord) -> Self {
        let used_at = match (record.used, record.used_at) {
            (true, Some(at)) => Some(at),
            (true, None) => {
                warn!(id = %record.id, "used entry without usedAt, using addedAt");
                Some(record.added_at)
            }
            (false, _) => None,
        };
        Self {
            id: record.id,
            label: record.name,
            category_id: record.category,
            created_at: record.added_at,
            used_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryRecord {
    id: String,
    name: String,
    color: String,
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            color: category.color.clone(),
        }
    }
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category::new(record.id, record.name, record.color)
    }
}

impl JsonFileStore {
    /// Use `dir` as the storage directory, creating it when needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self {
            entries_path: dir.join(ENTRIES_FILE),
            categories_path: dir.join(CATEGORIES_FILE),
        })
    }

    fn read_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let records: Vec<EntryRecord> = read_array(&self.entries_path)?;
        Ok(records.into_iter().map(Entry::from).collect())
    }

    fn write_entries(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let records: Vec<EntryRecord> = entries.iter().map(EntryRecord::from).collect();
        write_array(&self.entries_path, &records)
    }

    fn read_categories(&self) -> Result<Vec<Category>, StoreError> {
        let records: Vec<CategoryRecord> = read_array(&self.categories_path)?;
        Ok(records.into_iter().map(Category::from).collect())
    }

    fn write_categories(&self, categories: &[Category]) -> Result<(), StoreError> {
        let records: Vec<CategoryRecord> = categories.iter().map(CategoryRecord::from).collect();
        write_array(&self.categories_path, &records)
    }
}

impl EntryStore for JsonFileStore {
    fn list_entries(&self) -> Vec<Entry> {
        match self.read_entries() {
            Ok(mut entries) => {
                // Appends go to the end of the array, so reversing first lets
                // the stable sort put later inserts ahead on timestamp ties.
                entries.reverse();
                entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                entries
            }
            Err(err) => {
                error!(error = %err, "failed to list entries");
                Vec::new()
            }
        }
    }

    fn list_categories(&self) -> Vec<Category> {
        let categories = match self.read_categories() {
            Ok(categories) => categories,
            Err(err) => {
                error!(error = %err, "failed to list categories");
                return Vec::new();
            }
        };
        if !categories.is_empty() {
            return categories;
        }

        let defaults = default_categories();
        match self.write_categories(&defaults) {
            Ok(()) => info!("seeded default categories"),
            Err(err) => error!(error = %err, "failed to persist default categories"),
        }
        defaults
    }

    fn add_entry(&self, draft: &EntryDraft) -> Result<Entry, StoreError> {
        let mut entries = self.read_entries()?;
        let entry = Entry::from_draft(Uuid::new_v4().to_string(), draft);
        entries.push(entry.clone());
        self.write_entries(&entries)?;
        info!(id = %entry.id, category = %entry.category_id, "entry added");
        Ok(entry)
    }

    fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(StoreError::entry_not_found(id));
        }
        self.write_entries(&entries)?;
        info!(id, "entry deleted");
        Ok(())
    }

    fn set_used(&self, id: &str, used: bool) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::entry_not_found(id))?;
        entry.used_at = used.then(Utc::now);
        self.write_entries(&entries)?;
        info!(id, used, "entry usage updated");
        Ok(())
    }

    fn add_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut categories = self.read_categories()?;
        match categories.iter_mut().find(|existing| existing.id == category.id) {
            Some(existing) => *existing = category.clone(),
            None => categories.push(category.clone()),
        }
        self.write_categories(&categories)?;
        info!(id = %category.id, "category saved");
        Ok(())
    }

    fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        let mut categories = self.read_categories()?;
        let before = categories.len();
        categories.retain(|category| category.id != id);
        if categories.len() == before {
            return Err(StoreError::category_not_found(id));
        }
        self.write_categories(&categories)?;
        info!(id, "category deleted");
        Ok(())
    }
}

/// Read a whole JSON array. A file that does not exist yet is an empty array.
fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the whole array. Writing to a sibling file and renaming keeps a
/// crash from leaving half an array behind.
fn write_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(items).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let staging = path.with_extension("json.tmp");
    let io_error = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&staging, text).map_err(io_error)?;
    fs::rename(&staging, path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_files_mean_no_entries() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path()).expect("open");
        assert!(store.list_entries().is_empty());
    }

    #[test]
    fn empty_store_seeds_and_persists_defaults() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path()).expect("open");

        assert_eq!(store.list_categories().len(), 10);
        let raw = fs::read_to_string(dir.path().join(CATEGORIES_FILE)).expect("categories file");
        let stored: Vec<Value> = serde_json::from_str(&raw).expect("json");
        assert_eq!(stored.len(), 10);
        assert_eq!(stored[0]["name"], "Love & Emotion");
    }

    #[test]
    fn records_keep_used_and_used_at_together_on_disk() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path()).expect("open");
        let entry = store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");
        store.add_entry(&EntryDraft::new("Passion", "1")).expect("add");
        store.set_used(&entry.id, true).expect("mark used");

        let raw = fs::read_to_string(dir.path().join(ENTRIES_FILE)).expect("entries file");
        let stored: Vec<Value> = serde_json::from_str(&raw).expect("json");
        for record in &stored {
            let used = record["used"].as_bool().unwrap_or(false);
            assert_eq!(used, record.get("usedAt").is_some(), "record {record}");
        }

        store.set_used(&entry.id, false).expect("restore");
        assert!(store.list_entries().iter().all(|entry| !entry.is_used()));
    }

    #[test]
    fn browser_exports_load_unchanged() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join(ENTRIES_FILE),
            r#"[
                {"id":"a","name":"Amore","category":"1","addedAt":1700000000000,"used":false},
                {"id":"b","name":"Luce","category":"9","addedAt":1700000001000,"used":true,"usedAt":1700000002000},
                {"id":"c","name":"Sogno","category":"3","addedAt":1700000003000,"usedAt":null}
            ]"#,
        )
        .expect("seed file");
        let store = JsonFileStore::open(dir.path()).expect("open");

        let entries = store.list_entries();
        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert!(entries[1].is_used());
        assert!(!entries[0].is_used());
    }

    #[test]
    fn corrupt_files_degrade_reads_and_fail_writes() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(ENTRIES_FILE), "{ not json").expect("seed file");
        let store = JsonFileStore::open(dir.path()).expect("open");

        assert!(store.list_entries().is_empty());
        assert!(matches!(
            store.add_entry(&EntryDraft::new("Amore", "1")),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn delete_removes_entry_and_reports_unknown_ids() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path()).expect("open");
        let entry = store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");

        store.delete_entry(&entry.id).expect("delete");
        assert!(store.list_entries().is_empty());
        assert!(matches!(
            store.delete_entry(&entry.id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn categories_can_be_added_and_removed() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path()).expect("open");
        store.list_categories();

        store
            .add_category(&Category::new("11", "Fire & Ash", "#FF4500"))
            .expect("add");
        assert_eq!(store.list_categories().len(), 11);

        store.delete_category("11").expect("delete");
        assert_eq!(store.list_categories().len(), 10);
    }
}
