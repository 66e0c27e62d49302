use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use tempfile::tempdir;

use beat_names::models::parse_bulk_labels;
use beat_names::picker::{available_candidates, restore, PickerPhase};
use beat_names::{
    add_entries, CategoryFilter, EntryDraft, EntryStore, JsonFileStore, Picker, SqliteStore,
};

fn sqlite_store() -> SqliteStore {
    let conn = Connection::open_in_memory().expect("in-memory db");
    SqliteStore::from_connection(conn).expect("store")
}

/// Run one full pick against `store` and return the chosen entry's id.
fn pick(store: &dyn EntryStore, filter: CategoryFilter, rng: &mut StdRng) -> Option<String> {
    let mut picker = Picker::new();
    picker.set_filter(filter);
    let candidates = available_candidates(&store.list_entries(), picker.filter());
    let start = Instant::now();
    if !picker.start(candidates, start) {
        return None;
    }
    let picked = picker
        .advance(start + Duration::from_secs(2), rng, store)
        .expect("set_used succeeds")
        .expect("pick settles");
    assert_eq!(picker.phase(), PickerPhase::Settled);
    Some(picked.id)
}

#[test]
fn fresh_stores_start_with_ten_categories() {
    let sqlite = sqlite_store();
    assert_eq!(sqlite.list_categories().len(), 10);

    let dir = tempdir().expect("tempdir");
    let json = JsonFileStore::open(dir.path()).expect("json store");
    let names: Vec<String> = json.list_categories().into_iter().map(|c| c.name).collect();
    assert_eq!(names.len(), 10);
    assert_eq!(names[0], "Love & Emotion");
    assert_eq!(names[9], "Simple & Powerful");
}

#[test]
fn pasted_list_becomes_one_entry_per_line() {
    let store = sqlite_store();
    let drafts: Vec<EntryDraft> = parse_bulk_labels("1. Amore\nPassion\n\n2. Desire")
        .into_iter()
        .map(|label| EntryDraft::new(label, "1"))
        .collect();

    let report = add_entries(&store, &drafts);
    assert!(report.is_complete());

    let mut labels: Vec<String> = store.list_entries().into_iter().map(|e| e.label).collect();
    labels.sort();
    assert_eq!(labels, vec!["Amore", "Desire", "Passion"]);
}

#[test]
fn picking_marks_exactly_the_chosen_entry_used() {
    let store = sqlite_store();
    store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");
    store.add_entry(&EntryDraft::new("Passion", "1")).expect("add");
    store.add_entry(&EntryDraft::new("Luce", "9")).expect("add");
    let mut rng = StdRng::seed_from_u64(7);

    let picked = pick(&store, CategoryFilter::Only("1".to_string()), &mut rng).expect("picked");

    let entries = store.list_entries();
    let used: Vec<_> = entries.iter().filter(|e| e.is_used()).collect();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].id, picked);
    assert_eq!(used[0].category_id, "1");
    assert!(used[0].used_at.is_some());
}

#[test]
fn exhausted_category_cannot_be_picked_until_restored() {
    let store = sqlite_store();
    let only = store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");
    let mut rng = StdRng::seed_from_u64(1);
    let love = CategoryFilter::Only("1".to_string());

    assert_eq!(pick(&store, love.clone(), &mut rng), Some(only.id.clone()));
    assert_eq!(pick(&store, love.clone(), &mut rng), None);

    restore(&store, &only.id).expect("restore");
    let restored = store
        .list_entries()
        .into_iter()
        .find(|e| e.id == only.id)
        .expect("still present");
    assert!(restored.used_at.is_none());
    assert_eq!(pick(&store, love, &mut rng), Some(only.id));
}

#[test]
fn deleted_entries_leave_every_view() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::open(dir.path()).expect("json store");
    let kept = store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");
    let gone = store.add_entry(&EntryDraft::new("Passion", "1")).expect("add");
    store.set_used(&gone.id, true).expect("mark used");

    store.delete_entry(&gone.id).expect("delete");

    let entries = store.list_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, kept.id);
    assert!(entries.iter().all(|e| !e.is_used()));
    assert!(store.delete_entry(&gone.id).is_err());
}

#[test]
fn stores_survive_reopening() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("beat-names.sqlite");
    {
        let store = SqliteStore::open(&db_path).expect("open");
        let entry = store.add_entry(&EntryDraft::new("Amore", "1")).expect("add");
        store.set_used(&entry.id, true).expect("mark used");
    }

    let reopened = SqliteStore::open(&db_path).expect("reopen");
    let entries = reopened.list_entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_used());
    assert_eq!(reopened.list_categories().len(), 10);
}
