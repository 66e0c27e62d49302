use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::models::{Entry, EntryDraft};

use super::StoreError;

/// Fetch every entry, newest first. Rows inserted within the same
/// millisecond fall back to insertion order so a bulk add still lists the
/// last line on top.
pub(crate) fn fetch_entries(conn: &Connection) -> rusqlite::Result<Vec<Entry>> {
    let mut stmt = conn.prepare(
        "SELECT id, label, category_id, created_at, used_at
         FROM beat_names
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(entries)
}

/// Insert a new entry under a freshly generated id and echo the hydrated
/// struct back.
pub(crate) fn create_entry(conn: &Connection, draft: &EntryDraft) -> Result<Entry, StoreError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO beat_names (id, label, category_id, created_at, used, used_at)
         VALUES (?1, ?2, ?3, ?4, 0, NULL)",
        params![
            id,
            draft.label,
            draft.category_id,
            draft.created_at.timestamp_millis()
        ],
    )?;

    Ok(Entry::from_draft(id, draft))
}

pub(crate) fn delete_entry(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let deleted = conn.execute("DELETE FROM beat_names WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(StoreError::entry_not_found(id))
    } else {
        Ok(())
    }
}

/// Flip the used marker. `used_at` follows the flag in the same statement.
pub(crate) fn update_used(
    conn: &Connection,
    id: &str,
    used_at: Option<DateTime<Utc>>,
) -> Result<(), StoreError> {
    let updated = conn.execute(
        "UPDATE beat_names SET used = ?1, used_at = ?2 WHERE id = ?3",
        params![
            used_at.is_some(),
            used_at.map(|at| at.timestamp_millis()),
            id
        ],
    )?;

    if updated == 0 {
        Err(StoreError::entry_not_found(id))
    } else {
        Ok(())
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let created_at: i64 = row.get(3)?;
    let used_at: Option<i64> = row.get(4)?;
    Ok(Entry {
        id: row.get(0)?,
        label: row.get(1)?,
        category_id: row.get(2)?,
        created_at: millis_to_utc(3, created_at)?,
        used_at: used_at.map(|ms| millis_to_utc(4, ms)).transpose()?,
    })
}

fn millis_to_utc(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}
