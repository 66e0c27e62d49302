use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (creating if needed) the SQLite file at `path` and make sure the
/// schema exists.
pub(crate) fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the two collections lazily. Category references are advisory, so
/// there is no foreign key between them. The `CHECK` keeps the used flag and
/// its timestamp in step.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create categories table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS beat_names (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            category_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            used INTEGER NOT NULL DEFAULT 0,
            used_at INTEGER,
            CHECK ((used = 0 AND used_at IS NULL) OR (used = 1 AND used_at IS NOT NULL))
        )",
        [],
    )
    .context("failed to create beat_names table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS beat_names_created_at ON beat_names (created_at DESC)",
        [],
    )
    .context("failed to create beat_names index")?;

    Ok(())
}
