use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use crate::models::{default_categories, Category};

use super::StoreError;

/// Retrieve every category in the order it was created. Seeded ids are
/// strings ("1".."10"), so insertion order is the only meaningful ordering.
pub(crate) fn fetch_categories(conn: &Connection) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM categories ORDER BY rowid")?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(categories)
}

/// Seed the default categories when the table is empty. The emptiness check
/// and the inserts share one `IMMEDIATE` transaction, so two processes racing
/// on a fresh file cannot both seed. Returns whether anything was written.
pub(crate) fn seed_default_categories(conn: &Connection) -> rusqlite::Result<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    if existing > 0 {
        tx.rollback()?;
        return Ok(false);
    }

    {
        let mut stmt =
            tx.prepare("INSERT OR IGNORE INTO categories (id, name, color) VALUES (?1, ?2, ?3)")?;
        for category in default_categories() {
            stmt.execute(params![category.id, category.name, category.color])?;
        }
    }

    tx.commit()?;
    Ok(true)
}

/// Insert a category or replace the one sharing its id.
pub(crate) fn upsert_category(conn: &Connection, category: &Category) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO categories (id, name, color) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, color = excluded.color",
        params![category.id, category.name, category.color],
    )?;
    Ok(())
}

/// Remove a category row. Entries pointing at it are left alone and simply
/// drop out of grouped views.
pub(crate) fn delete_category(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let deleted = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(StoreError::category_not_found(id))
    } else {
        Ok(())
    }
}
