//! Core library surface for the beat names TUI.
//!
//! Names live in a store behind the [`EntryStore`] trait, with one SQLite and
//! one JSON-file implementation chosen in `config.json`. Each name belongs to
//! a category and carries an optional "used at" timestamp. The [`Picker`]
//! spins through the unused names, settles on one at random and marks it used;
//! restoring clears the mark again.
//!
//! Everything the binary needs is re-exported here so integration tests can
//! drive the same pieces without the terminal.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod picker;
pub mod ui;

/// Persistence entry points used by `main.rs` and integration tests.
pub use db::{add_entries, open_store, EntryStore, JsonFileStore, SqliteStore, StoreError};

/// Domain types shared by the stores, the picker and the UI.
pub use models::{Category, Entry, EntryDraft};

/// The random pick state machine and its category filter.
pub use picker::{CategoryFilter, Picker};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
