//! Ratatui front-end: three tabs over a single [`EntryStore`](crate::db::EntryStore).
//!
//! * Browse & Add lists every name grouped by category and owns the bulk add
//!   form and delete confirmation.
//! * Random Picker drives a [`Picker`](crate::picker::Picker). The animation
//!   is ticked from the event loop, so the poll timeout follows the picker's
//!   next deadline instead of a fixed frame rate.
//! * Used Names lists picked names with their date and restores them.
//!
//! Every mutation is followed by a full reload from the store; the UI never
//! patches its snapshot in place.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
