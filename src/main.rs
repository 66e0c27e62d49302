//! Binary entry point that wires configuration, logging and the chosen store
//! into the TUI.
//!
//! Startup order matters: the data directory and `config.json` come first
//! because the config names both the log filter and the store backend. The
//! file logger goes up next, and anything noteworthy from loading the config
//! (a schema migration) is logged only once it exists. The store is opened
//! last and handed to [`App`], which owns it until the user quits.
use anyhow::Context;
use beat_names::config::{self, ConfigStore};
use beat_names::{logging, open_store, run_app, App};
use tracing::{error, info, warn};

/// Load config, start logging, open the store and run the event loop.
///
/// Setup failures (unreadable config, a store that cannot be opened) are
/// returned before the terminal switches to raw mode, so they print normally.
fn main() -> anyhow::Result<()> {
    let data_dir = config::data_dir()?;
    let loaded = ConfigStore::from_dir(&data_dir)
        .load_or_init()
        .context("failed to load configuration")?;
    let config = loaded.config;

    let _log_guard = logging::init(&data_dir.join("logs"), &config.log_filter);
    info!(data_dir = %data_dir.display(), "starting beat-names");
    if let Some(migration) = loaded.migration {
        warn!(
            from = migration.from,
            to = migration.to,
            "migrated config schema"
        );
    }

    let store = open_store(&config.store_config(&data_dir)).inspect_err(|err| {
        error!(error = %err, "failed to open store");
    })?;

    let mut app = App::new(store);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!(error = %err, "terminal session ended with an error");
    }
    result
}
