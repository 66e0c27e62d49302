//! Startup configuration: which store backend to use and where it lives, plus
//! the default log filter. Stored as JSON beside the data it describes.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Environment variable that relocates the whole data directory.
pub const HOME_ENV_VAR: &str = "BEAT_NAMES_HOME";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".beat-names";
const CONFIG_FILE_NAME: &str = "config.json";
/// SQLite file name used when the config does not name one.
const DB_FILE_NAME: &str = "beat-names.sqlite";
const DEFAULT_LOG_FILTER: &str = "info,beat_names=debug";

/// Which [`EntryStore`](crate::db::EntryStore) implementation to open.
/// Written as `"sqlite"` or `"json_file"` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Document-style database in a single SQLite file.
    Sqlite,
    /// Two whole-array JSON files in a directory.
    JsonFile,
}

/// Backend selection as written in the config file. A relative `path` is
/// resolved against the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub backend: BackendKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            path: None,
        }
    }
}

/// Fully resolved connection parameters handed to [`crate::db::open_store`].
/// For SQLite `path` is the database file; for JSON it is the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub path: PathBuf,
}

/// Everything read from `config.json`. Missing fields fall back to defaults,
/// so a hand-written file only needs the parts it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            store: StoreSettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    pub fn store_config(&self, data_dir: &Path) -> StoreConfig {
        let path = match &self.store.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => match self.store.backend {
                BackendKind::Sqlite => data_dir.join(DB_FILE_NAME),
                BackendKind::JsonFile => data_dir.to_path_buf(),
            },
        };
        StoreConfig {
            backend: self.store.backend,
            path,
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Resolve the data directory: `$BEAT_NAMES_HOME` when set, otherwise
/// `~/.beat-names`.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(HOME_ENV_VAR).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// A schema upgrade applied while loading. Config is read before logging is
/// installed, so the caller logs this once a subscriber exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaMigration {
    pub from: u32,
    pub to: u32,
}

/// Result of [`ConfigStore::load_or_init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub migration: Option<SchemaMigration>,
}

/// Reads and writes `config.json` inside the data directory.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(CONFIG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, writing the defaults first when no file exists yet.
    pub fn load_or_init(&self) -> Result<LoadedConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(LoadedConfig {
                config,
                migration: None,
            });
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse config json")?;
        let migration = self.migrate(&mut config);
        if migration.is_some() {
            self.save(&config)?;
        }
        Ok(LoadedConfig { config, migration })
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Bring an older config forward, reporting what changed.
    fn migrate(&self, config: &mut AppConfig) -> Option<SchemaMigration> {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return None;
        }

        let migration = SchemaMigration {
            from: config.schema_version,
            to: CURRENT_SCHEMA_VERSION,
        };
        if config.log_filter.trim().is_empty() {
            config.log_filter = default_log_filter();
        }
        config.schema_version = CURRENT_SCHEMA_VERSION;
        Some(migration)
    }
}
