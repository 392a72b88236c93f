//! Configuration store
//!
//! This module handles loading and saving the dice configuration and presets
//! on top of the embedded database.

use bevy::log::{info, warn};
use std::path::Path;

use super::config::{DiceConfig, Preset, PresetEntry};
use super::database::ConfigDatabase;

/// Owner of persisted configuration: the last-used config and named presets.
pub struct ConfigStore {
    db: ConfigDatabase,
}

impl ConfigStore {
    const CONFIG_DB_KEY: &'static str = "last_dice_config";

    /// Open the store in the app data folder.
    pub fn open() -> Result<Self, String> {
        ConfigDatabase::open().map(Self::from_database)
    }

    /// Open the store in a specific folder.
    pub fn open_in(data_dir: &Path) -> Result<Self, String> {
        ConfigDatabase::open_in(data_dir).map(Self::from_database)
    }

    /// Non-persistent store (for testing).
    pub fn in_memory() -> Result<Self, String> {
        ConfigDatabase::open_in_memory().map(Self::from_database)
    }

    pub fn from_database(db: ConfigDatabase) -> Self {
        Self { db }
    }

    /// Load the last-used configuration. Missing or unreadable data falls back
    /// to the default six-sided configuration.
    pub fn load(&self) -> DiceConfig {
        match self.db.get_setting::<DiceConfig>(Self::CONFIG_DB_KEY) {
            Ok(Some(config)) => {
                info!("Loaded dice configuration ({} sides)", config.sides);
                config
            }
            Ok(None) => DiceConfig::default(),
            Err(e) => {
                warn!("Falling back to default dice configuration: {}", e);
                DiceConfig::default()
            }
        }
    }

    /// Persist the configuration as the last-used one.
    pub fn save(&self, config: &DiceConfig) -> Result<(), String> {
        self.db.set_setting(Self::CONFIG_DB_KEY, config)
    }

    pub fn list_presets(&self) -> Result<Vec<PresetEntry>, String> {
        self.db.list_presets()
    }

    /// Store a preset and return its ID. The name must not be blank. Only
    /// non-empty titles of sides within the preset's side count are kept.
    pub fn save_preset(&self, preset: &Preset) -> Result<i64, String> {
        let name = preset.name.trim();
        if name.is_empty() {
            return Err("Please enter a preset name".to_string());
        }

        let mut cleaned = preset.clone();
        cleaned.name = name.to_string();
        cleaned.sides = preset.to_config().sides;
        let sides = cleaned.sides;
        cleaned
            .titles
            .retain(|side, text| (1..=sides).contains(side) && !text.is_empty());

        let id = self.db.create_preset(&cleaned)?;
        info!("Saved preset {} as id {}", cleaned.name, id);
        Ok(id)
    }

    /// Make a preset the current configuration and persist it.
    pub fn load_preset(&self, id: i64) -> Result<DiceConfig, String> {
        let config = self.db.load_preset(id)?.to_config();
        self.save(&config)?;
        Ok(config)
    }

    pub fn delete_preset(&self, id: i64) -> Result<(), String> {
        self.db.delete_preset(id)
    }

    /// Wipe the configuration and all presets.
    pub fn clear(&self) -> Result<(), String> {
        self.db.clear_all()
    }
}
