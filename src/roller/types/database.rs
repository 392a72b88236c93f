//! Embedded SurrealDB database for dice configuration storage.
//!
//! This module provides persistent storage for:
//! - app settings (the last-used dice configuration)
//! - named presets
//!
//! The datastore lives in the platform app-data folder unless
//! `SIDEROLL_DATA_DIR` points somewhere else.

use bevy::log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use surrealdb::engine::local::{Db, Mem, SurrealKv};
use surrealdb::Surreal;

use super::config::{titles_from_json, Preset, PresetEntry, SideTitles};

/// SurrealDB folder name (embedded database).
const DATABASE_FOLDER: &str = "sideroll.surrealdb";
/// App data folder name.
const APP_DATA_FOLDER: &str = "SideRoll";
/// Environment variable overriding the data folder.
pub const DATA_DIR_ENV: &str = "SIDEROLL_DATA_DIR";

const NS: &str = "sideroll";
const DB: &str = "sideroll";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PresetDocument {
    /// Stable internal ID (never reused while the preset exists).
    sid: i64,
    name: String,
    sides: u32,
    /// Titles as a JSON object string, decoded leniently on load.
    titles: String,
}

/// Handle to the embedded configuration datastore.
pub struct ConfigDatabase {
    rt: tokio::runtime::Runtime,
    db: Mutex<Surreal<Db>>,
    /// Path to the embedded datastore (empty for in-memory databases).
    pub db_path: PathBuf,
}

impl ConfigDatabase {
    /// Resolve the app data directory, creating it if needed.
    pub fn data_dir() -> Result<PathBuf, String> {
        if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            if !custom.trim().is_empty() {
                let dir = PathBuf::from(custom);
                std::fs::create_dir_all(&dir)
                    .map_err(|e| format!("Failed to create data directory {:?}: {}", dir, e))?;
                return Ok(dir);
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Ok(local_app_data) = std::env::var("LOCALAPPDATA") {
                let app_dir = PathBuf::from(&local_app_data).join(APP_DATA_FOLDER);
                if std::fs::create_dir_all(&app_dir).is_ok() {
                    return Ok(app_dir);
                }
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(home) = std::env::var("HOME") {
                let app_dir = PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DATA_FOLDER);
                std::fs::create_dir_all(&app_dir)
                    .map_err(|e| format!("Failed to create app data directory: {}", e))?;
                return Ok(app_dir);
            }
        }

        #[cfg(target_os = "linux")]
        {
            let base = std::env::var("XDG_DATA_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    std::env::var("HOME")
                        .map(|home| PathBuf::from(home).join(".local").join("share"))
                });
            if let Ok(base) = base {
                let app_dir = base.join(APP_DATA_FOLDER);
                std::fs::create_dir_all(&app_dir)
                    .map_err(|e| format!("Failed to create app data directory: {}", e))?;
                return Ok(app_dir);
            }
        }

        std::env::current_dir().map_err(|e| format!("Unable to determine data directory: {}", e))
    }

    fn make_runtime() -> Result<tokio::runtime::Runtime, String> {
        tokio::runtime::Runtime::new().map_err(|e| format!("Failed to create tokio runtime: {}", e))
    }

    async fn init(db: &Surreal<Db>) -> Result<(), String> {
        db.use_ns(NS)
            .use_db(DB)
            .await
            .map_err(|e| format!("Failed to select namespace/db: {}", e))?;

        let schema = r#"
            DEFINE TABLE setting SCHEMALESS;

            DEFINE TABLE preset SCHEMALESS;
            DEFINE INDEX preset_sid_unique ON preset FIELDS sid UNIQUE;
        "#;

        db.query(schema)
            .await
            .map_err(|e| format!("Failed to initialize schema: {}", e))?;

        Ok(())
    }

    /// Open or create the database in the app data folder.
    pub fn open() -> Result<Self, String> {
        let data_dir = Self::data_dir()?;
        Self::open_in(&data_dir)
    }

    /// Open or create the database inside `data_dir`.
    ///
    /// A plain file squatting on the datastore path is moved aside first.
    pub fn open_in(data_dir: &Path) -> Result<Self, String> {
        let db_path = data_dir.join(DATABASE_FOLDER);

        if db_path.is_file() {
            let ts = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let backup_path = data_dir.join(format!("{}.file.bak-{}", DATABASE_FOLDER, ts));
            warn!(
                "Database path {:?} is a file; backing up to {:?} and recreating as a directory",
                db_path, backup_path
            );
            std::fs::rename(&db_path, &backup_path).map_err(|e| {
                format!(
                    "Failed to back up database file {:?} -> {:?}: {}",
                    db_path, backup_path, e
                )
            })?;
        }

        Self::open_at(db_path)
    }

    /// Open the datastore directory at exactly `path` (for testing).
    pub fn open_at(path: PathBuf) -> Result<Self, String> {
        let rt = Self::make_runtime()?;
        std::fs::create_dir_all(&path)
            .map_err(|e| format!("Failed to create SurrealDB datastore dir {:?}: {}", path, e))?;

        let db = rt
            .block_on(async { Surreal::new::<SurrealKv>(path.to_string_lossy().to_string()).await })
            .map_err(|e| format!("Failed to open SurrealDB: {}", e))?;

        rt.block_on(Self::init(&db))?;

        Ok(Self {
            rt,
            db: Mutex::new(db),
            db_path: path,
        })
    }

    /// Non-persistent database (for testing).
    pub fn open_in_memory() -> Result<Self, String> {
        let rt = Self::make_runtime()?;
        let db = rt
            .block_on(async { Surreal::new::<Mem>(()).await })
            .map_err(|e| format!("Failed to open SurrealDB (mem): {}", e))?;

        rt.block_on(Self::init(&db))?;

        Ok(Self {
            rt,
            db: Mutex::new(db),
            db_path: PathBuf::new(),
        })
    }

    fn with_db<T>(&self, f: impl FnOnce(&Surreal<Db>) -> Result<T, String>) -> Result<T, String> {
        let db = self.db.lock().map_err(|e| e.to_string())?;
        f(&db)
    }

    /// Load a value by key from the `setting` table.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, String> {
        let key = key.to_owned();
        self.with_db(move |db| {
            self.rt.block_on(async {
                #[derive(Deserialize)]
                struct SettingRecord {
                    value: String,
                }

                let record: Option<SettingRecord> = db
                    .select(("setting", key.clone()))
                    .await
                    .map_err(|e| format!("Failed to load setting '{}': {}", key, e))?;

                match record {
                    Some(record) => serde_json::from_str(&record.value).map(Some).map_err(|e| {
                        format!("Failed to decode setting '{}' from JSON string: {}", key, e)
                    }),
                    None => Ok(None),
                }
            })
        })
    }

    /// Upsert a value by key into the `setting` table, stored as a JSON string.
    pub fn set_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<(), String> {
        let key = key.to_owned();
        let json_string = serde_json::to_string(value)
            .map_err(|e| format!("Failed to serialize setting '{}' to JSON string: {}", key, e))?;

        #[derive(Serialize, Deserialize)]
        struct SettingDoc {
            value: String,
        }

        self.with_db(move |db| {
            self.rt.block_on(async {
                let _: Option<SettingDoc> = db
                    .upsert(("setting", key.clone()))
                    .content(SettingDoc { value: json_string })
                    .await
                    .map_err(|e| format!("Failed to save setting '{}': {}", key, e))?;
                Ok(())
            })
        })
    }

    fn next_preset_id(&self) -> Result<i64, String> {
        self.with_db(|db| {
            self.rt.block_on(async {
                #[derive(Deserialize)]
                struct SidRow {
                    sid: i64,
                }

                let mut response = db
                    .query("SELECT sid FROM preset ORDER BY sid DESC LIMIT 1")
                    .await
                    .map_err(|e| format!("Failed to query next preset id: {}", e))?;
                let rows: Vec<SidRow> = response
                    .take(0)
                    .map_err(|e| format!("Failed to decode next preset id: {}", e))?;
                Ok(rows.first().map(|row| row.sid + 1).unwrap_or(1))
            })
        })
    }

    /// Store a new preset and return its ID.
    pub fn create_preset(&self, preset: &Preset) -> Result<i64, String> {
        let sid = self.next_preset_id()?;
        let titles = serde_json::to_string(&preset.titles)
            .map_err(|e| format!("Failed to serialize preset titles: {}", e))?;
        let doc = PresetDocument {
            sid,
            name: preset.name.clone(),
            sides: preset.sides,
            titles,
        };

        self.with_db(|db| {
            self.rt.block_on(async {
                let _: Option<PresetDocument> = db
                    .upsert(("preset", sid))
                    .content(doc)
                    .await
                    .map_err(|e| format!("Failed to save preset: {}", e))?;
                Ok(())
            })
        })?;

        Ok(sid)
    }

    /// Load a preset by ID.
    pub fn load_preset(&self, id: i64) -> Result<Preset, String> {
        let doc: Option<PresetDocument> = self.with_db(|db| {
            self.rt.block_on(async {
                db.select(("preset", id))
                    .await
                    .map_err(|e| format!("Failed to load preset: {}", e))
            })
        })?;

        let Some(doc) = doc else {
            return Err(format!("Preset with id {} not found", id));
        };

        let titles = serde_json::from_str::<JsonValue>(&doc.titles)
            .map(titles_from_json)
            .unwrap_or_else(|e| {
                warn!("Preset {} has unreadable titles ({}); ignoring them", id, e);
                SideTitles::new()
            });

        Ok(Preset {
            name: doc.name,
            sides: doc.sides,
            titles,
        })
    }

    /// Delete a preset by ID. Deleting a missing preset is an error.
    pub fn delete_preset(&self, id: i64) -> Result<(), String> {
        let removed: Option<PresetDocument> = self.with_db(|db| {
            self.rt.block_on(async {
                db.delete(("preset", id))
                    .await
                    .map_err(|e| format!("Failed to delete preset: {}", e))
            })
        })?;

        match removed {
            Some(_) => Ok(()),
            None => Err(format!("Preset with id {} not found", id)),
        }
    }

    /// List all presets in creation order.
    pub fn list_presets(&self) -> Result<Vec<PresetEntry>, String> {
        #[derive(Deserialize)]
        struct PresetRow {
            sid: i64,
            name: String,
            sides: u32,
        }

        let rows: Vec<PresetRow> = self.with_db(|db| {
            self.rt.block_on(async {
                let mut response = db
                    .query("SELECT sid, name, sides FROM preset ORDER BY sid")
                    .await
                    .map_err(|e| format!("Failed to query presets: {}", e))?;
                response
                    .take::<Vec<PresetRow>>(0)
                    .map_err(|e| format!("Failed to decode preset list: {}", e))
            })
        })?;

        Ok(rows
            .into_iter()
            .map(|row| PresetEntry {
                id: row.sid,
                name: row.name,
                sides: row.sides,
            })
            .collect())
    }

    /// Remove every setting and preset.
    pub fn clear_all(&self) -> Result<(), String> {
        self.with_db(|db| {
            self.rt.block_on(async {
                db.query("DELETE setting; DELETE preset;")
                    .await
                    .map_err(|e| format!("Failed to clear database: {}", e))?;
                Ok(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roller::types::config::DiceConfig;

    fn sample_preset(name: &str, sides: u32) -> Preset {
        let mut titles = SideTitles::new();
        titles.insert(1, "First".to_string());
        Preset {
            name: name.to_string(),
            sides,
            titles,
        }
    }

    #[test]
    fn test_setting_round_trip() {
        let db = ConfigDatabase::open_in_memory().unwrap();
        let mut config = DiceConfig::new(12);
        config.set_title(7, "Seven");

        db.set_setting("last_dice_config", &config).unwrap();
        let loaded: DiceConfig = db.get_setting("last_dice_config").unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_setting_is_none() {
        let db = ConfigDatabase::open_in_memory().unwrap();
        let loaded: Option<DiceConfig> = db.get_setting("nope").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_preset_ids_increase() {
        let db = ConfigDatabase::open_in_memory().unwrap();
        let a = db.create_preset(&sample_preset("A", 4)).unwrap();
        let b = db.create_preset(&sample_preset("B", 8)).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);

        let list = db.list_presets().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "A");
        assert_eq!(list[1].sides, 8);
    }

    #[test]
    fn test_load_and_delete_preset() {
        let db = ConfigDatabase::open_in_memory().unwrap();
        let id = db.create_preset(&sample_preset("Weekly", 7)).unwrap();

        let loaded = db.load_preset(id).unwrap();
        assert_eq!(loaded, sample_preset("Weekly", 7));

        db.delete_preset(id).unwrap();
        assert!(db.load_preset(id).is_err());
        assert!(db.delete_preset(id).is_err());
        assert!(db.list_presets().unwrap().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let db = ConfigDatabase::open_in_memory().unwrap();
        db.set_setting("last_dice_config", &DiceConfig::new(3)).unwrap();
        db.create_preset(&sample_preset("A", 4)).unwrap();

        db.clear_all().unwrap();

        let loaded: Option<DiceConfig> = db.get_setting("last_dice_config").unwrap();
        assert!(loaded.is_none());
        assert!(db.list_presets().unwrap().is_empty());
    }

    #[test]
    fn test_settings_persist_to_disk_round_trip() {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("sideroll-db-test-{}", ts));

        {
            let db = ConfigDatabase::open_in(&dir).unwrap();
            db.set_setting("last_dice_config", &DiceConfig::new(20)).unwrap();
            db.create_preset(&sample_preset("Kept", 10)).unwrap();
        }

        {
            let db = ConfigDatabase::open_in(&dir).unwrap();
            let loaded: DiceConfig = db.get_setting("last_dice_config").unwrap().unwrap();
            assert_eq!(loaded.sides, 20);
            assert_eq!(db.list_presets().unwrap()[0].name, "Kept");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
