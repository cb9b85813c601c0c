use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::style::StyleOptions;

pub const STYLE_KEY: &str = "styleOptions";
pub const EXPORT_QUALITY_KEY: &str = "exportQuality";

pub const DEFAULT_EXPORT_QUALITY: f32 = 1.0;

/// Synchronous string key-value store that outlives the process.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// One JSON object on disk; every `set` rewrites the file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_values(&path) {
            Ok(values) => values,
            Err(err) => {
                if path.exists() {
                    warn!("ignoring unreadable preferences at {}: {err:#}", path.display());
                }
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn open_default() -> Option<Self> {
        let dirs = ProjectDirs::from("com", "dimmark", "dimmark")?;
        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir).ok()?;
        Some(Self::open(config_dir.join("preferences.json")))
    }

    fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        let raw = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("cannot write preferences to {}", self.path.display()))
    }
}

fn load_json<T: DeserializeOwned + Default>(store: &dyn PreferenceStore, key: &str) -> T {
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("preference `{key}` is corrupt, using defaults: {err}");
            T::default()
        }
    }
}

fn save_json<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

pub fn load_style(store: &dyn PreferenceStore) -> StyleOptions {
    load_json(store, STYLE_KEY)
}

pub fn save_style(store: &mut dyn PreferenceStore, style: &StyleOptions) -> Result<()> {
    save_json(store, STYLE_KEY, style)
}

pub fn load_export_quality(store: &dyn PreferenceStore) -> f32 {
    let Some(raw) = store.get(EXPORT_QUALITY_KEY) else {
        return DEFAULT_EXPORT_QUALITY;
    };
    match serde_json::from_str::<f32>(&raw) {
        Ok(quality) if (0.0..=1.0).contains(&quality) => quality,
        _ => {
            warn!("preference `{EXPORT_QUALITY_KEY}` is invalid, using default");
            DEFAULT_EXPORT_QUALITY
        }
    }
}

pub fn save_export_quality(store: &mut dyn PreferenceStore, quality: f32) -> Result<()> {
    save_json(store, EXPORT_QUALITY_KEY, &quality.clamp(0.0, 1.0))
}
