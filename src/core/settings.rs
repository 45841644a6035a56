//! Persisted player preferences.
//!
//! A small key/value store for values that outlive a session (music volume).
//! Systems reach it through the [`Settings`] resource so tests can swap in the
//! in-memory backend.
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MUSIC_VOLUME_KEY: &str = "musicVolume";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait SettingsStore: Send + Sync + 'static {
    fn get_f32(&self, key: &str) -> Option<f32>;
    fn set_f32(&mut self, key: &str, value: f32);
    /// Persist pending writes.
    fn flush(&mut self) -> Result<(), SettingsError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub values: BTreeMap<String, f32>,
}

impl SettingsStore for MemoryStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }
    fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }
    fn flush(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// JSON object on disk, e.g. `{ "musicVolume": 0.5 }`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, f32>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open `path`; a missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| SettingsError::Json { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self { path, values, dirty: false })
    }

    /// Like [`JsonFileStore::open`] but falls back to an empty store, returning
    /// the error for logging.
    pub fn open_or_empty(path: impl AsRef<Path>) -> (Self, Option<SettingsError>) {
        match Self::open(&path) {
            Ok(store) => (store, None),
            Err(e) => (
                Self { path: path.as_ref().to_path_buf(), values: BTreeMap::new(), dirty: false },
                Some(e),
            ),
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }
    fn set_f32(&mut self, key: &str, value: f32) {
        if self.values.insert(key.to_string(), value) != Some(value) {
            self.dirty = true;
        }
    }
    fn flush(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io { path: parent.to_path_buf(), source })?;
        }
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(|source| SettingsError::Json { path: self.path.clone(), source })?;
        fs::write(&self.path, raw).map_err(|source| SettingsError::Io { path: self.path.clone(), source })?;
        self.dirty = false;
        Ok(())
    }
}

/// Injected persistence backend.
#[derive(Resource, Deref, DerefMut)]
pub struct Settings(pub Box<dyn SettingsStore>);

impl Settings {
    pub fn new(store: impl SettingsStore) -> Self {
        Self(Box::new(store))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_f32(MUSIC_VOLUME_KEY), None);
        store.set_f32(MUSIC_VOLUME_KEY, 0.25);
        store.flush().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_f32(MUSIC_VOLUME_KEY), Some(0.25));
    }

    #[test]
    fn corrupt_file_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        let (store, err) = JsonFileStore::open_or_empty(&path);
        assert!(matches!(err, Some(SettingsError::Json { .. })));
        assert_eq!(store.get_f32(MUSIC_VOLUME_KEY), None);
    }

    #[test]
    fn flush_without_changes_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.flush().unwrap();
        assert!(!path.exists());
    }
}
