//! Persisted preferences.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

/// A tiny string key-value store
pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str) -> TileResult<Option<String>>;

    /// `None` removes the key
    fn set_string(&self, key: &str, value: Option<&str>) -> TileResult<()>;

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_string(key) {
            Ok(Some(value)) => value.parse().unwrap_or(default),
            Ok(None) => default,
            Err(e) => {
                warn!("Could not read `{key}`, using {default}: {e}");
                default
            }
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> TileResult<()> {
        self.set_string(key, Some(&value.to_string()))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Preferences {
    values: BTreeMap<String, String>,
}

/// Preferences kept in a JSON file, rewritten on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<Preferences>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> TileResult<Self> {
        let path = path.into();
        let preferences = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Preferences::default(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, starting empty", path.display());
                Preferences::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            cache: Mutex::new(preferences),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, preferences: &Preferences) -> TileResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get_string(&self, key: &str) -> TileResult<Option<String>> {
        let preferences = self
            .cache
            .lock()
            .map_err(|e| TileError::Internal(e.to_string()))?;
        Ok(preferences.values.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: Option<&str>) -> TileResult<()> {
        let mut preferences = self
            .cache
            .lock()
            .map_err(|e| TileError::Internal(e.to_string()))?;
        let changed = match value {
            Some(value) => preferences.values.insert(key.to_string(), value.to_string())
                != Some(value.to_string()),
            None => preferences.values.remove(key).is_some(),
        };
        if changed {
            self.write(&preferences)?;
        }
        Ok(())
    }
}

/// Volatile store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl SettingsStore for MemoryStore {
    fn get_string(&self, key: &str) -> TileResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| TileError::Internal(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: Option<&str>) -> TileResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| TileError::Internal(e.to_string()))?;
        match value {
            Some(value) => values.insert(key.to_string(), value.to_string()),
            None => values.remove(key),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LAST_CONNECTED_WIFI_KEY, REQUIRE_UNLOCK_KEY};
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let path = dir.path().join("nested").join("settings.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_string(LAST_CONNECTED_WIFI_KEY).unwrap(), None);
        store.set_string(LAST_CONNECTED_WIFI_KEY, Some("HomeNet")).unwrap();
        store.set_bool(REQUIRE_UNLOCK_KEY, false).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_string(LAST_CONNECTED_WIFI_KEY).unwrap().as_deref(),
            Some("HomeNet")
        );
        assert!(!reopened.get_bool(REQUIRE_UNLOCK_KEY, true));
    }

    #[test]
    fn clearing_a_key_removes_it() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let path = dir.path().join("settings.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.set_string(LAST_CONNECTED_WIFI_KEY, Some("HomeNet")).unwrap();
        store.set_string(LAST_CONNECTED_WIFI_KEY, None).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_string(LAST_CONNECTED_WIFI_KEY).unwrap(), None);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(TileError::StoreFormat(_))
        ));
    }

    #[test]
    fn bools_fall_back_to_default() {
        let store = MemoryStore::default();
        assert!(store.get_bool(REQUIRE_UNLOCK_KEY, true));
        store.set_string(REQUIRE_UNLOCK_KEY, Some("maybe")).unwrap();
        assert!(!store.get_bool(REQUIRE_UNLOCK_KEY, false));
    }
}
