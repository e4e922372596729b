//! Interface list persisted in a settings file
//!
//! The file is a small JSON key-value document. Only the `interfaces` key is
//! ours; unknown keys are preserved on save.

use super::InterfaceSource;
use crate::error::ReconcileError;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const INTERFACES_KEY: &str = "interfaces";

#[derive(Debug, Clone)]
pub struct InterfaceStore {
    path: PathBuf,
}

impl InterfaceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored list
    pub fn try_load(&self) -> Result<Vec<String>, ReconcileError> {
        let unavailable = |detail: String| {
            ReconcileError::DiscoveryUnavailable(format!("{}: {}", self.path.display(), detail))
        };

        let content = fs::read_to_string(&self.path).map_err(|e| unavailable(e.to_string()))?;
        let settings: Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| unavailable(e.to_string()))?;

        let list = settings
            .get(INTERFACES_KEY)
            .ok_or_else(|| unavailable(format!("missing \"{}\" key", INTERFACES_KEY)))?;
        let names: Vec<String> =
            serde_json::from_value(list.clone()).map_err(|e| unavailable(e.to_string()))?;

        debug!("Loaded {} interface(s) from {}", names.len(), self.path.display());
        Ok(names)
    }

    /// Read the stored list, empty when absent or corrupt
    pub fn load(&self) -> Vec<String> {
        self.try_load().unwrap_or_else(|e| {
            warn!("{}", e);
            Vec::new()
        })
    }

    /// Replace the stored list, keeping other settings in the file
    pub fn save(&self, names: &[String]) -> io::Result<()> {
        let mut settings = fs::read_to_string(&self.path)
            .ok()
            .and_then(|c| serde_json::from_str::<Map<String, Value>>(&c).ok())
            .unwrap_or_default();
        settings.insert(INTERFACES_KEY.to_string(), Value::from(names.to_vec()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&settings)?;
        fs::write(&self.path, content)?;
        debug!("Saved {} interface(s) to {}", names.len(), self.path.display());
        Ok(())
    }
}

pub struct PersistedSource {
    store: InterfaceStore,
}

impl PersistedSource {
    pub fn new(store: InterfaceStore) -> Self {
        Self { store }
    }
}

impl InterfaceSource for PersistedSource {
    fn try_list(&self) -> Result<Vec<String>, ReconcileError> {
        self.store.try_load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> InterfaceStore {
        InterfaceStore::new(temp_dir.path().join("wg-tray").join("settings.json"))
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store
            .save(&["office".to_string(), "home".to_string()])
            .unwrap();

        assert_eq!(store.load(), vec!["office", "home"]);
        assert_eq!(
            PersistedSource::new(store).list(),
            vec!["home", "office"]
        );
    }

    #[test]
    fn test_absent_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        assert!(store.load().is_empty());
        assert!(matches!(
            store.try_load(),
            Err(ReconcileError::DiscoveryUnavailable(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(InterfaceStore::new(path.clone()).load().is_empty());

        fs::write(&path, r#"{"interfaces": "wg0"}"#).unwrap();
        assert!(InterfaceStore::new(path).load().is_empty());
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{"theme": "dark", "interfaces": ["old"]}"#).unwrap();

        let store = InterfaceStore::new(path.clone());
        store.save(&["new".to_string()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"theme\": \"dark\""));
        assert_eq!(store.load(), vec!["new"]);
    }
}
