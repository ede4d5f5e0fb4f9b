//! The runtime preset catalog.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{CatalogError, EventPreset, PresetError};

/// All known presets, keyed by id.
///
/// Definitions are validated on the way in (load, upsert); invalid ones
/// are rejected and logged, never stored. Enabling and disabling is
/// runtime state on top of stored definitions and survives neither a
/// [`replace_all`](PresetCatalog::replace_all) nor a process restart.
#[derive(Default)]
pub struct PresetCatalog {
    presets: RwLock<HashMap<String, EventPreset>>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from definitions, dropping invalid ones with a
    /// log line.
    pub fn from_presets(presets: impl IntoIterator<Item = EventPreset>) -> Self {
        let catalog = Self::new();
        catalog.replace_all(presets);
        catalog
    }

    /// Loads a JSON array of preset definitions from disk.
    ///
    /// Invalid entries are logged and excluded; the file itself failing
    /// to read or parse is an error.
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let body = tokio::fs::read(path.as_ref()).await?;
        let presets: Vec<EventPreset> = serde_json::from_slice(&body)?;
        info!(
            file = %path.as_ref().display(),
            count = presets.len(),
            "preset catalog loaded"
        );
        Ok(Self::from_presets(presets))
    }

    /// Swaps in a whole new set of definitions (scheduler restart).
    pub fn replace_all(&self, presets: impl IntoIterator<Item = EventPreset>) {
        let mut validated = HashMap::new();
        for preset in presets {
            match preset.validated() {
                Ok(preset) => {
                    validated.insert(preset.id.clone(), preset);
                }
                Err(err) => {
                    warn!(%err, "rejecting preset definition");
                }
            }
        }
        *self.presets.write() = validated;
    }

    /// Adds or replaces one definition, re-validating it.
    pub fn upsert(&self, preset: EventPreset) -> Result<(), PresetError> {
        let preset = preset.validated()?;
        self.presets.write().insert(preset.id.clone(), preset);
        Ok(())
    }

    /// Removes a definition. Returns `true` if it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.presets.write().remove(id).is_some()
    }

    /// Flips a preset's enabled flag. Returns `false` for unknown ids.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut presets = self.presets.write();
        match presets.get_mut(id) {
            Some(preset) => {
                preset.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<EventPreset> {
        self.presets.read().get(id).cloned()
    }

    pub fn all(&self) -> Vec<EventPreset> {
        self.presets.read().values().cloned().collect()
    }

    /// The presets currently eligible for selection.
    pub fn enabled(&self) -> Vec<EventPreset> {
        self.presets
            .read()
            .values()
            .filter(|p| p.enabled)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.presets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventide_types::EventKind;

    fn preset(id: &str, weight: u32) -> EventPreset {
        EventPreset {
            weight,
            ..EventPreset::new(id, id, EventKind::Hunt, 300)
        }
    }

    #[test]
    fn test_from_presets_drops_invalid_definitions() {
        let catalog = PresetCatalog::from_presets([
            preset("good", 2),
            EventPreset::new("bad", "Bad", EventKind::Race, 0),
        ]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("good").is_some());
        assert!(catalog.get("bad").is_none());
    }

    #[test]
    fn test_upsert_revalidates() {
        let catalog = PresetCatalog::new();
        catalog.upsert(preset("a", 0)).unwrap();
        // Weight was clamped on the way in.
        assert_eq!(catalog.get("a").unwrap().weight, 1);

        let bad = EventPreset::new("a", "A", EventKind::Race, 0);
        assert!(catalog.upsert(bad).is_err());
        // The previous valid definition is untouched.
        assert!(catalog.get("a").is_some());
    }

    #[test]
    fn test_set_enabled_is_independent_of_definition() {
        let catalog = PresetCatalog::from_presets([preset("a", 1)]);
        assert_eq!(catalog.enabled().len(), 1);

        assert!(catalog.set_enabled("a", false));
        assert_eq!(catalog.enabled().len(), 0);
        assert_eq!(catalog.len(), 1, "disabled presets stay stored");

        assert!(catalog.set_enabled("a", true));
        assert_eq!(catalog.enabled().len(), 1);
        assert!(!catalog.set_enabled("ghost", true));
    }

    #[test]
    fn test_remove() {
        let catalog = PresetCatalog::from_presets([preset("a", 1)]);
        assert!(catalog.remove("a"));
        assert!(!catalog.remove("a"));
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "dawn_race", "name": "Dawn Race", "kind": "race", "duration_secs": 300, "weight": 3},
                {"id": "broken", "name": "Broken", "kind": "race", "duration_secs": 0}
            ]"#,
        )
        .unwrap();

        let catalog = PresetCatalog::load_from_file(&path).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("dawn_race").unwrap().weight, 3);
    }

    #[tokio::test]
    async fn test_load_from_missing_file_is_an_error() {
        let result = PresetCatalog::load_from_file("/nonexistent/presets.json").await;
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
