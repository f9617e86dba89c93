use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::model::{Preset, TimerConfig};
use crate::config::validate::{safe_json_parse, validate_presets};

pub const DEFAULT_PRESET_NAME: &str = "Preset";

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("unable to access preset file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "invalid JSON at line {line}, column {column}: {0}",
        line = .0.line(),
        column = .0.column()
    )]
    Json(#[from] serde_json::Error),
    #[error("invalid presets file: expected a JSON array of presets")]
    NotAnArray,
    #[error("no preset at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no preset named '{0}'")]
    NotFound(String),
}

pub trait PresetStore {
    fn load(&self) -> Result<Vec<Preset>, PresetError>;
    fn save(&mut self, presets: &[Preset]) -> Result<(), PresetError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PresetStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Preset>, PresetError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PresetError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match safe_json_parse(&content) {
            Some(value) => Ok(validate_presets(&value)),
            None => {
                warn!(path = %self.path.display(), "preset file is not valid JSON, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, presets: &[Preset]) -> Result<(), PresetError> {
        let text = serde_json::to_string_pretty(presets)?;
        fs::write(&self.path, format!("{text}\n")).map_err(|source| PresetError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    presets: Vec<Preset>,
}

#[cfg(test)]
impl PresetStore for MemoryStore {
    fn load(&self) -> Result<Vec<Preset>, PresetError> {
        Ok(self.presets.clone())
    }

    fn save(&mut self, presets: &[Preset]) -> Result<(), PresetError> {
        self.presets = presets.to_vec();
        Ok(())
    }
}

#[derive(Debug)]
pub struct PresetList<S: PresetStore> {
    store: S,
    presets: Vec<Preset>,
}

impl<S: PresetStore> PresetList<S> {
    pub fn load(store: S) -> Result<Self, PresetError> {
        let presets = store.load()?;
        Ok(Self { store, presets })
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, index: usize) -> Result<&Preset, PresetError> {
        self.presets.get(index).ok_or(PresetError::IndexOutOfRange {
            index,
            len: self.presets.len(),
        })
    }

    pub fn find(&self, name: &str) -> Result<(usize, &Preset), PresetError> {
        self.presets
            .iter()
            .enumerate()
            .find(|(_, preset)| preset.name == name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))
    }

    pub fn save_current(&mut self, name: &str, config: TimerConfig) -> Result<(), PresetError> {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            DEFAULT_PRESET_NAME
        } else {
            trimmed
        };
        self.presets.push(Preset {
            name: name.to_string(),
            config,
            linked_to_next: false,
        });
        self.persist()
    }

    pub fn duplicate(&mut self, index: usize) -> Result<(), PresetError> {
        let source = self.get(index)?;
        let copy = Preset {
            name: format!("{} (copy)", source.name),
            ..source.clone()
        };
        self.presets.insert(index + 1, copy);
        self.persist()
    }

    pub fn delete(&mut self, index: usize) -> Result<Preset, PresetError> {
        self.get(index)?;
        let removed = self.presets.remove(index);
        self.persist()?;
        Ok(removed)
    }

    pub fn set_linked_to_next(&mut self, index: usize, linked: bool) -> Result<(), PresetError> {
        let len = self.presets.len();
        let preset = self
            .presets
            .get_mut(index)
            .ok_or(PresetError::IndexOutOfRange { index, len })?;
        preset.linked_to_next = linked;
        self.persist()
    }

    pub fn export_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    pub fn import_json(&mut self, text: &str) -> Result<usize, PresetError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_array() {
            return Err(PresetError::NotAnArray);
        }
        self.presets = validate_presets(&value);
        self.persist()?;
        info!(count = self.presets.len(), "imported presets");
        Ok(self.presets.len())
    }

    fn persist(&mut self) -> Result<(), PresetError> {
        self.store.save(&self.presets)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::config::model::TimerMode;

    fn config(duration_sec: u32) -> TimerConfig {
        TimerConfig {
            duration_sec,
            ..TimerConfig::default()
        }
    }

    fn list_with(names: &[&str]) -> PresetList<MemoryStore> {
        let mut list = PresetList::load(MemoryStore::default()).expect("memory store");
        for (i, name) in names.iter().enumerate() {
            list.save_current(name, config(60 * (i as u32 + 1))).expect("save");
        }
        list
    }

    fn names<S: PresetStore>(list: &PresetList<S>) -> Vec<&str> {
        list.presets().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn save_trims_and_defaults_names() {
        let list = list_with(&["  Keynote ", "   "]);
        assert_eq!(names(&list), vec!["Keynote", "Preset"]);
        assert_eq!(list.store.load().expect("load").len(), 2);
    }

    #[test]
    fn duplicate_inserts_after_source() {
        let mut list = list_with(&["A", "B", "C"]);
        list.duplicate(0).expect("duplicate");
        assert_eq!(names(&list), vec!["A", "A (copy)", "B", "C"]);
        assert_eq!(list.presets()[1].config, list.presets()[0].config);
    }

    #[test]
    fn delete_removes_by_index() {
        let mut list = list_with(&["A", "B", "C"]);
        let removed = list.delete(1).expect("delete");
        assert_eq!(removed.name, "B");
        assert_eq!(names(&list), vec!["A", "C"]);
        assert!(matches!(
            list.delete(5),
            Err(PresetError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn find_by_name() {
        let list = list_with(&["A", "B"]);
        let (index, preset) = list.find("B").expect("found");
        assert_eq!(index, 1);
        assert_eq!(preset.config.duration_sec, 120);
        assert!(matches!(list.find("Z"), Err(PresetError::NotFound(_))));
    }

    #[test]
    fn import_requires_top_level_array() {
        let mut list = list_with(&["A"]);
        let err = list
            .import_json(r#"{"name": "A", "config": {}}"#)
            .expect_err("object import should fail");
        assert!(matches!(err, PresetError::NotAnArray));
        assert_eq!(names(&list), vec!["A"]);

        let err = list.import_json("[ broken").expect_err("bad json");
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn import_replaces_list_with_valid_records() {
        let mut list = list_with(&["Old"]);
        let kept = list
            .import_json(
                r#"[
                    {"name": "Talk", "config": {"mode": "countup", "durationSec": 900}},
                    {"name": "Broken", "config": null},
                    {"name": "Break", "config": {}, "linkedToNext": true}
                ]"#,
            )
            .expect("import");
        assert_eq!(kept, 2);
        assert_eq!(names(&list), vec!["Talk", "Break"]);
        assert_eq!(list.presets()[0].config.mode, TimerMode::Countup);
        assert!(list.presets()[1].linked_to_next);
    }

    #[test]
    fn export_round_trips_through_import() {
        let mut list = list_with(&["A", "B"]);
        list.set_linked_to_next(0, true).expect("link");
        let exported = list.export_json().expect("export");

        let mut other = list_with(&[]);
        other.import_json(&exported).expect("import");
        assert_eq!(other.presets(), list.presets());
    }

    #[test]
    fn file_store_survives_missing_and_corrupt_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("presets.json");

        let store = JsonFileStore::new(&path);
        assert!(store.load().expect("missing file").is_empty());

        fs::write(&path, "{ not json").expect("write");
        assert!(store.load().expect("corrupt file").is_empty());
    }

    #[test]
    fn file_store_persists_mutations() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("presets.json");

        let mut list = PresetList::load(JsonFileStore::new(&path)).expect("load");
        list.save_current("Opening", config(300)).expect("save");
        list.duplicate(0).expect("duplicate");

        let reloaded = PresetList::load(JsonFileStore::new(&path)).expect("reload");
        assert_eq!(names(&reloaded), vec!["Opening", "Opening (copy)"]);
        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"durationSec\": 300"));
        assert!(text.ends_with("]\n"));
    }
}
