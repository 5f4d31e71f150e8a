// Saved download links
// Stored as a two-column CSV (name,link) at ~/.config/countboard/sources.csv

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub link: String,
}

/// Named links to count exports, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("sources.csv")
    }

    /// Read the registry; a missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let mut registry = Self::default();
        for record in reader.deserialize::<SourceEntry>() {
            let entry = record.map_err(|e| ConfigError::Sources {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            if entry.name.is_empty() {
                log::warn!("skipping unnamed source in {}", path.display());
                continue;
            }
            registry.add(entry.name, entry.link);
        }
        log::debug!("{} saved sources in {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let to_sources = |message: String| ConfigError::Sources {
            path: path.to_path_buf(),
            message,
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.entries.is_empty() {
            writer
                .write_record(["name", "link"])
                .map_err(|e| to_sources(e.to_string()))?;
        }
        for entry in &self.entries {
            writer.serialize(entry).map_err(|e| to_sources(e.to_string()))?;
        }
        let bytes = writer.into_inner().map_err(|e| to_sources(e.to_string()))?;

        fs::write(path, bytes).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Insert or replace the link saved under `name`. Returns the previous link.
    pub fn add(&mut self, name: impl Into<String>, link: impl Into<String>) -> Option<String> {
        let name = name.into();
        let link = link.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.link, link)),
            None => {
                self.entries.push(SourceEntry { name, link });
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<SourceEntry> {
        let idx = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.link.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
