//! Locally persisted list of saved patterns.
//!
//! Saved entries live as a JSON array of `{pattern, testString}` objects in
//! a single named slot. [`SavedStore`] keeps an in-memory copy read once at
//! load and rewrites the whole slot on every save or delete.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::{DEFAULT_SLOT, StorageConfig};
use crate::error::{LabError, Result};
use crate::types::SavedEntry;

/// File name of the exported list.
pub const EXPORT_FILE_NAME: &str = "saved_regexes.json";

/// A key-value store of named text slots.
pub trait Storage: Send + Sync {
    /// Read a slot, returning `None` if it has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot.
    fn write(&self, slot: &str, contents: &str) -> Result<()>;
}

/// Slots stored as `<dir>/<slot>.json` files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store slots in a directory, created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a slot.
    #[must_use]
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LabError::io_context(
                format!("reading {}", path.display()),
                e,
            )),
        }
    }

    fn write(&self, slot: &str, contents: &str) -> Result<()> {
        write_atomic(&self.slot_path(slot), contents.as_bytes())
    }
}

/// Write a file through a temporary sibling and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        LabError::with_io_context(
            fs::create_dir_all(parent),
            format!("creating {}", parent.display()),
        )?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = LabError::with_io_context(
        File::create(&temp_path),
        format!("creating {}", temp_path.display()),
    )?;
    LabError::with_io_context(
        file.write_all(bytes),
        format!("writing {}", temp_path.display()),
    )?;
    LabError::with_io_context(file.sync_all(), format!("syncing {}", temp_path.display()))?;

    LabError::with_io_context(
        fs::rename(&temp_path, path),
        format!("replacing {}", path.display()),
    )?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Slots held in memory. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with one pre-filled slot.
    #[must_use]
    pub fn with_slot(slot: impl Into<String>, contents: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(slot.into(), contents.into());
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        Ok(self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(slot)
            .cloned())
    }

    fn write(&self, slot: &str, contents: &str) -> Result<()> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(slot.to_string(), contents.to_string());
        Ok(())
    }
}

/// The saved-entry list backed by one storage slot.
pub struct SavedStore {
    storage: Box<dyn Storage>,
    slot: String,
    entries: Vec<SavedEntry>,
}

impl std::fmt::Debug for SavedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedStore")
            .field("slot", &self.slot)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl SavedStore {
    /// Load the list from a slot. An absent slot is an empty list.
    pub fn load(storage: impl Storage + 'static, slot: impl Into<String>) -> Result<Self> {
        let slot = slot.into();
        let entries: Vec<SavedEntry> = match storage.read(&slot)? {
            Some(contents) if !contents.trim().is_empty() => serde_json::from_str(&contents)
                .map_err(|e| LabError::storage(&slot, format!("unreadable entries: {e}")))?,
            _ => Vec::new(),
        };
        debug!(slot = %slot, count = entries.len(), "loaded saved entries");
        Ok(Self {
            storage: Box::new(storage),
            slot,
            entries,
        })
    }

    /// Load from the storage described by configuration.
    ///
    /// Without a configured directory the list is kept in memory only.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match &config.dir {
            Some(dir) => Self::load(FileStorage::new(dir), config.slot.clone()),
            None => Self::load(MemoryStorage::new(), config.slot.clone()),
        }
    }

    /// An empty in-memory list under the default slot.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            slot: DEFAULT_SLOT.to_string(),
            entries: Vec::new(),
        }
    }

    /// The slot name.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Saved entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[SavedEntry] {
        &self.entries
    }

    /// Number of saved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry. Duplicates are kept.
    pub fn save(&mut self, entry: SavedEntry) -> Result<()> {
        let mut updated = self.entries.clone();
        updated.push(entry);
        self.persist(&updated)?;
        self.entries = updated;
        info!(slot = %self.slot, count = self.entries.len(), "saved entry");
        Ok(())
    }

    /// Remove and return the entry at `index`.
    pub fn delete(&mut self, index: usize) -> Result<SavedEntry> {
        if index >= self.entries.len() {
            return Err(LabError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let mut updated = self.entries.clone();
        let removed = updated.remove(index);
        self.persist(&updated)?;
        self.entries = updated;
        info!(slot = %self.slot, index, "deleted entry");
        Ok(removed)
    }

    /// Render the list as a pretty-printed JSON array.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Write the export file into a directory, returning its path.
    pub fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(EXPORT_FILE_NAME);
        write_atomic(&path, self.export_json()?.as_bytes())?;
        info!(path = %path.display(), count = self.entries.len(), "exported saved entries");
        Ok(path)
    }

    fn persist(&self, entries: &[SavedEntry]) -> Result<()> {
        let contents = serde_json::to_string(entries)?;
        self.storage.write(&self.slot, &contents)
    }
}
