//! Persistent integer store for the high score.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const STORE_PATH_ENV: &str = "MARKER_TAP_SCORES_PATH";

pub trait ScoreStore {
    /// Missing keys read as 0.
    fn get_int(&self, key: &str) -> i64;
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError>;
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// In-process store. Keeps every write so callers can check what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
    writes: Vec<(String, i64)>,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: i64) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn writes(&self) -> &[(String, i64)] {
        &self.writes
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl ScoreStore for MemoryStore {
    fn get_int(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.writes.push((key.to_string(), value));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.flushes += 1;
        Ok(())
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for &mut S {
    fn get_int(&self, key: &str) -> i64 {
        (**self).get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        (**self).set_int(key, value)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        (**self).flush()
    }
}

/// A JSON object of integers on disk. Writes land in memory; `flush` persists them.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
    dirty: bool,
}

impl JsonFileStore {
    pub fn from_env() -> Self {
        Self::open(default_path())
    }

    /// A missing or unreadable file opens as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "score store is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "score store is unreadable, starting empty");
                BTreeMap::new()
            }
        };
        Self {
            path,
            values,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl ScoreStore for JsonFileStore {
    fn get_int(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        if self.values.insert(key.to_string(), value) != Some(value) {
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text).map_err(write_err)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "score store flushed");
        Ok(())
    }
}

fn default_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(STORE_PATH_ENV) {
        return PathBuf::from(explicit);
    }

    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| {
                let mut p = PathBuf::from(home);
                p.push(".config");
                p
            })
        })
        .unwrap_or_else(|| PathBuf::from("."));

    let mut path = base;
    path.push("marker-tap");
    path.push("scores.json");
    path
}
