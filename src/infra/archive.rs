// ============================================================
// Layer 6 — File Archive
// ============================================================
// A small key-value archive: one JSON object per file, one
// named field per entry (`x`, `y`, optionally `m`).
//
// Usage follows a scoped acquisition pattern:
//
//   let mut archive = FileArchive::open(path);
//   archive.load()?;                 // read the whole file
//   let x = archive.take("x")?;      // pull typed fields out
//   // archive dropped → in-memory cache cleared
//
//   let mut archive = FileArchive::open(path);
//   archive.insert("x", &inputs)?;   // stage fields
//   archive.dump()?;                 // write the whole file
//
// The cache is cleared on Drop, so every exit path (including
// an early `?` return) releases what was loaded.
//
// Missing files surface as NotFound; unparsable content and
// wrongly typed fields surface as DataCorruption. Callers
// decide whether a missing file is a configuration problem.
//
// Reference: serde_json documentation (Value, from_value)
//            Rust Book §15 (Running Code on Cleanup with Drop)

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::{BatchError, Result};

pub struct FileArchive {
    path:  PathBuf,
    cache: Map<String, Value>,
}

impl FileArchive {
    /// Bind an archive to a path. Nothing is read until `load`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path:  path.into(),
            cache: Map::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every field of the archive file into memory.
    pub fn load(&mut self) -> Result<()> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BatchError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            BatchError::DataCorruption(format!("'{}' is not valid JSON: {e}", self.path.display()))
        })?;

        match value {
            Value::Object(map) => {
                tracing::debug!("Loaded archive '{}' ({} fields)", self.path.display(), map.len());
                self.cache = map;
                Ok(())
            }
            _ => Err(BatchError::DataCorruption(format!(
                "'{}' does not hold a key-value archive",
                self.path.display()
            ))),
        }
    }

    /// Remove a field from the cache and decode it.
    /// Returns Ok(None) if the archive has no such field.
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.cache.remove(key) else {
            return Ok(None);
        };

        serde_json::from_value(value).map(Some).map_err(|e| {
            BatchError::DataCorruption(format!(
                "field '{key}' in '{}' is malformed: {e}",
                self.path.display()
            ))
        })
    }

    /// Stage a field to be written by the next `dump`.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| {
            BatchError::DataCorruption(format!("cannot encode field '{key}': {e}"))
        })?;
        self.cache.insert(key.to_string(), value);
        Ok(())
    }

    /// Write all staged fields, replacing any previous file content.
    pub fn dump(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&self.cache).map_err(|e| {
            BatchError::DataCorruption(format!("cannot encode '{}': {e}", self.path.display()))
        })?;
        fs::write(&self.path, json)?;

        tracing::debug!("Dumped archive '{}' ({} fields)", self.path.display(), self.cache.len());
        Ok(())
    }

    /// Drop everything held in memory.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Delete an archive file. NotFound if it does not exist.
    pub fn remove(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BatchError::NotFound(path.to_path_buf())),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for FileArchive {
    fn drop(&mut self) {
        self.clear();
    }
}
