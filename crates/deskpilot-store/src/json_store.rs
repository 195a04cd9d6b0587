//! User-global layout store: one JSON object keyed by layout id.
//!
//! The file is created (as `{}`) on first access, together with its parent
//! directory.  Key order is preserved across reads and writes.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::atomic::{Existing, write_file};
use crate::error::{StoreError, StoreResult};

/// Handle to the user-global layouts file.
#[derive(Debug, Clone)]
pub struct LayoutFile {
    path: PathBuf,
}

impl LayoutFile {
    /// Create a handle; nothing is touched on disk until first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file (and its directory) with an empty object if missing.
    pub async fn ensure(&self) -> StoreResult<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, "{}").await?;
        info!(path = %self.path.display(), "created empty layout store");
        Ok(())
    }

    /// Every stored layout, in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn get_all(&self) -> StoreResult<Map<String, Value>> {
        self.ensure().await?;
        let raw = tokio::fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => {
                debug!(count = map.len(), "layout store read");
                Ok(map)
            }
            other => Err(StoreError::Malformed {
                path: self.path.clone(),
                reason: format!("expected an object at the top level, found {}", kind(&other)),
            }),
        }
    }

    /// The layout stored under exactly `key`.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.get_all().await?.get(key).cloned())
    }

    /// Insert or replace the layout stored under `key`.
    #[instrument(skip(self, value))]
    pub async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidArgument("layout id must not be empty".into()));
        }
        let mut all = self.get_all().await?;
        all.insert(key.to_string(), value);
        self.write_all(&all).await?;
        debug!(key = %key, "layout stored");
        Ok(())
    }

    /// Insert each entry whose key is not already present.
    ///
    /// Returns the keys that were inserted.
    #[instrument(skip(self, entries))]
    pub async fn seed(&self, entries: Map<String, Value>) -> StoreResult<Vec<String>> {
        let mut all = self.get_all().await?;
        let mut inserted = Vec::new();
        for (key, value) in entries {
            if !all.contains_key(&key) {
                all.insert(key.clone(), value);
                inserted.push(key);
            }
        }
        if !inserted.is_empty() {
            self.write_all(&all).await?;
        }
        info!(inserted = inserted.len(), "layout store seeded");
        Ok(inserted)
    }

    /// Remove the layout stored under exactly `key`.
    ///
    /// Returns `false` when there was nothing to remove.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut all = self.get_all().await?;
        if all.shift_remove(key).is_none() {
            return Ok(false);
        }
        self.write_all(&all).await?;
        debug!(key = %key, "layout removed");
        Ok(true)
    }

    async fn write_all(&self, all: &Map<String, Value>) -> StoreResult<()> {
        let body = serde_json::to_string_pretty(all)?;
        write_file(&self.path, body, Existing::Replace).await?;
        Ok(())
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
