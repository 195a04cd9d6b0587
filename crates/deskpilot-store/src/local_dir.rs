//! Local project layout directory: one `<id>.json` file per layout.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::atomic::{Existing, write_file};
use crate::error::{StoreError, StoreResult};

/// Handle to a directory of layout files.
#[derive(Debug, Clone)]
pub struct LayoutDir {
    dir: PathBuf,
}

impl LayoutDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// `*.json` files in the directory, sorted by file name.  A missing
    /// directory is treated as empty.
    pub async fn json_files(&self) -> StoreResult<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") && entry.file_type().await?.is_file()
            {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Parse one layout file.
    pub async fn read(&self, path: &Path) -> StoreResult<Value> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `<id>.json`, if present and parseable.
    pub async fn find_exact(&self, id: &str) -> StoreResult<Option<Value>> {
        let Some(path) = self.file_for(id) else {
            return Ok(None);
        };
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        match self.read(&path).await {
            Ok(layout) => Ok(Some(layout)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable layout file");
                Ok(None)
            }
        }
    }

    /// First file (by name) whose stem equals `id` ignoring case.
    pub async fn find_case_insensitive(&self, id: &str) -> StoreResult<Option<Value>> {
        let wanted = id.to_lowercase();
        for path in self.json_files().await? {
            if stem(&path).is_some_and(|s| s.to_lowercase() == wanted) {
                match self.read(&path).await {
                    Ok(layout) => return Ok(Some(layout)),
                    Err(e) => warn!(path = %path.display(), error = %e, "unreadable layout file"),
                }
            }
        }
        Ok(None)
    }

    /// Scan every file for an embedded `name` equal to `name`; a
    /// case-sensitive pass runs before a case-insensitive one.
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<Value>> {
        let mut parsed = Vec::new();
        for path in self.json_files().await? {
            match self.read(&path).await {
                Ok(layout) => parsed.push(layout),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping unparseable file"),
            }
        }

        let embedded = |layout: &Value| layout.get("name").and_then(Value::as_str).map(str::to_string);

        if let Some(pos) = parsed
            .iter()
            .position(|l| embedded(l).as_deref() == Some(name))
        {
            return Ok(Some(parsed.swap_remove(pos)));
        }
        let wanted = name.to_lowercase();
        if let Some(pos) = parsed
            .iter()
            .position(|l| embedded(l).is_some_and(|n| n.to_lowercase() == wanted))
        {
            return Ok(Some(parsed.swap_remove(pos)));
        }
        Ok(None)
    }

    /// Write `layout` as `<sanitized id>.json` unless that file exists.
    ///
    /// Returns `true` when a new file was written.
    pub async fn write_backup(&self, id: &str, layout: &Value) -> StoreResult<bool> {
        let name = sanitize_name(id);
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(format!(
                "cannot derive a file name from `{id}`"
            )));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{name}.json"));

        let body = serde_json::to_string_pretty(layout)?;
        let written = write_file(&path, body, Existing::Keep).await?;
        if written {
            info!(path = %path.display(), "layout backup written");
        }
        Ok(written)
    }

    /// Remove the file holding layout `id`.
    ///
    /// Tries `<id>.json`, then `<sanitized id>.json`, then the first file
    /// whose embedded `name` equals `id`.  Returns the removed path.
    pub async fn delete(&self, id: &str) -> StoreResult<Option<PathBuf>> {
        let mut candidates: Vec<PathBuf> = self.file_for(id).into_iter().collect();
        let sanitized = sanitize_name(id);
        if !sanitized.is_empty() {
            candidates.push(self.dir.join(format!("{sanitized}.json")));
        }

        let mut target = None;
        for path in candidates {
            if tokio::fs::try_exists(&path).await? {
                target = Some(path);
                break;
            }
        }
        if target.is_none() {
            target = self.file_named(id).await?;
        }
        let Some(path) = target else {
            return Ok(None);
        };

        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "layout file deleted");
        Ok(Some(path))
    }

    async fn file_named(&self, name: &str) -> StoreResult<Option<PathBuf>> {
        for path in self.json_files().await? {
            let Ok(layout) = self.read(&path).await else {
                continue;
            };
            if layout.get("name").and_then(Value::as_str) == Some(name) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    fn file_for(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return None;
        }
        Some(self.dir.join(format!("{id}.json")))
    }
}

/// File stem of a layout file (`dev.json` → `dev`).
pub fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Replace every character outside `[A-Za-z0-9]` with `_`, then lowercase.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn write(dir: &Path, file: &str, value: Value) {
        std::fs::write(dir.join(file), value.to_string()).unwrap();
    }

    #[test]
    fn sanitize_replaces_and_lowercases() {
        assert_eq!(sanitize_name("Meeting Mode!"), "meeting_mode_");
        assert_eq!(sanitize_name("dev"), "dev");
        assert_eq!(sanitize_name("Café"), "caf_");
    }

    #[tokio::test]
    async fn missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let local = LayoutDir::new(dir.path().join("absent"));
        assert!(local.json_files().await.unwrap().is_empty());
        assert!(local.find_by_name("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn files_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", json!({}));
        write(dir.path(), "a.json", json!({}));
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let local = LayoutDir::new(dir.path());
        let stems: Vec<String> = local
            .json_files()
            .await
            .unwrap()
            .iter()
            .map(|p| stem(p).unwrap().to_string())
            .collect();
        assert_eq!(stems, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn exact_and_case_insensitive_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Focus.json", json!({"name": "Focus"}));
        let local = LayoutDir::new(dir.path());

        assert!(local.find_exact("Focus").await.unwrap().is_some());
        assert!(local.find_case_insensitive("focus").await.unwrap().is_some());
        assert!(local.find_exact("../Focus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn name_scan_prefers_case_sensitive_match() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", json!({"name": "deep work", "tag": "lower"}));
        write(dir.path(), "b.json", json!({"name": "Deep Work", "tag": "exact"}));
        std::fs::write(dir.path().join("c.json"), "{ not json").unwrap();
        let local = LayoutDir::new(dir.path());

        let found = local.find_by_name("Deep Work").await.unwrap().unwrap();
        assert_eq!(found["tag"], "exact");
        let found = local.find_by_name("DEEP WORK").await.unwrap().unwrap();
        assert_eq!(found["tag"], "lower");
    }

    #[tokio::test]
    async fn backup_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let local = LayoutDir::new(dir.path().join("layouts"));

        assert!(local.write_backup("Meeting Mode", &json!({"v": 1})).await.unwrap());
        assert!(!local.write_backup("Meeting Mode", &json!({"v": 2})).await.unwrap());

        let kept = local.find_exact("meeting_mode").await.unwrap().unwrap();
        assert_eq!(kept["v"], 1);
    }

    #[tokio::test]
    async fn failed_backup_write_does_not_block_the_next_one() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("layouts");
        std::fs::create_dir_all(&layouts).unwrap();
        let target = layouts.join("focus.json");

        let failed = crate::atomic::persist_with(&target, Existing::Keep, |file| {
            use std::io::Write;
            file.write_all(b"{\"name\": \"Fo")?;
            Err(std::io::Error::other("device full"))
        });
        assert!(failed.is_err());
        assert!(!target.exists());

        let local = LayoutDir::new(&layouts);
        assert!(local.write_backup("Focus", &json!({"name": "Focus"})).await.unwrap());
        assert_eq!(local.find_exact("focus").await.unwrap().unwrap()["name"], "Focus");
    }

    #[tokio::test]
    async fn delete_by_id_sanitized_id_or_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "dev.json", json!({"name": "Dev"}));
        write(dir.path(), "meeting_mode.json", json!({"name": "Meetings"}));
        write(dir.path(), "z.json", json!({"name": "Deep Work"}));
        let local = LayoutDir::new(dir.path());

        assert_eq!(
            local.delete("dev").await.unwrap(),
            Some(dir.path().join("dev.json"))
        );
        assert_eq!(
            local.delete("Meeting Mode").await.unwrap(),
            Some(dir.path().join("meeting_mode.json"))
        );
        assert_eq!(
            local.delete("Deep Work").await.unwrap(),
            Some(dir.path().join("z.json"))
        );
        assert_eq!(local.delete("Deep Work").await.unwrap(), None);
        assert!(local.json_files().await.unwrap().is_empty());
    }
}
