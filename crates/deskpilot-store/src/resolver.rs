//! Layout resolution across the user-global store and the local directory.
//!
//! Lookup order, first hit wins:
//!
//! 1. exact id in the user store
//! 2. case-insensitive id in the user store
//! 3. `<id>.json` in the local directory
//! 4. case-insensitive file stem in the local directory
//! 5. embedded `name` field of any local file

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::defaults::default_layouts;
use crate::error::{StoreError, StoreResult};
use crate::json_store::LayoutFile;
use crate::local_dir::{LayoutDir, stem};

/// Where a resolved layout was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutSource {
    UserExact,
    UserCaseInsensitive,
    LocalExactFile,
    LocalCaseInsensitiveFile,
    LocalNameMatch,
}

impl std::fmt::Display for LayoutSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserExact => write!(f, "user layouts file (exact match)"),
            Self::UserCaseInsensitive => write!(f, "user layouts file (case-insensitive match)"),
            Self::LocalExactFile => write!(f, "local directory (exact filename match)"),
            Self::LocalCaseInsensitiveFile => {
                write!(f, "local directory (case-insensitive filename match)")
            }
            Self::LocalNameMatch => write!(f, "local directory (name match in content)"),
        }
    }
}

/// Storage tier a listed layout comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutTier {
    User,
    Local,
}

/// A layout located by [`LayoutResolver::resolve`], still in raw form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    /// The id that was requested.
    pub id: String,
    pub layout: Value,
    pub source: LayoutSource,
}

/// One entry of [`LayoutResolver::list`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub action_count: usize,
    pub tier: LayoutTier,
}

impl LayoutSummary {
    fn from_value(id: String, layout: &Value, tier: LayoutTier) -> Self {
        let text = |key: &str| layout.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id,
            name: text("name"),
            description: text("description"),
            action_count: layout
                .get("actions")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            tier,
        }
    }
}

/// Finds layouts by id across both storage tiers.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    user: LayoutFile,
    local: LayoutDir,
}

impl LayoutResolver {
    pub fn new(user: LayoutFile, local: LayoutDir) -> Self {
        Self { user, local }
    }

    pub fn user_store(&self) -> &LayoutFile {
        &self.user
    }

    pub fn local_dir(&self) -> &LayoutDir {
        &self.local
    }

    /// Locate `id`, then back it up into the local directory.
    ///
    /// Fails with [`StoreError::NotFound`] when no tier matches.  A failed
    /// backup is logged and does not affect the result.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> StoreResult<ResolvedLayout> {
        let (layout, source) = match self.find(id).await? {
            Some(found) => found,
            None => {
                warn!(layout = %id, "layout not found in any location");
                return Err(StoreError::NotFound {
                    entity: "layout",
                    id: id.to_string(),
                });
            }
        };
        info!(layout = %id, source = %source, "layout resolved");

        match self.local.write_backup(id, &layout).await {
            Ok(true) => debug!(layout = %id, "backup created"),
            Ok(false) => {}
            Err(e) => warn!(layout = %id, error = %e, "layout backup failed"),
        }

        Ok(ResolvedLayout {
            id: id.to_string(),
            layout,
            source,
        })
    }

    async fn find(&self, id: &str) -> StoreResult<Option<(Value, LayoutSource)>> {
        match self.user.get_all().await {
            Ok(all) => {
                if let Some(layout) = all.get(id) {
                    return Ok(Some((layout.clone(), LayoutSource::UserExact)));
                }
                let wanted = id.to_lowercase();
                if let Some((_, layout)) = all.iter().find(|(key, _)| key.to_lowercase() == wanted) {
                    return Ok(Some((layout.clone(), LayoutSource::UserCaseInsensitive)));
                }
            }
            Err(e) => warn!(
                path = %self.user.path().display(),
                error = %e,
                "user layout store unreadable, trying local directory"
            ),
        }

        if let Some(layout) = self.local.find_exact(id).await? {
            return Ok(Some((layout, LayoutSource::LocalExactFile)));
        }
        if let Some(layout) = self.local.find_case_insensitive(id).await? {
            return Ok(Some((layout, LayoutSource::LocalCaseInsensitiveFile)));
        }
        if let Some(layout) = self.local.find_by_name(id).await? {
            return Ok(Some((layout, LayoutSource::LocalNameMatch)));
        }
        Ok(None)
    }

    /// Summaries of every known layout: user-store entries in store order,
    /// then local files by name, skipping local entries whose id or name
    /// is already listed.
    #[instrument(skip(self))]
    pub async fn list(&self) -> StoreResult<Vec<LayoutSummary>> {
        let mut out = Vec::new();

        match self.user.get_all().await {
            Ok(all) => {
                for (id, layout) in &all {
                    out.push(LayoutSummary::from_value(id.clone(), layout, LayoutTier::User));
                }
            }
            Err(e) => warn!(error = %e, "user layout store unreadable"),
        }

        for path in self.local.json_files().await? {
            let Some(id) = stem(&path).map(str::to_string) else {
                continue;
            };
            let layout = match self.local.read(&path).await {
                Ok(layout) => layout,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable layout file");
                    continue;
                }
            };
            let summary = LayoutSummary::from_value(id, &layout, LayoutTier::Local);
            let duplicate = out.iter().any(|listed| {
                listed.id == summary.id || (summary.name.is_some() && listed.name == summary.name)
            });
            if !duplicate {
                out.push(summary);
            }
        }

        debug!(count = out.len(), "layouts listed");
        Ok(out)
    }

    /// Store a raw layout in the user store under `id`.
    #[instrument(skip(self, layout))]
    pub async fn save(&self, id: &str, layout: Value) -> StoreResult<()> {
        self.user.put(id, layout).await?;
        info!(layout = %id, "layout saved");
        Ok(())
    }

    /// Remove `id` from the user store and its file from the local
    /// directory.
    ///
    /// Returns the tiers it was removed from, or [`StoreError::NotFound`]
    /// when neither held it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> StoreResult<Vec<LayoutTier>> {
        let mut removed = Vec::new();
        if self.user.delete(id).await? {
            removed.push(LayoutTier::User);
        }
        if self.local.delete(id).await?.is_some() {
            removed.push(LayoutTier::Local);
        }
        if removed.is_empty() {
            warn!(layout = %id, "nothing to delete");
            return Err(StoreError::NotFound {
                entity: "layout",
                id: id.to_string(),
            });
        }
        info!(layout = %id, tiers = ?removed, "layout deleted");
        Ok(removed)
    }

    /// Insert the built-in layouts that are missing from the user store.
    pub async fn seed_defaults(&self) -> StoreResult<Vec<String>> {
        self.user.seed(default_layouts()).await
    }

    /// Raw user-store contents.
    pub async fn user_layouts(&self) -> StoreResult<Map<String, Value>> {
        self.user.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;

    fn resolver(root: &Path) -> LayoutResolver {
        LayoutResolver::new(
            LayoutFile::new(root.join("home").join("workspace-layouts.json")),
            LayoutDir::new(root.join("layouts")),
        )
    }

    fn local_file(root: &Path, file: &str, value: Value) {
        let dir = root.join("layouts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), value.to_string()).unwrap();
    }

    #[tokio::test]
    async fn user_store_case_insensitive_id() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        r.save("DeepWork", json!({"name": "Deep"})).await.unwrap();

        let found = r.resolve("deepwork").await.unwrap();
        assert_eq!(found.source, LayoutSource::UserCaseInsensitive);
        assert_eq!(found.layout["name"], "Deep");
    }

    #[tokio::test]
    async fn local_tiers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        local_file(dir.path(), "Focus.json", json!({"name": "Focus Mode"}));

        assert_eq!(
            r.resolve("FOCUS").await.unwrap().source,
            LayoutSource::LocalCaseInsensitiveFile
        );
        assert_eq!(
            r.resolve("focus mode").await.unwrap().source,
            LayoutSource::LocalNameMatch
        );
    }

    #[tokio::test]
    async fn not_found_names_the_id() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolver(dir.path()).resolve("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "layout not found: nope");
    }

    #[tokio::test]
    async fn resolve_writes_sanitized_backup() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        r.save("Meeting Mode", json!({"name": "Meeting"})).await.unwrap();

        r.resolve("Meeting Mode").await.unwrap();
        assert!(dir.path().join("layouts").join("meeting_mode.json").exists());
    }

    #[tokio::test]
    async fn corrupt_user_store_falls_back_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(home.join("workspace-layouts.json"), "{ broken").unwrap();
        local_file(dir.path(), "dev.json", json!({"name": "Dev"}));

        let found = resolver(dir.path()).resolve("dev").await.unwrap();
        assert_eq!(found.source, LayoutSource::LocalExactFile);
    }

    #[tokio::test]
    async fn list_dedupes_local_entries() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        r.save("dev", json!({"name": "Dev", "actions": [{}, {}]}))
            .await
            .unwrap();
        local_file(dir.path(), "dev.json", json!({"name": "Other"}));
        local_file(dir.path(), "copy.json", json!({"name": "Dev"}));
        local_file(dir.path(), "extra.json", json!({"name": "Extra", "actions": [{}]}));

        let listed = r.list().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["dev", "extra"]);
        assert_eq!(listed[0].action_count, 2);
        assert_eq!(listed[0].tier, LayoutTier::User);
        assert_eq!(listed[1].tier, LayoutTier::Local);
    }

    #[tokio::test]
    async fn seed_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let first = r.seed_defaults().await.unwrap();
        assert_eq!(first, vec!["dev", "research", "meeting"]);
        assert!(r.seed_defaults().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_store_entry_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        r.save("Focus", json!({"name": "Focus"})).await.unwrap();
        r.resolve("Focus").await.unwrap();

        let tiers = r.delete("Focus").await.unwrap();
        assert_eq!(tiers, vec![LayoutTier::User, LayoutTier::Local]);
        assert!(matches!(
            r.resolve("Focus").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            r.delete("Focus").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
