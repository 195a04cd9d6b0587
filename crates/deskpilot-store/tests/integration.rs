//! Integration tests for the deskpilot-store crate.
//!
//! Both storage tiers live in a temporary directory; the resolver is
//! exercised through its public API only.

use deskpilot_store::{LayoutDir, LayoutFile, LayoutResolver, LayoutSource, LayoutTier, StoreError};
use serde_json::json;

fn setup() -> (tempfile::TempDir, LayoutResolver) {
    let dir = tempfile::tempdir().unwrap();
    let resolver = LayoutResolver::new(
        LayoutFile::new(dir.path().join(".deskpilot").join("workspace-layouts.json")),
        LayoutDir::new(dir.path().join("layouts")),
    );
    (dir, resolver)
}

// ═══════════════════════════════════════════════════════════════════════
//  Precedence
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn user_store_wins_over_local_directory() {
    let (dir, resolver) = setup();
    resolver
        .save("focus", json!({"name": "Focus", "origin": "user"}))
        .await
        .unwrap();
    std::fs::create_dir_all(dir.path().join("layouts")).unwrap();
    std::fs::write(
        dir.path().join("layouts").join("focus.json"),
        json!({"name": "Focus", "origin": "local"}).to_string(),
    )
    .unwrap();

    let found = resolver.resolve("focus").await.unwrap();
    assert_eq!(found.source, LayoutSource::UserExact);
    assert_eq!(found.layout["origin"], "user");
}

#[tokio::test]
async fn exact_user_id_beats_case_insensitive_one() {
    let (_dir, resolver) = setup();
    resolver.save("Dev", json!({"v": "upper"})).await.unwrap();
    resolver.save("dev", json!({"v": "lower"})).await.unwrap();

    let found = resolver.resolve("dev").await.unwrap();
    assert_eq!(found.source, LayoutSource::UserExact);
    assert_eq!(found.layout["v"], "lower");
}

#[tokio::test]
async fn backup_makes_layout_resolvable_locally() {
    let (dir, resolver) = setup();
    resolver
        .save("Research", json!({"name": "Research Mode"}))
        .await
        .unwrap();
    resolver.resolve("Research").await.unwrap();

    // A resolver over a fresh user store still finds the backup.
    let fresh = LayoutResolver::new(
        LayoutFile::new(dir.path().join("other.json")),
        LayoutDir::new(dir.path().join("layouts")),
    );
    let found = fresh.resolve("research").await.unwrap();
    assert_eq!(found.source, LayoutSource::LocalExactFile);
    assert_eq!(found.layout["name"], "Research Mode");
}

#[tokio::test]
async fn unknown_layout_is_not_found() {
    let (_dir, resolver) = setup();
    resolver.seed_defaults().await.unwrap();
    let err = resolver.resolve("gaming").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "gaming"));
}

// ═══════════════════════════════════════════════════════════════════════
//  Listing and seeding
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn seeded_defaults_are_listed_in_order() {
    let (_dir, resolver) = setup();
    resolver.seed_defaults().await.unwrap();

    let listed = resolver.list().await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["dev", "research", "meeting"]);
    assert_eq!(listed[2].name.as_deref(), Some("Meeting Mode"));
    assert_eq!(listed[2].action_count, 3);
}

#[tokio::test]
async fn summary_serializes_camel_case() {
    let (_dir, resolver) = setup();
    resolver
        .save("x", json!({"name": "X", "actions": [{}]}))
        .await
        .unwrap();
    let listed = resolver.list().await.unwrap();
    let value = serde_json::to_value(&listed[0]).unwrap();
    assert_eq!(value["actionCount"], 1);
    assert_eq!(value["tier"], "user");
}

// ═══════════════════════════════════════════════════════════════════════
//  Deletion
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn deleting_a_local_layout_by_embedded_name() {
    let (dir, resolver) = setup();
    std::fs::create_dir_all(dir.path().join("layouts")).unwrap();
    std::fs::write(
        dir.path().join("layouts").join("standup.json"),
        json!({"name": "Daily Standup", "actions": [{}]}).to_string(),
    )
    .unwrap();

    let tiers = resolver.delete("Daily Standup").await.unwrap();
    assert_eq!(tiers, vec![LayoutTier::Local]);
    assert!(!dir.path().join("layouts").join("standup.json").exists());
    assert!(resolver.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_seeded_default_leaves_the_others() {
    let (_dir, resolver) = setup();
    resolver.seed_defaults().await.unwrap();

    assert_eq!(resolver.delete("research").await.unwrap(), vec![LayoutTier::User]);
    let ids: Vec<String> = resolver.list().await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["dev", "meeting"]);
}
