//! Integration tests for the deskpilot-intent crate.
//!
//! Layout stores live in a temporary directory and every capability call
//! goes to a `DryRunBackend`, so nothing touches the real desktop.

use std::sync::Arc;

use deskpilot_driver::{Capability, DryRunBackend};
use deskpilot_intent::{
    CommandAction, CommandDescriptor, CommandMatcher, IntentError, MatchTier, Operation, RunState,
    Workspace, WorkspaceOptions, normalize_layout, similarity,
};
use deskpilot_store::{LayoutDir, LayoutFile, LayoutResolver, LayoutTier};
use serde_json::json;

fn setup(backend: DryRunBackend) -> (tempfile::TempDir, Arc<DryRunBackend>, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(backend);
    let resolver = LayoutResolver::new(
        LayoutFile::new(dir.path().join(".deskpilot").join("workspace-layouts.json")),
        LayoutDir::new(dir.path().join("layouts")),
    );
    let ws = Workspace::new(
        resolver,
        backend.clone(),
        WorkspaceOptions::new()
            .with_verbose(true)
            .with_screenshot_dir(dir.path()),
    );
    (dir, backend, ws)
}

// ═══════════════════════════════════════════════════════════════════════
//  Workspace execution
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn meeting_layout_end_to_end() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    ws.save(
        "meeting",
        json!({
            "name": "Meeting Mode",
            "actions": [
                {"openApp": "Google Chrome"},
                {"url": "https://meet.google.com"}
            ]
        }),
    )
    .await
    .unwrap();

    let result = ws.execute("meeting").await;
    assert!(result.success, "{result:?}");
    assert_eq!(
        backend.calls(),
        vec![
            "activate_app:Google Chrome",
            "open_url:https://meet.google.com@Google Chrome"
        ]
    );
    let report = result.report.unwrap();
    assert_eq!(report.last_activated_app.as_deref(), Some("Google Chrome"));
    assert_eq!(report.actions_failed, 0);
    assert_eq!(
        report.message,
        "Workspace \"Meeting Mode\" executed successfully"
    );
}

#[tokio::test]
async fn failing_middle_action_does_not_stop_the_run() {
    let (_dir, backend, ws) = setup(DryRunBackend::new().fail_on(Capability::PressKeys));
    ws.save(
        "three",
        json!({
            "name": "Three Steps",
            "actions": [
                {"openApp": "Terminal"},
                {"keySequence": ["cmd", "t"]},
                {"text": "cargo test"}
            ]
        }),
    )
    .await
    .unwrap();

    let result = ws.execute("three").await;
    assert!(result.success);
    let calls = backend.calls();
    assert_eq!(calls.last().map(String::as_str), Some("type_text:cargo test"));

    let report = result.report.unwrap();
    assert_eq!(report.actions_failed, 1);
    let flags: Vec<bool> = report.outcomes.iter().map(|o| o.success).collect();
    assert_eq!(flags, vec![true, false, true]);
}

#[tokio::test]
async fn user_store_layout_shadows_local_file() {
    let (dir, backend, ws) = setup(DryRunBackend::new());
    ws.save("focus", json!({"name": "Focus", "actions": [{"openApp": "Notes"}]}))
        .await
        .unwrap();
    std::fs::create_dir_all(dir.path().join("layouts")).unwrap();
    std::fs::write(
        dir.path().join("layouts").join("focus.json"),
        json!({"name": "Focus", "actions": [{"openApp": "Slack"}]}).to_string(),
    )
    .unwrap();

    let report = ws.run("focus").await.unwrap();
    assert_eq!(report.source.as_deref(), Some("user layouts file (exact match)"));
    assert_eq!(backend.calls(), vec!["activate_app:Notes"]);
}

#[tokio::test]
async fn invalid_stored_layout_fails_before_any_action() {
    let (dir, backend, ws) = setup(DryRunBackend::new());
    std::fs::create_dir_all(dir.path().join("layouts")).unwrap();
    std::fs::write(
        dir.path().join("layouts").join("empty.json"),
        json!({"name": "Empty", "actions": []}).to_string(),
    )
    .unwrap();

    let result = ws.execute("empty").await;
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("invalid layout"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn seeded_defaults_run() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    ws.seed_defaults().await.unwrap();

    let result = ws.execute("research").await;
    assert!(result.success);
    assert_eq!(
        backend.calls(),
        vec![
            "activate_app:Google Chrome",
            "open_url:https://github.com@Google Chrome"
        ]
    );
}

// ═══════════════════════════════════════════════════════════════════════
//  Normalization
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn normalizing_twice_changes_nothing() {
    let raw = json!({
        "name": "Dev",
        "actions": [
            {"openApp": "vscode"},
            {"description": "New tab", "keySequence": "Cmd+T", "app": "Terminal"},
            {"x": "400", "y": 600, "click": true},
            {"url": "localhost:3000", "chromeProfile": "Default"}
        ]
    });
    let once = normalize_layout("dev", &raw).unwrap();
    let again = normalize_layout("dev", &serde_json::to_value(&once).unwrap()).unwrap();
    assert_eq!(once, again);
}

// ═══════════════════════════════════════════════════════════════════════
//  Command resolution
// ═══════════════════════════════════════════════════════════════════════

fn single(trigger: &str) -> CommandMatcher {
    CommandMatcher::new(vec![CommandDescriptor::new(
        &[trigger],
        CommandAction::Operation(Operation::MuteAudio),
        "test",
    )])
}

#[test]
fn fuzzy_threshold_is_strict() {
    let trigger = "a".repeat(100);
    let matcher = single(&trigger);

    // 30 substitutions: similarity exactly 0.70.
    let at_threshold = format!("{}{}", "b".repeat(30), "a".repeat(70));
    assert_eq!(similarity(&at_threshold, &trigger), 0.70);
    assert!(matcher.resolve(&at_threshold).is_none());

    // 29 substitutions: similarity 0.71.
    let above = format!("{}{}", "b".repeat(29), "a".repeat(71));
    let resolved = matcher.resolve(&above).unwrap();
    assert!(matches!(resolved.tier, MatchTier::Fuzzy { similarity } if similarity > 0.70));
}

#[test]
fn literal_trigger_beats_fuzzy() {
    let matcher = CommandMatcher::builtin();
    let resolved = matcher.resolve("Volume Up").unwrap();
    assert_eq!(resolved.tier, MatchTier::Exact);
    assert_eq!(resolved.descriptor.description, "Increase volume");

    let resolved = matcher.resolve("could you turn the volume up please").unwrap();
    assert_eq!(resolved.tier, MatchTier::Substring);
    assert_eq!(resolved.descriptor.description, "Increase volume");
}

#[test]
fn near_miss_matches_fuzzily() {
    let matcher = CommandMatcher::builtin();
    let resolved = matcher.resolve("lock screem").unwrap();
    assert!(matches!(resolved.tier, MatchTier::Fuzzy { .. }));
    assert_eq!(resolved.descriptor.description, "Lock the screen");
}

#[tokio::test]
async fn unknown_phrase_is_not_understood() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    let response = ws.handle_command("bake a sourdough loaf").await.unwrap();
    assert!(!response.understood);
    assert!(!response.success);
    assert_eq!(response.message, "Sorry, I couldn't understand that command");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn operation_command_reports_its_message() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    let response = ws.handle_command("unmute").await.unwrap();
    assert!(response.understood && response.success);
    assert_eq!(response.message, "Audio unmuted");
    assert_eq!(backend.calls(), vec!["system:set_muted(false)"]);
}

// ═══════════════════════════════════════════════════════════════════════
//  Deleting layouts and trying single actions
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn deleted_layout_no_longer_runs() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    ws.seed_defaults().await.unwrap();
    assert!(ws.execute("research").await.success);

    let tiers = ws.delete("research").await.unwrap();
    assert_eq!(tiers, vec![LayoutTier::User, LayoutTier::Local]);

    let calls_before = backend.calls().len();
    let result = ws.execute("research").await;
    assert!(!result.success);
    assert_eq!(result.failed_in, Some(RunState::Resolving));
    assert_eq!(backend.calls().len(), calls_before);

    assert!(matches!(
        ws.delete("research").await,
        Err(IntentError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_action_focuses_moves_then_clicks() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    let report = ws
        .test_action(&json!({"x": "120", "y": 45, "click": true, "app": "terminal"}))
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.message, "Successfully clicked at (120, 45)");
    assert_eq!(
        backend.calls(),
        vec!["activate_app:Terminal", "move_mouse:120,45", "click:left"]
    );
}

#[tokio::test]
async fn test_action_move_only_and_failure() {
    let (_dir, backend, ws) = setup(DryRunBackend::new());
    let report = ws
        .test_action(&json!({"type": "mouseMove", "x": 7, "y": 8}))
        .await
        .unwrap();
    assert_eq!(report.message, "Successfully moved at (7, 8)");
    assert_eq!(backend.calls(), vec!["move_mouse:7,8"]);

    let (_dir, _backend, ws) = setup(DryRunBackend::new().fail_on(Capability::MoveMouse));
    let report = ws
        .test_action(&json!({"type": "mouseClick", "x": 7, "y": 8}))
        .await
        .unwrap();
    assert!(!report.success);
    assert_eq!(report.state, RunState::Failed);
    assert!(report.message.contains("(7, 8)"));
}
