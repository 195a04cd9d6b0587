//! Workspace executor: runs a layout's actions against an automation
//! backend.
//!
//! A run moves through `Idle -> Resolving -> Validating -> Running(i) ->
//! Completed`.  Only resolution and validation errors end a layout run in
//! `Failed`; once the loop starts, each action's failure is logged and the
//! next action runs anyway.  A single action run fails with its action.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use deskpilot_driver::{AutomationBackend, Capability, KeyChord, MouseButton, Pause};
use deskpilot_store::LayoutResolver;

use crate::action::{Action, ActionKind, Layout};
use crate::apps::{DEFAULT_BROWSER, DEFAULT_MESSENGER, canonical_app_name, is_browser};
use crate::error::{IntentError, Result};
use crate::normalize::normalize_layout;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Lifecycle of a single workspace run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Resolving,
    Validating,
    /// Executing the action at this index.
    Running(usize),
    Completed,
    Failed,
}

/// State carried from one action to the next within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// The app most recently brought to the front.
    pub last_activated_app: Option<String>,
    /// Browser profile requested by the latest `openApp` on a browser.
    pub browser_profile: Option<String>,
}

/// Executor settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorOptions {
    /// Attach one [`ActionOutcome`] per action to the report.
    ///
    /// Default: **false**
    #[serde(default)]
    pub verbose: bool,
}

impl ExecutorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of one action, reported in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub index: usize,
    /// The action's `type` tag.
    pub kind: String,
    pub description: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub layout_id: String,
    pub layout_name: String,
    /// Where the layout was found, when it came from a resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub success: bool,
    pub message: String,
    /// Final run state: `completed`, or `failed` for a single action run
    /// whose action failed.
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub actions_total: usize,
    pub actions_failed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activated_app: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<ActionOutcome>,
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs layouts sequentially against an [`AutomationBackend`].
pub struct WorkspaceExecutor {
    backend: Arc<dyn AutomationBackend>,
    options: ExecutorOptions,
}

impl WorkspaceExecutor {
    pub fn new(backend: Arc<dyn AutomationBackend>) -> Self {
        Self {
            backend,
            options: ExecutorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Resolve `id`, validate it, and run every action.
    ///
    /// Returns [`IntentError::NotFound`] or [`IntentError::InvalidLayout`]
    /// before anything runs; any other outcome is a report.
    pub async fn execute(&self, resolver: &LayoutResolver, id: &str) -> Result<RunReport> {
        let mut state = RunState::Idle;

        advance(&mut state, RunState::Resolving);
        let resolved = match resolver.resolve(id).await {
            Ok(resolved) => resolved,
            Err(e) => {
                advance(&mut state, RunState::Failed);
                return Err(e.into());
            }
        };

        advance(&mut state, RunState::Validating);
        let layout = match normalize_layout(&resolved.id, &resolved.layout) {
            Ok(layout) => layout,
            Err(e) => {
                warn!(layout = %id, error = %e, "layout failed validation");
                advance(&mut state, RunState::Failed);
                return Err(e);
            }
        };

        let source = Some(resolved.source.to_string());
        Ok(self
            .drive(&layout, source, &mut state, self.options.verbose)
            .await)
    }

    /// Run an already normalized layout.
    pub async fn run_layout(&self, layout: &Layout) -> RunReport {
        let mut state = RunState::Validating;
        self.drive(layout, None, &mut state, self.options.verbose)
            .await
    }

    /// Run one action on its own.
    ///
    /// Unlike a layout run, the report fails when the action fails, and its
    /// message is then the action's error.
    pub async fn run_single(&self, action: Action) -> RunReport {
        let layout = Layout {
            id: "single".to_string(),
            name: action.description.clone(),
            description: action.description.clone(),
            actions: vec![action],
        };
        let mut state = RunState::Validating;
        let mut report = self.drive(&layout, None, &mut state, true).await;

        if let Some(error) = report.outcomes.first().and_then(|o| o.error.clone()) {
            report.success = false;
            report.state = RunState::Failed;
            report.message = error;
        } else {
            report.message = format!("Action \"{}\" executed successfully", layout.name);
        }
        report
    }

    async fn drive(
        &self,
        layout: &Layout,
        source: Option<String>,
        state: &mut RunState,
        verbose: bool,
    ) -> RunReport {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let total = layout.actions.len();
        info!(
            run_id = %run_id,
            layout = %layout.id,
            actions = total,
            "starting workspace run"
        );

        let mut ctx = ExecutionContext::default();
        let mut failed = 0;
        let mut outcomes = Vec::new();

        for (index, action) in layout.actions.iter().enumerate() {
            advance(state, RunState::Running(index));
            debug!(
                index = index,
                kind = action.kind.type_name(),
                action = %action.description,
                "executing action"
            );

            let result = self.run_action(action, &mut ctx).await;
            if let Err(e) = &result {
                failed += 1;
                warn!(
                    index = index,
                    action = %action.description,
                    error = %e,
                    "action failed, continuing"
                );
            }

            if verbose {
                outcomes.push(ActionOutcome {
                    index,
                    kind: action.kind.type_name().to_string(),
                    description: action.description.clone(),
                    success: result.is_ok(),
                    error: result.err().map(|e| e.to_string()),
                });
            }

            if index + 1 < total {
                self.backend.pause(Pause::BetweenActions).await;
            }
        }

        advance(state, RunState::Completed);
        info!(
            run_id = %run_id,
            layout = %layout.id,
            failed = failed,
            "workspace run completed"
        );

        RunReport {
            run_id,
            layout_id: layout.id.clone(),
            layout_name: layout.name.clone(),
            source,
            success: true,
            message: format!("Workspace \"{}\" executed successfully", layout.name),
            state: *state,
            started_at,
            finished_at: Utc::now(),
            actions_total: total,
            actions_failed: failed,
            last_activated_app: ctx.last_activated_app,
            outcomes,
        }
    }

    // -- Per-action dispatch ------------------------------------------------

    async fn run_action(&self, action: &Action, ctx: &mut ExecutionContext) -> Result<()> {
        match &action.kind {
            ActionKind::OpenApp {
                app,
                chrome_profile,
            } => self.open_app(app, chrome_profile.as_deref(), ctx).await,
            ActionKind::OpenUrl {
                url,
                browser,
                chrome_profile,
            } => {
                self.open_urls(
                    std::slice::from_ref(url),
                    browser.as_deref(),
                    chrome_profile.as_deref(),
                    ctx,
                )
                .await
            }
            ActionKind::OpenMultipleUrls {
                urls,
                browser,
                chrome_profile,
            } => {
                self.open_urls(urls, browser.as_deref(), chrome_profile.as_deref(), ctx)
                    .await
            }
            ActionKind::KeyboardShortcut { key_sequence, app } => {
                let chord = KeyChord::parse(key_sequence);
                if chord.is_empty() {
                    return Err(IntentError::unsupported("empty key sequence"));
                }
                let target = app
                    .as_deref()
                    .map(canonical_app_name)
                    .or_else(|| ctx.last_activated_app.clone());
                self.press(&chord, target.as_deref()).await
            }
            ActionKind::MouseMove { x, y, click, app } => {
                self.pointer(*x, *y, *click, app.as_deref(), ctx).await
            }
            ActionKind::MouseClick { x, y, app } => {
                self.pointer(*x, *y, true, app.as_deref(), ctx).await
            }
            ActionKind::TypeText { text, app } => {
                if let Some(app) = app {
                    let app = canonical_app_name(app);
                    if self.backend.activate_app(&app).await {
                        ctx.last_activated_app = Some(app);
                    } else {
                        warn!(app = %app, "could not focus app before typing");
                    }
                }
                self.type_text(text).await
            }
            ActionKind::SendMessage {
                contact,
                message,
                app,
            } => self.send_message(contact, message, app.as_deref(), ctx).await,
            ActionKind::Unsupported { reason } => Err(IntentError::unsupported(reason.clone())),
        }
    }

    async fn open_app(
        &self,
        app: &str,
        profile: Option<&str>,
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        let app = canonical_app_name(app);
        if !self.backend.activate_app(&app).await {
            warn!(app = %app, "activation failed, opening a new window");
            if !self.backend.new_window(&app).await {
                return Err(IntentError::driver(
                    Capability::ActivateApp,
                    format!("could not open {app}"),
                ));
            }
        }
        if is_browser(&app)
            && let Some(profile) = profile
        {
            ctx.browser_profile = Some(profile.to_string());
        }
        ctx.last_activated_app = Some(app);
        Ok(())
    }

    async fn open_urls(
        &self,
        urls: &[String],
        browser: Option<&str>,
        profile: Option<&str>,
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        let browser = browser
            .map(canonical_app_name)
            .or_else(|| ctx.last_activated_app.clone())
            .unwrap_or_else(|| DEFAULT_BROWSER.to_string());
        let profile = if is_browser(&browser) {
            profile
                .map(str::to_string)
                .or_else(|| ctx.browser_profile.clone())
        } else if profile.is_some() || ctx.browser_profile.is_some() {
            debug!(app = %browser, "not passing a browser profile to a non-browser app");
            None
        } else {
            None
        };

        let mut opened = 0;
        for (i, url) in urls.iter().enumerate() {
            if i > 0 {
                self.backend.pause(Pause::BetweenUrls).await;
            }
            if self
                .backend
                .open_url(url, Some(&browser), profile.as_deref())
                .await
            {
                opened += 1;
            } else {
                warn!(url = %url, browser = %browser, "url could not be opened");
            }
        }

        if opened > 0 {
            ctx.last_activated_app = Some(browser.clone());
        }
        if opened < urls.len() {
            return Err(IntentError::driver(
                Capability::OpenUrl,
                format!("{} of {} urls failed in {browser}", urls.len() - opened, urls.len()),
            ));
        }
        Ok(())
    }

    async fn pointer(
        &self,
        x: i32,
        y: i32,
        click: bool,
        app: Option<&str>,
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        let target = app
            .map(canonical_app_name)
            .or_else(|| ctx.last_activated_app.clone());
        if let Some(target) = target {
            if self.backend.activate_app(&target).await {
                ctx.last_activated_app = Some(target);
            } else {
                warn!(app = %target, "could not focus app before pointer action");
            }
        }

        if !self.backend.move_mouse(x, y).await {
            return Err(IntentError::driver(
                Capability::MoveMouse,
                format!("pointer could not reach ({x}, {y})"),
            ));
        }
        if click && !self.backend.click(MouseButton::Left).await {
            return Err(IntentError::driver(
                Capability::Click,
                format!("click at ({x}, {y}) failed"),
            ));
        }
        Ok(())
    }

    async fn send_message(
        &self,
        contact: &str,
        message: &str,
        app: Option<&str>,
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        let app = app.map_or_else(|| DEFAULT_MESSENGER.to_string(), canonical_app_name);
        if !self.backend.activate_app(&app).await {
            return Err(IntentError::driver(
                Capability::ActivateApp,
                format!("could not open {app}"),
            ));
        }
        ctx.last_activated_app = Some(app);

        let search = KeyChord::parse(["command", "f"]);
        let confirm = KeyChord::parse(["return"]);

        self.backend.pause(Pause::MessageStep).await;
        self.press(&search, None).await?;
        self.backend.pause(Pause::MessageStep).await;
        self.type_text(contact).await?;
        self.backend.pause(Pause::MessageStep).await;
        self.press(&confirm, None).await?;
        self.backend.pause(Pause::MessageStep).await;
        self.type_text(message).await?;
        self.backend.pause(Pause::MessageStep).await;
        self.press(&confirm, None).await?;

        info!(contact = %contact, "message sent");
        Ok(())
    }

    async fn press(&self, chord: &KeyChord, target: Option<&str>) -> Result<()> {
        if self.backend.press_keys(chord, target).await {
            Ok(())
        } else {
            Err(IntentError::driver(
                Capability::PressKeys,
                format!("shortcut {chord} was not delivered"),
            ))
        }
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        if self.backend.type_text(text).await {
            Ok(())
        } else {
            Err(IntentError::driver(
                Capability::TypeText,
                "text was not typed",
            ))
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug!(from = ?*state, to = ?next, "run state");
    *state = next;
}
