//! The `Workspace` facade: one entry point for layouts and commands.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use deskpilot_driver::AutomationBackend;
use deskpilot_store::{LayoutResolver, LayoutSummary, LayoutTier};

use crate::action::{ActionKind, Layout};
use crate::commands::CommandDescriptor;
use crate::error::{IntentError, Result};
use crate::executor::{ExecutorOptions, RunReport, RunState, WorkspaceExecutor};
use crate::invoke::{CommandInvoker, CommandOutcome, default_screenshot_dir};
use crate::matcher::{CommandMatcher, MatchTier, ResolvedCommand};
use crate::normalize::{normalize_action, normalize_layout};

/// Reply given when no command matches a phrase.
pub const NOT_UNDERSTOOD: &str = "Sorry, I couldn't understand that command";

/// Settings for a [`Workspace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceOptions {
    /// Attach per-action outcomes to run reports.
    ///
    /// Default: **false**
    pub verbose: bool,

    /// Where screenshot commands save their files.
    ///
    /// Default: **`$HOME/Desktop`**
    pub screenshot_dir: PathBuf,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

impl WorkspaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }
}

/// Outcome of [`Workspace::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Phase that ended the run before any action executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_in: Option<RunState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

/// Outcome of [`Workspace::handle_command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    /// `false` when no command matched; distinct from a failed command.
    pub understood: bool,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<MatchTier>,
}

impl CommandResponse {
    fn not_understood() -> Self {
        Self {
            understood: false,
            success: false,
            message: NOT_UNDERSTOOD.to_string(),
            command: None,
            tier: None,
        }
    }
}

/// Layout resolution, execution and command handling behind one handle.
pub struct Workspace {
    resolver: LayoutResolver,
    executor: WorkspaceExecutor,
    invoker: CommandInvoker,
    matcher: CommandMatcher,
}

impl Workspace {
    pub fn new(
        resolver: LayoutResolver,
        backend: Arc<dyn AutomationBackend>,
        options: WorkspaceOptions,
    ) -> Self {
        let executor = WorkspaceExecutor::new(backend.clone())
            .with_options(ExecutorOptions::new().with_verbose(options.verbose));
        Self {
            resolver,
            executor,
            invoker: CommandInvoker::new(backend, options.screenshot_dir),
            matcher: CommandMatcher::builtin(),
        }
    }

    /// Replace the command catalogue.
    pub fn with_matcher(mut self, matcher: CommandMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn resolver(&self) -> &LayoutResolver {
        &self.resolver
    }

    // -- Layouts ------------------------------------------------------------

    /// Run layout `id`, folding terminal errors into the result.
    pub async fn execute(&self, id: &str) -> ExecutionResult {
        match self.run(id).await {
            Ok(report) => ExecutionResult {
                success: report.success,
                message: Some(report.message.clone()),
                error: None,
                failed_in: None,
                report: Some(report),
            },
            Err(e) => {
                let phase = match e {
                    IntentError::InvalidLayout { .. } => RunState::Validating,
                    _ => RunState::Resolving,
                };
                warn!(layout = %id, phase = ?phase, error = %e, "workspace run failed");
                ExecutionResult {
                    success: false,
                    message: None,
                    error: Some(e.to_string()),
                    failed_in: Some(phase),
                    report: None,
                }
            }
        }
    }

    /// Run layout `id`, returning terminal errors as `Err`.
    pub async fn run(&self, id: &str) -> Result<RunReport> {
        self.executor.execute(&self.resolver, id).await
    }

    pub async fn list(&self) -> Result<Vec<LayoutSummary>> {
        Ok(self.resolver.list().await?)
    }

    /// Validate `layout` and store it under `id` in the user store.
    pub async fn save(&self, id: &str, layout: Value) -> Result<Layout> {
        let normalized = normalize_layout(id, &layout)?;
        self.resolver.save(id, layout).await?;
        Ok(normalized)
    }

    /// Remove layout `id` from every tier that holds it.
    pub async fn delete(&self, id: &str) -> Result<Vec<LayoutTier>> {
        Ok(self.resolver.delete(id).await?)
    }

    /// Try a single pointer action: focus its app, move, then click when
    /// asked.
    ///
    /// Anything other than `mouseMove` or `mouseClick` is rejected with
    /// [`IntentError::UnsupportedAction`] before the backend is touched.
    pub async fn test_action(&self, raw: &Value) -> Result<RunReport> {
        let action = normalize_action(0, raw);
        let (x, y, clicks) = match &action.kind {
            ActionKind::MouseMove { x, y, click, .. } => (*x, *y, *click),
            ActionKind::MouseClick { x, y, .. } => (*x, *y, true),
            ActionKind::Unsupported { reason } => {
                return Err(IntentError::unsupported(reason.clone()));
            }
            other => {
                return Err(IntentError::unsupported(format!(
                    "only pointer actions can be tested, got {}",
                    other.type_name()
                )));
            }
        };

        let mut report = self.executor.run_single(action).await;
        if report.success {
            let verb = if clicks { "clicked" } else { "moved" };
            report.message = format!("Successfully {verb} at ({x}, {y})");
        }
        info!(success = report.success, "test action finished");
        Ok(report)
    }

    /// Insert the default layouts missing from the user store.
    pub async fn seed_defaults(&self) -> Result<Vec<String>> {
        let seeded = self.resolver.seed_defaults().await?;
        info!(count = seeded.len(), "default layouts seeded");
        Ok(seeded)
    }

    // -- Commands -----------------------------------------------------------

    pub fn commands(&self) -> &[CommandDescriptor] {
        self.matcher.commands()
    }

    pub fn resolve_command(&self, phrase: &str) -> Option<ResolvedCommand> {
        self.matcher.resolve(phrase)
    }

    pub async fn invoke(&self, descriptor: &CommandDescriptor, params: &Value) -> CommandOutcome {
        self.invoker.invoke(descriptor, params).await
    }

    /// Resolve and invoke a free-text command.
    ///
    /// Fails with [`IntentError::EmptyCommand`] for blank input; a phrase
    /// that matches nothing is a normal, not-understood response.
    pub async fn handle_command(&self, phrase: &str) -> Result<CommandResponse> {
        let resolved = self.matcher.resolve(phrase);
        if resolved.is_none() && phrase.trim().is_empty() {
            return Err(IntentError::EmptyCommand);
        }
        let Some(ResolvedCommand { descriptor, tier }) = resolved else {
            info!(phrase = %phrase.trim(), "command not understood");
            return Ok(CommandResponse::not_understood());
        };

        let outcome = self.invoker.invoke(&descriptor, &Value::Null).await;
        Ok(CommandResponse {
            understood: true,
            success: outcome.success,
            message: outcome.message,
            command: Some(descriptor.description),
            tier: Some(tier),
        })
    }
}
