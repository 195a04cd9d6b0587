//! # deskpilot-intent
//!
//! Turns intent into automation: free-text phrases are matched against a
//! built-in command catalogue, named layouts are resolved, normalized and
//! executed action by action against an
//! [`AutomationBackend`](deskpilot_driver::AutomationBackend).
//!
//! ```text
//!   phrase ──► CommandMatcher ──► CommandInvoker ─┐
//!                                                 ├──► AutomationBackend
//!   layout id ──► LayoutResolver ──► normalize ──►│
//!                                  WorkspaceExecutor
//! ```
//!
//! [`Workspace`] bundles all of it behind one handle.

pub mod action;
pub mod apps;
pub mod commands;
pub mod error;
pub mod executor;
pub mod invoke;
pub mod matcher;
pub mod normalize;
pub mod service;
pub mod similarity;

// ── re-exports ───────────────────────────────────────────────────────

pub use action::{Action, ActionKind, Layout};
pub use apps::{DEFAULT_BROWSER, DEFAULT_MESSENGER, canonical_app_name, ensure_scheme, is_browser};
pub use commands::{
    CommandAction, CommandDescriptor, Operation, PointerKind, RoutineStep, builtin_commands,
};
pub use error::{IntentError, Result};
pub use executor::{
    ActionOutcome, ExecutionContext, ExecutorOptions, RunReport, RunState, WorkspaceExecutor,
};
pub use invoke::{CommandInvoker, CommandOutcome, default_screenshot_dir};
pub use matcher::{CommandMatcher, FUZZY_THRESHOLD, MatchTier, ResolvedCommand};
pub use normalize::{normalize_action, normalize_layout};
pub use service::{
    CommandResponse, ExecutionResult, NOT_UNDERSTOOD, Workspace, WorkspaceOptions,
};
pub use similarity::{levenshtein, similarity};
