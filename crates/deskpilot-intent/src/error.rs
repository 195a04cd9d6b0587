//! Intent engine error types.
//!
//! All intent subsystems surface errors through [`IntentError`].
//! `NotFound` and `InvalidLayout` end a run before any action executes;
//! `DriverFailure` and `UnsupportedAction` are caught per action.

use deskpilot_driver::Capability;
use deskpilot_store::StoreError;

/// Unified error type for the intent engine.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Run-terminal errors -------------------------------------------------
    /// No storage tier holds the requested layout.
    #[error("layout \"{id}\" not found in any location")]
    NotFound { id: String },

    /// The layout failed validation.
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },

    // -- Per-action errors ---------------------------------------------------
    /// Every driver tier failed for a capability call.
    #[error("{capability} failed on every driver tier: {detail}")]
    DriverFailure {
        capability: Capability,
        detail: String,
    },

    /// The action cannot be executed at all.
    #[error("unsupported action: {reason}")]
    UnsupportedAction { reason: String },

    // -- Command errors ------------------------------------------------------
    /// A free-text command was empty after trimming.
    #[error("no command provided")]
    EmptyCommand,

    // -- Upstream crate errors -----------------------------------------------
    /// A storage error other than a missing layout.
    #[error("store error: {0}")]
    Store(StoreError),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntentError {
    pub(crate) fn driver(capability: Capability, detail: impl Into<String>) -> Self {
        Self::DriverFailure {
            capability,
            detail: detail.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedAction {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for IntentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound { id },
            other => Self::Store(other),
        }
    }
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
