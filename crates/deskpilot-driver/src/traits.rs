//! Core driver traits and supporting types.
//!
//! A [`Driver`] is one tier of OS automation (structured input library,
//! script bridge, process spawn, raw key codes).  An [`AutomationBackend`]
//! is what the executor talks to: it never fails with an error, it reports
//! success or failure of each capability call as a `bool`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capability::{Capability, MouseButton, SystemOp};
use crate::error::{DriverError, Result};
use crate::keys::KeyChord;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Named waits the executor may request between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pause {
    /// After each action of a workspace run.
    BetweenActions,
    /// Between consecutive URLs of a multi-URL action.
    BetweenUrls,
    /// Between the steps of a scripted message send.
    MessageStep,
    /// Between the two clicks of a double click.
    DoubleClickGap,
}

impl std::fmt::Display for Pause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BetweenActions => write!(f, "between_actions"),
            Self::BetweenUrls => write!(f, "between_urls"),
            Self::MessageStep => write!(f, "message_step"),
            Self::DoubleClickGap => write!(f, "double_click_gap"),
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// A single automation tier.
///
/// Every capability method defaults to [`DriverError::Unsupported`], so a
/// tier only overrides what it can actually do and advertises it through
/// [`Driver::supports`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// Stable identifier used in logs (`script`, `spawn`, ...).
    fn id(&self) -> &str;

    /// Whether this tier implements the capability at all.
    fn supports(&self, capability: Capability) -> bool;

    /// Probe whether the tier's runtime is present right now.
    async fn is_available(&self) -> bool;

    async fn activate_app(&self, _name: &str) -> Result<()> {
        Err(self.unsupported(Capability::ActivateApp))
    }

    async fn new_window(&self, _name: &str) -> Result<()> {
        Err(self.unsupported(Capability::NewWindow))
    }

    async fn move_mouse(&self, _x: i32, _y: i32) -> Result<()> {
        Err(self.unsupported(Capability::MoveMouse))
    }

    async fn click(&self, _button: MouseButton) -> Result<()> {
        Err(self.unsupported(Capability::Click))
    }

    /// Press a chord, bringing `target_app` to the front first when given.
    async fn press_keys(&self, _chord: &KeyChord, _target_app: Option<&str>) -> Result<()> {
        Err(self.unsupported(Capability::PressKeys))
    }

    async fn type_text(&self, _text: &str) -> Result<()> {
        Err(self.unsupported(Capability::TypeText))
    }

    async fn open_url(
        &self,
        _url: &str,
        _browser: Option<&str>,
        _profile: Option<&str>,
    ) -> Result<()> {
        Err(self.unsupported(Capability::OpenUrl))
    }

    async fn system(&self, _op: &SystemOp) -> Result<()> {
        Err(self.unsupported(Capability::System))
    }

    /// Current pointer position, if the tier can read it back.
    async fn pointer_position(&self) -> Result<Option<(i32, i32)>> {
        Ok(None)
    }

    /// Build the error returned for a capability this tier lacks.
    fn unsupported(&self, capability: Capability) -> DriverError {
        DriverError::Unsupported {
            driver: self.id().to_string(),
            capability,
        }
    }
}

// ---------------------------------------------------------------------------
// AutomationBackend
// ---------------------------------------------------------------------------

/// The capability interface consumed by the workspace executor.
///
/// Each call returns `true` on success and `false` once every available
/// tier has failed; errors never cross this boundary.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    async fn activate_app(&self, name: &str) -> bool;

    async fn new_window(&self, name: &str) -> bool;

    async fn move_mouse(&self, x: i32, y: i32) -> bool;

    async fn click(&self, button: MouseButton) -> bool;

    async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> bool;

    async fn type_text(&self, text: &str) -> bool;

    async fn open_url(&self, url: &str, browser: Option<&str>, profile: Option<&str>) -> bool;

    async fn system(&self, op: &SystemOp) -> bool;

    /// Wait for the configured duration of `pause`.
    async fn pause(&self, pause: Pause);
}
