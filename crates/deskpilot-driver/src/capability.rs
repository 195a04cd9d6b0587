//! Capability vocabulary shared by every driver tier.
//!
//! A capability call is described once as an [`Invocation`] and dispatched
//! to whichever [`Driver`] the chain is currently trying, so the fallback
//! cascade lives in exactly one place.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keys::KeyChord;
use crate::traits::Driver;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// The fixed set of operations a driver may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ActivateApp,
    NewWindow,
    MoveMouse,
    Click,
    PressKeys,
    TypeText,
    OpenUrl,
    /// Appearance, audio and screenshot operations.
    System,
}

impl Capability {
    /// Every capability, in interface order.
    pub const ALL: [Capability; 8] = [
        Self::ActivateApp,
        Self::NewWindow,
        Self::MoveMouse,
        Self::Click,
        Self::PressKeys,
        Self::TypeText,
        Self::OpenUrl,
        Self::System,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActivateApp => write!(f, "activate_app"),
            Self::NewWindow => write!(f, "new_window"),
            Self::MoveMouse => write!(f, "move_mouse"),
            Self::Click => write!(f, "click"),
            Self::PressKeys => write!(f, "press_keys"),
            Self::TypeText => write!(f, "type_text"),
            Self::OpenUrl => write!(f, "open_url"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Pointer button for [`Capability::Click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Middle => write!(f, "middle"),
        }
    }
}

/// OS-level operations that have no pointer/keyboard equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum SystemOp {
    /// Switch the system appearance to dark (`true`) or light (`false`).
    SetDarkMode { enabled: bool },
    /// Mute or unmute the output device.
    SetMuted { muted: bool },
    /// Change the output volume by `delta` percentage points, clamped to 0..=100.
    AdjustVolume { delta: i8 },
    /// Capture the whole screen into `path` without the shutter sound.
    Screenshot { path: PathBuf },
}

impl std::fmt::Display for SystemOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetDarkMode { enabled } => write!(f, "set_dark_mode({enabled})"),
            Self::SetMuted { muted } => write!(f, "set_muted({muted})"),
            Self::AdjustVolume { delta } => write!(f, "adjust_volume({delta:+})"),
            Self::Screenshot { path } => write!(f, "screenshot({})", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One capability call with its arguments.
#[derive(Debug, Clone, Copy)]
pub enum Invocation<'a> {
    ActivateApp {
        name: &'a str,
    },
    NewWindow {
        name: &'a str,
    },
    MoveMouse {
        x: i32,
        y: i32,
    },
    Click {
        button: MouseButton,
    },
    PressKeys {
        chord: &'a KeyChord,
        target_app: Option<&'a str>,
    },
    TypeText {
        text: &'a str,
    },
    OpenUrl {
        url: &'a str,
        browser: Option<&'a str>,
        profile: Option<&'a str>,
    },
    System {
        op: &'a SystemOp,
    },
}

impl Invocation<'_> {
    /// The capability this call exercises.
    pub fn capability(&self) -> Capability {
        match self {
            Self::ActivateApp { .. } => Capability::ActivateApp,
            Self::NewWindow { .. } => Capability::NewWindow,
            Self::MoveMouse { .. } => Capability::MoveMouse,
            Self::Click { .. } => Capability::Click,
            Self::PressKeys { .. } => Capability::PressKeys,
            Self::TypeText { .. } => Capability::TypeText,
            Self::OpenUrl { .. } => Capability::OpenUrl,
            Self::System { .. } => Capability::System,
        }
    }

    /// Run this call against a single driver tier.
    pub async fn dispatch(&self, driver: &dyn Driver) -> Result<()> {
        match *self {
            Self::ActivateApp { name } => driver.activate_app(name).await,
            Self::NewWindow { name } => driver.new_window(name).await,
            Self::MoveMouse { x, y } => driver.move_mouse(x, y).await,
            Self::Click { button } => driver.click(button).await,
            Self::PressKeys { chord, target_app } => driver.press_keys(chord, target_app).await,
            Self::TypeText { text } => driver.type_text(text).await,
            Self::OpenUrl {
                url,
                browser,
                profile,
            } => driver.open_url(url, browser, profile).await,
            Self::System { op } => driver.system(op).await,
        }
    }
}

impl std::fmt::Display for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActivateApp { name } => write!(f, "activate_app:{name}"),
            Self::NewWindow { name } => write!(f, "new_window:{name}"),
            Self::MoveMouse { x, y } => write!(f, "move_mouse:{x},{y}"),
            Self::Click { button } => write!(f, "click:{button}"),
            Self::PressKeys { chord, target_app } => match target_app {
                Some(app) => write!(f, "press_keys:{chord}@{app}"),
                None => write!(f, "press_keys:{chord}"),
            },
            Self::TypeText { text } => write!(f, "type_text:{text}"),
            Self::OpenUrl { url, browser, .. } => match browser {
                Some(browser) => write!(f, "open_url:{url}@{browser}"),
                None => write!(f, "open_url:{url}"),
            },
            Self::System { op } => write!(f, "system:{op}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_reports_its_capability() {
        let chord = KeyChord::parse(["cmd", "t"]);
        let calls = [
            Invocation::ActivateApp { name: "Notes" },
            Invocation::MoveMouse { x: 1, y: 2 },
            Invocation::PressKeys {
                chord: &chord,
                target_app: None,
            },
        ];
        let caps: Vec<_> = calls.iter().map(Invocation::capability).collect();
        assert_eq!(
            caps,
            vec![
                Capability::ActivateApp,
                Capability::MoveMouse,
                Capability::PressKeys
            ]
        );
    }

    #[test]
    fn invocation_display_is_compact() {
        let call = Invocation::OpenUrl {
            url: "https://meet.google.com",
            browser: Some("Google Chrome"),
            profile: None,
        };
        assert_eq!(
            call.to_string(),
            "open_url:https://meet.google.com@Google Chrome"
        );
    }

    #[test]
    fn system_op_display_signs_volume_delta() {
        assert_eq!(
            SystemOp::AdjustVolume { delta: -10 }.to_string(),
            "adjust_volume(-10)"
        );
        assert_eq!(
            SystemOp::AdjustVolume { delta: 10 }.to_string(),
            "adjust_volume(+10)"
        );
    }
}
