//! OS scripting bridge tier.
//!
//! Synthesizes one AppleScript per capability call and runs it through the
//! configured interpreter (`osascript -e <script>`).  Script construction is
//! kept in pure functions so it can be tested without an interpreter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::capability::{Capability, MouseButton, SystemOp};
use crate::error::{DriverError, Result};
use crate::keys::{KeyChord, escape_script_string};
use crate::runner::CommandRunner;
use crate::traits::Driver;

/// Driver that talks to the OS through a scripting bridge.
pub struct ScriptBridgeDriver {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl ScriptBridgeDriver {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    async fn run_script(&self, script: &str) -> Result<String> {
        debug!(lines = script.lines().count(), "running script");
        self.runner
            .run(&self.program, &["-e".to_string(), script.to_string()])
            .await
    }
}

#[async_trait]
impl Driver for ScriptBridgeDriver {
    fn id(&self) -> &str {
        "script"
    }

    fn supports(&self, _capability: Capability) -> bool {
        // Every capability has a script form; unsupported variants
        // (right click, screenshots, browser profiles) fail per call.
        true
    }

    async fn is_available(&self) -> bool {
        self.runner.has_program(&self.program)
    }

    async fn activate_app(&self, name: &str) -> Result<()> {
        self.run_script(&activate_script(name)).await.map(drop)
    }

    async fn new_window(&self, name: &str) -> Result<()> {
        self.run_script(&new_window_script(name)).await.map(drop)
    }

    async fn move_mouse(&self, x: i32, y: i32) -> Result<()> {
        self.run_script(&move_mouse_script(x, y)).await.map(drop)
    }

    async fn click(&self, button: MouseButton) -> Result<()> {
        let script = click_script(button).ok_or_else(|| self.unsupported(Capability::Click))?;
        self.run_script(&script).await.map(drop)
    }

    async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> Result<()> {
        let script = press_keys_script(chord, target_app)
            .ok_or_else(|| DriverError::InvalidInput("empty key sequence".into()))?;
        self.run_script(&script).await.map(drop)
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.run_script(&type_text_script(text)).await.map(drop)
    }

    async fn open_url(&self, url: &str, browser: Option<&str>, profile: Option<&str>) -> Result<()> {
        // A profile can only be passed as a launch argument.
        if profile.is_some() {
            return Err(self.unsupported(Capability::OpenUrl));
        }
        self.run_script(&open_url_script(url, browser)).await.map(drop)
    }

    async fn system(&self, op: &SystemOp) -> Result<()> {
        let script = system_script(op).ok_or_else(|| self.unsupported(Capability::System))?;
        self.run_script(&script).await.map(drop)
    }

    async fn pointer_position(&self) -> Result<Option<(i32, i32)>> {
        let out = self.run_script(POINTER_POSITION_SCRIPT).await?;
        Ok(parse_position(&out))
    }
}

// ---------------------------------------------------------------------------
// Script synthesis
// ---------------------------------------------------------------------------

const POINTER_POSITION_SCRIPT: &str = "tell application \"System Events\" to return position of mouse";

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_script_string(value))
}

pub fn activate_script(app: &str) -> String {
    format!("tell application {} to activate", quoted(app))
}

/// Activate `app` and ask it to reopen, which creates a window when none is
/// open.
pub fn new_window_script(app: &str) -> String {
    format!(
        "tell application {}\n  reopen\n  activate\nend tell",
        quoted(app)
    )
}

pub fn move_mouse_script(x: i32, y: i32) -> String {
    format!(
        "tell application \"System Events\"\n  set the position of the mouse to {{{x}, {y}}}\nend tell"
    )
}

/// Only the primary button can be clicked from the bridge.
pub fn click_script(button: MouseButton) -> Option<String> {
    match button {
        MouseButton::Left => Some(
            "tell application \"System Events\"\n  click at the position of the mouse\nend tell"
                .to_string(),
        ),
        MouseButton::Right | MouseButton::Middle => None,
    }
}

pub fn press_keys_script(chord: &KeyChord, target_app: Option<&str>) -> Option<String> {
    let statement = chord.keystroke_statement()?;
    let mut script = String::new();
    if let Some(app) = target_app {
        script.push_str(&activate_script(app));
        script.push_str("\ndelay 0.5\n");
    }
    script.push_str(&format!("tell application \"System Events\"\n  {statement}\nend tell"));
    Some(script)
}

pub fn type_text_script(text: &str) -> String {
    format!(
        "tell application \"System Events\"\n  keystroke {}\nend tell",
        quoted(text)
    )
}

pub fn open_url_script(url: &str, browser: Option<&str>) -> String {
    match browser {
        Some(browser) => format!(
            "tell application {}\n  activate\n  open location {}\nend tell",
            quoted(browser),
            quoted(url)
        ),
        None => format!("open location {}", quoted(url)),
    }
}

/// Appearance and audio operations; screenshots are left to the spawn tier.
pub fn system_script(op: &SystemOp) -> Option<String> {
    match op {
        SystemOp::SetDarkMode { enabled } => Some(format!(
            "tell application \"System Events\"\n  tell appearance preferences\n    set dark mode to {enabled}\n  end tell\nend tell"
        )),
        SystemOp::SetMuted { muted } => Some(format!("set volume output muted {muted}")),
        SystemOp::AdjustVolume { delta } => Some(format!(
            "set current to output volume of (get volume settings)\nset volume output volume (current + ({delta}))"
        )),
        SystemOp::Screenshot { .. } => None,
    }
}

/// Parse the bridge's `"x, y"` position reply.
pub fn parse_position(raw: &str) -> Option<(i32, i32)> {
    let (x, y) = raw.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
