//! Invocation of matched commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use deskpilot_driver::{AutomationBackend, MouseButton, Pause, SystemOp};

use crate::apps::canonical_app_name;
use crate::commands::{CommandAction, CommandDescriptor, Operation, PointerKind, RoutineStep};

/// Volume change applied by the volume operations, in percentage points.
const VOLUME_STEP: i8 = 10;

/// Result of invoking a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    fn from_bool(ok: bool, success: &str, failure: &str) -> Self {
        if ok {
            Self::ok(success)
        } else {
            Self::failed(failure)
        }
    }
}

/// `$HOME/Desktop`, or the working directory when `HOME` is unset.
pub fn default_screenshot_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Desktop"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Runs [`CommandDescriptor`] actions against a backend.
pub struct CommandInvoker {
    backend: Arc<dyn AutomationBackend>,
    screenshot_dir: PathBuf,
}

impl CommandInvoker {
    pub fn new(backend: Arc<dyn AutomationBackend>, screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            screenshot_dir: screenshot_dir.into(),
        }
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    /// Perform `descriptor`.  `params` may carry overrides (`{"app": ...}`
    /// for [`Operation::OpenApp`]).
    pub async fn invoke(&self, descriptor: &CommandDescriptor, params: &Value) -> CommandOutcome {
        let outcome = match &descriptor.action {
            CommandAction::Pointer { pointer, x, y } => self.pointer(*pointer, *x, *y).await,
            CommandAction::Routine { steps } => self.routine(&descriptor.description, steps).await,
            CommandAction::Operation(op) => self.operation(op, params).await,
        };

        if outcome.success {
            info!(command = %descriptor.description, message = %outcome.message, "command invoked");
        } else {
            warn!(command = %descriptor.description, message = %outcome.message, "command failed");
        }
        outcome
    }

    async fn pointer(&self, kind: PointerKind, x: i32, y: i32) -> CommandOutcome {
        if !self.backend.move_mouse(x, y).await {
            return CommandOutcome::failed(format!("Failed to move pointer to ({x}, {y})"));
        }
        let clicked = match kind {
            PointerKind::Click => self.backend.click(MouseButton::Left).await,
            PointerKind::DoubleClick => {
                if self.backend.click(MouseButton::Left).await {
                    self.backend.pause(Pause::DoubleClickGap).await;
                    self.backend.click(MouseButton::Left).await
                } else {
                    false
                }
            }
            PointerKind::RightClick => self.backend.click(MouseButton::Right).await,
        };
        let past = match kind {
            PointerKind::Click => "Clicked",
            PointerKind::DoubleClick => "Double clicked",
            PointerKind::RightClick => "Right clicked",
        };
        if clicked {
            CommandOutcome::ok(format!("{past} at specified coordinates"))
        } else {
            CommandOutcome::failed(format!("Failed to {kind} at ({x}, {y})"))
        }
    }

    async fn routine(&self, description: &str, steps: &[RoutineStep]) -> CommandOutcome {
        for (i, step) in steps.iter().enumerate() {
            let ok = match step {
                RoutineStep::Press(chord) => self.backend.press_keys(chord, None).await,
                RoutineStep::Type(text) => self.backend.type_text(text).await,
                RoutineStep::System(op) => self.backend.system(op).await,
            };
            if !ok {
                return CommandOutcome::failed(format!("{description}: step {} failed", i + 1));
            }
        }
        CommandOutcome::ok(description)
    }

    async fn operation(&self, op: &Operation, params: &Value) -> CommandOutcome {
        match op {
            Operation::SwitchToDarkMode => CommandOutcome::from_bool(
                self.backend.system(&SystemOp::SetDarkMode { enabled: true }).await,
                "Switched to dark mode",
                "Failed to switch to dark mode",
            ),
            Operation::SwitchToLightMode => CommandOutcome::from_bool(
                self.backend.system(&SystemOp::SetDarkMode { enabled: false }).await,
                "Switched to light mode",
                "Failed to switch to light mode",
            ),
            Operation::TakeScreenshot => {
                let file = format!(
                    "screenshot_{}.png",
                    chrono::Local::now().format("%Y-%m-%dT%H-%M-%S")
                );
                let path = self.screenshot_dir.join(&file);
                if self.backend.system(&SystemOp::Screenshot { path }).await {
                    CommandOutcome::ok(format!(
                        "Screenshot saved to {} as {file}",
                        self.screenshot_dir.display()
                    ))
                } else {
                    CommandOutcome::failed("Failed to take screenshot")
                }
            }
            Operation::OpenApp { app } => {
                let app = params
                    .get("app")
                    .and_then(Value::as_str)
                    .map_or_else(|| canonical_app_name(app), canonical_app_name);
                if self.backend.activate_app(&app).await {
                    CommandOutcome::ok(format!("Opened {app}"))
                } else {
                    CommandOutcome::failed(format!("Failed to open {app}"))
                }
            }
            Operation::MuteAudio => CommandOutcome::from_bool(
                self.backend.system(&SystemOp::SetMuted { muted: true }).await,
                "Audio muted",
                "Failed to mute audio",
            ),
            Operation::UnmuteAudio => CommandOutcome::from_bool(
                self.backend.system(&SystemOp::SetMuted { muted: false }).await,
                "Audio unmuted",
                "Failed to unmute audio",
            ),
            Operation::VolumeUp => CommandOutcome::from_bool(
                self.backend
                    .system(&SystemOp::AdjustVolume { delta: VOLUME_STEP })
                    .await,
                "Volume increased",
                "Failed to increase volume",
            ),
            Operation::VolumeDown => CommandOutcome::from_bool(
                self.backend
                    .system(&SystemOp::AdjustVolume { delta: -VOLUME_STEP })
                    .await,
                "Volume decreased",
                "Failed to decrease volume",
            ),
        }
    }
}
