//! Built-in command catalogue.
//!
//! Descriptors are registered once, in a fixed order, and never mutated.
//! Registration order matters: the matcher resolves exact and substring
//! hits to the earliest descriptor carrying the trigger.

use serde::Serialize;

use deskpilot_driver::{KeyChord, SystemOp};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named operation implemented by the invoker rather than a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "operation")]
pub enum Operation {
    SwitchToDarkMode,
    SwitchToLightMode,
    TakeScreenshot,
    /// Activate `app`; a caller-supplied `app` parameter overrides it.
    OpenApp { app: String },
    MuteAudio,
    UnmuteAudio,
    VolumeUp,
    VolumeDown,
}

/// One step of an inline routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "step", content = "value")]
pub enum RoutineStep {
    Press(KeyChord),
    Type(String),
    System(SystemOp),
}

/// Pointer gesture of a [`CommandAction::Pointer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    Click,
    DoubleClick,
    RightClick,
}

impl PointerKind {
    /// Parse the verb of a pointer phrase (`double-click`, `right click`).
    pub fn from_verb(verb: &str) -> Option<Self> {
        let compact: String = verb
            .chars()
            .filter(|c| !matches!(c, '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match compact.as_str() {
            "click" => Some(Self::Click),
            "doubleclick" => Some(Self::DoubleClick),
            "rightclick" => Some(Self::RightClick),
            _ => None,
        }
    }
}

impl std::fmt::Display for PointerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::DoubleClick => write!(f, "double click"),
            Self::RightClick => write!(f, "right click"),
        }
    }
}

/// What a matched command does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CommandAction {
    Operation(Operation),
    Routine { steps: Vec<RoutineStep> },
    Pointer { pointer: PointerKind, x: i32, y: i32 },
}

/// A registered command: trigger phrases plus the action they map to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    /// Lowercase phrases.
    pub triggers: Vec<String>,
    pub action: CommandAction,
    pub description: String,
}

impl CommandDescriptor {
    pub fn new(triggers: &[&str], action: CommandAction, description: &str) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            action,
            description: description.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

fn press(keys: &str) -> RoutineStep {
    RoutineStep::Press(KeyChord::parse(keys.split('+')))
}

fn typed(text: &str) -> RoutineStep {
    RoutineStep::Type(text.to_string())
}

fn routine(steps: Vec<RoutineStep>) -> CommandAction {
    CommandAction::Routine { steps }
}

fn click_at(x: i32, y: i32) -> CommandAction {
    CommandAction::Pointer {
        pointer: PointerKind::Click,
        x,
        y,
    }
}

/// Spotlight search for `query`, then confirm.
fn spotlight(query: &str) -> Vec<RoutineStep> {
    vec![press("cmd+space"), typed(query), press("return")]
}

fn spotlight_then(query: &str, follow_up: &str) -> CommandAction {
    let mut steps = spotlight(query);
    steps.push(typed(follow_up));
    steps.push(press("return"));
    routine(steps)
}

/// Every built-in command in registration order.
pub fn builtin_commands() -> Vec<CommandDescriptor> {
    use CommandDescriptor as C;

    vec![
        // Pointer corners.
        C::new(
            &["click center", "click middle", "click in middle"],
            click_at(960, 540),
            "Click in the center of the screen",
        ),
        C::new(
            &["click top left", "click upper left"],
            click_at(100, 100),
            "Click in the top left corner",
        ),
        C::new(
            &["click top right", "click upper right"],
            click_at(1820, 100),
            "Click in the top right corner",
        ),
        C::new(
            &["click bottom left", "click lower left"],
            click_at(100, 980),
            "Click in the bottom left corner",
        ),
        C::new(
            &["click bottom right", "click lower right"],
            click_at(1820, 980),
            "Click in the bottom right corner",
        ),
        // Appearance routines.
        C::new(
            &["switch to dark mode", "dark mode", "enable dark mode"],
            spotlight_then("System Settings", "dark mode"),
            "Switch to dark mode",
        ),
        C::new(
            &["switch to light mode", "light mode", "enable light mode"],
            spotlight_then("System Settings", "light mode"),
            "Switch to light mode",
        ),
        // Timers.
        C::new(
            &["start pomodoro", "pomodoro timer", "focus timer"],
            spotlight_then("Timer", "25"),
            "Start a 25-minute Pomodoro timer",
        ),
        C::new(
            &["take a break", "start break", "break timer"],
            spotlight_then("Timer", "5"),
            "Start a 5-minute break timer",
        ),
        // Screenshots.
        C::new(
            &["screenshot", "take screenshot", "capture screen"],
            routine(vec![press("shift+cmd+4")]),
            "Take a screenshot of selected area",
        ),
        C::new(
            &["full screenshot", "capture full screen"],
            routine(vec![press("shift+cmd+3")]),
            "Take a screenshot of entire screen",
        ),
        // Launchers.
        C::new(
            &["open notes", "show notes", "start notes"],
            routine(spotlight("Notes")),
            "Open Notes app",
        ),
        C::new(
            &["open calendar", "show calendar", "check calendar"],
            routine(spotlight("Calendar")),
            "Open Calendar app",
        ),
        C::new(
            &["open reminders", "show reminders", "check reminders"],
            routine(spotlight("Reminders")),
            "Open Reminders app",
        ),
        // Session.
        C::new(
            &["lock screen", "lock computer"],
            routine(vec![press("ctrl+cmd+q")]),
            "Lock the screen",
        ),
        C::new(
            &["show desktop", "hide windows"],
            routine(vec![press("f11")]),
            "Show desktop",
        ),
        // Media keys (F7-F9 on Apple keyboards).
        C::new(
            &["play music", "start music"],
            routine(vec![press("f8")]),
            "Play music",
        ),
        C::new(
            &["pause music", "stop music"],
            routine(vec![press("f8")]),
            "Pause music",
        ),
        C::new(
            &["next song", "next track"],
            routine(vec![press("f9")]),
            "Play next track",
        ),
        C::new(
            &["previous song", "previous track"],
            routine(vec![press("f7")]),
            "Play previous track",
        ),
        // Volume.
        C::new(
            &["volume up", "increase volume", "louder"],
            routine(vec![RoutineStep::System(SystemOp::AdjustVolume { delta: 10 })]),
            "Increase volume",
        ),
        C::new(
            &["volume down", "decrease volume", "quieter"],
            routine(vec![RoutineStep::System(SystemOp::AdjustVolume { delta: -10 })]),
            "Decrease volume",
        ),
        C::new(
            &["mute", "mute audio"],
            routine(vec![RoutineStep::System(SystemOp::SetMuted { muted: true })]),
            "Mute audio",
        ),
        // Operation references.
        C::new(
            &["switch to dark mode", "enable dark mode", "dark mode on"],
            CommandAction::Operation(Operation::SwitchToDarkMode),
            "Switch to dark mode",
        ),
        C::new(
            &["switch to light mode", "enable light mode", "light mode on"],
            CommandAction::Operation(Operation::SwitchToLightMode),
            "Switch to light mode",
        ),
        C::new(
            &["take a screenshot", "capture screen", "screenshot"],
            CommandAction::Operation(Operation::TakeScreenshot),
            "Take a screenshot",
        ),
        C::new(
            &["open chrome", "launch chrome", "start chrome"],
            CommandAction::Operation(Operation::OpenApp {
                app: "Google Chrome".into(),
            }),
            "Open Google Chrome",
        ),
        C::new(
            &["open vscode", "launch vscode", "start vscode"],
            CommandAction::Operation(Operation::OpenApp {
                app: "Visual Studio Code".into(),
            }),
            "Open VS Code",
        ),
        C::new(
            &["mute", "mute audio", "mute sound"],
            CommandAction::Operation(Operation::MuteAudio),
            "Mute audio",
        ),
        C::new(
            &["unmute", "unmute audio", "unmute sound"],
            CommandAction::Operation(Operation::UnmuteAudio),
            "Unmute audio",
        ),
        C::new(
            &["volume up", "increase volume", "louder"],
            CommandAction::Operation(Operation::VolumeUp),
            "Increase volume",
        ),
        C::new(
            &["volume down", "decrease volume", "quieter"],
            CommandAction::Operation(Operation::VolumeDown),
            "Decrease volume",
        ),
    ]
}
