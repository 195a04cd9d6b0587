//! Driver chain configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::traits::Pause;

/// Waits applied after capability calls and between executor steps, in
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleDelays {
    /// After an application is brought to the front.
    ///
    /// Default: **1 000 ms**.
    pub activate_app_ms: u64,
    /// After a fresh application instance is spawned.
    ///
    /// Default: **2 000 ms**.
    pub new_window_ms: u64,
    /// Default: **300 ms**.
    pub move_mouse_ms: u64,
    /// Default: **500 ms**.
    pub click_ms: u64,
    /// Default: **500 ms**.
    pub press_keys_ms: u64,
    /// Default: **500 ms**.
    pub type_text_ms: u64,
    /// After a URL is handed to a browser.
    ///
    /// Default: **2 000 ms**.
    pub open_url_ms: u64,
    /// Default: **0 ms**.
    pub system_ms: u64,
    /// Default: **1 000 ms**.
    pub between_actions_ms: u64,
    /// Default: **2 000 ms**.
    pub between_urls_ms: u64,
    /// Default: **1 000 ms**.
    pub message_step_ms: u64,
    /// Default: **100 ms**.
    pub double_click_gap_ms: u64,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            activate_app_ms: 1000,
            new_window_ms: 2000,
            move_mouse_ms: 300,
            click_ms: 500,
            press_keys_ms: 500,
            type_text_ms: 500,
            open_url_ms: 2000,
            system_ms: 0,
            between_actions_ms: 1000,
            between_urls_ms: 2000,
            message_step_ms: 1000,
            double_click_gap_ms: 100,
        }
    }
}

impl SettleDelays {
    /// Every delay set to zero; used by tests and dry runs.
    pub fn none() -> Self {
        Self {
            activate_app_ms: 0,
            new_window_ms: 0,
            move_mouse_ms: 0,
            click_ms: 0,
            press_keys_ms: 0,
            type_text_ms: 0,
            open_url_ms: 0,
            system_ms: 0,
            between_actions_ms: 0,
            between_urls_ms: 0,
            message_step_ms: 0,
            double_click_gap_ms: 0,
        }
    }

    /// Settle time after a successful call of `capability`.
    pub fn after(&self, capability: Capability) -> Duration {
        let ms = match capability {
            Capability::ActivateApp => self.activate_app_ms,
            Capability::NewWindow => self.new_window_ms,
            Capability::MoveMouse => self.move_mouse_ms,
            Capability::Click => self.click_ms,
            Capability::PressKeys => self.press_keys_ms,
            Capability::TypeText => self.type_text_ms,
            Capability::OpenUrl => self.open_url_ms,
            Capability::System => self.system_ms,
        };
        Duration::from_millis(ms)
    }

    /// Duration of a named executor pause.
    pub fn pause(&self, pause: Pause) -> Duration {
        let ms = match pause {
            Pause::BetweenActions => self.between_actions_ms,
            Pause::BetweenUrls => self.between_urls_ms,
            Pause::MessageStep => self.message_step_ms,
            Pause::DoubleClickGap => self.double_click_gap_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Configuration for [`DriverChain`](crate::DriverChain) and its tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Put the structured input tier first when the crate is built with
    /// the `native-input` feature.
    ///
    /// Default: **true**.
    pub native_input: bool,

    /// Read the pointer position back after each move and log it.
    ///
    /// Default: **false**.
    pub verify_pointer: bool,

    /// Script bridge interpreter.
    ///
    /// Default: **`osascript`**.
    pub script_program: String,

    /// Generic "open" primitive for apps and URLs.
    ///
    /// Default: **`open`**.
    pub open_program: String,

    /// Secondary scripting runtime used for pointer warps.
    ///
    /// Default: **`python3`**.
    pub python_program: String,

    /// Default: **`screencapture`**.
    pub screenshot_program: String,

    pub settle: SettleDelays,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            native_input: true,
            verify_pointer: false,
            script_program: "osascript".into(),
            open_program: "open".into(),
            python_program: "python3".into(),
            screenshot_program: "screencapture".into(),
            settle: SettleDelays::default(),
        }
    }
}

impl DriverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the structured input tier.
    pub fn with_native_input(mut self, enabled: bool) -> Self {
        self.native_input = enabled;
        self
    }

    /// Enable or disable pointer read-back logging.
    pub fn with_verify_pointer(mut self, enabled: bool) -> Self {
        self.verify_pointer = enabled;
        self
    }

    /// Replace every settle delay.
    pub fn with_settle(mut self, settle: SettleDelays) -> Self {
        self.settle = settle;
        self
    }

    /// Set the script bridge interpreter.
    pub fn with_script_program(mut self, program: impl Into<String>) -> Self {
        self.script_program = program.into();
        self
    }

    /// Set the program used to open apps and URLs.
    pub fn with_open_program(mut self, program: impl Into<String>) -> Self {
        self.open_program = program.into();
        self
    }

    pub fn with_python_program(mut self, program: impl Into<String>) -> Self {
        self.python_program = program.into();
        self
    }

    pub fn with_screenshot_program(mut self, program: impl Into<String>) -> Self {
        self.screenshot_program = program.into();
        self
    }
}
