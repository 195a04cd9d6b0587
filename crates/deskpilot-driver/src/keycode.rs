//! Last-resort keyboard tier: every key sent by virtual key code.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::Capability;
use crate::error::{DriverError, Result};
use crate::keys::{KeyChord, MODIFIER_ONLY_KEY_CODE, key_code};
use crate::runner::CommandRunner;
use crate::script::activate_script;
use crate::traits::Driver;

/// Keyboard-only driver that avoids literal keystrokes entirely.
pub struct KeyCodeDriver {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl KeyCodeDriver {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

#[async_trait]
impl Driver for KeyCodeDriver {
    fn id(&self) -> &str {
        "keycode"
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::PressKeys
    }

    async fn is_available(&self) -> bool {
        self.runner.has_program(&self.program)
    }

    async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> Result<()> {
        let script = key_code_script(chord, target_app)?;
        self.runner
            .run(&self.program, &["-e".to_string(), script])
            .await
            .map(drop)
    }
}

/// One `key code` line per regular key, each carrying every modifier.
pub fn key_code_script(chord: &KeyChord, target_app: Option<&str>) -> Result<String> {
    if chord.is_empty() {
        return Err(DriverError::InvalidInput("empty key sequence".into()));
    }

    let modifiers = chord.modifiers();
    let using = if modifiers.is_empty() {
        String::new()
    } else {
        let clauses: Vec<&str> = modifiers.iter().map(|m| m.script_clause()).collect();
        format!(" using {{{}}}", clauses.join(", "))
    };

    let mut codes = Vec::new();
    for key in chord.regular_keys() {
        let code = key_code(key)
            .ok_or_else(|| DriverError::InvalidInput(format!("no key code for `{key}`")))?;
        codes.push(code);
    }
    if codes.is_empty() {
        codes.push(MODIFIER_ONLY_KEY_CODE);
    }

    let mut script = String::new();
    if let Some(app) = target_app {
        script.push_str(&activate_script(app));
        script.push('\n');
    }
    script.push_str("tell application \"System Events\"\n");
    for code in codes {
        script.push_str(&format!("  key code {code}{using}\n"));
    }
    script.push_str("end tell");
    Ok(script)
}
