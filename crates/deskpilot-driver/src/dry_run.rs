//! Backend that records capability calls instead of performing them.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::capability::{Capability, Invocation, MouseButton, SystemOp};
use crate::keys::KeyChord;
use crate::traits::{AutomationBackend, Pause};

/// [`AutomationBackend`] that logs each call and succeeds, unless the
/// capability was marked to fail with [`DryRunBackend::fail_on`].
#[derive(Debug, Default)]
pub struct DryRunBackend {
    calls: Mutex<Vec<String>>,
    failing: HashSet<Capability>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `capability` report failure.
    pub fn fail_on(mut self, capability: Capability) -> Self {
        self.failing.insert(capability);
        self
    }

    /// Calls recorded so far, in order (`activate_app:Google Chrome`, ...).
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: Invocation<'_>) -> bool {
        let line = call.to_string();
        let ok = !self.failing.contains(&call.capability());
        info!(call = %line, ok = ok, "dry run");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line);
        }
        ok
    }
}

#[async_trait]
impl AutomationBackend for DryRunBackend {
    async fn activate_app(&self, name: &str) -> bool {
        self.record(Invocation::ActivateApp { name })
    }

    async fn new_window(&self, name: &str) -> bool {
        self.record(Invocation::NewWindow { name })
    }

    async fn move_mouse(&self, x: i32, y: i32) -> bool {
        self.record(Invocation::MoveMouse { x, y })
    }

    async fn click(&self, button: MouseButton) -> bool {
        self.record(Invocation::Click { button })
    }

    async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> bool {
        self.record(Invocation::PressKeys { chord, target_app })
    }

    async fn type_text(&self, text: &str) -> bool {
        self.record(Invocation::TypeText { text })
    }

    async fn open_url(&self, url: &str, browser: Option<&str>, profile: Option<&str>) -> bool {
        self.record(Invocation::OpenUrl {
            url,
            browser,
            profile,
        })
    }

    async fn system(&self, op: &SystemOp) -> bool {
        self.record(Invocation::System { op })
    }

    async fn pause(&self, _pause: Pause) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let backend = DryRunBackend::new();
        assert!(backend.activate_app("Google Chrome").await);
        assert!(
            backend
                .open_url("https://meet.google.com", Some("Google Chrome"), None)
                .await
        );
        assert_eq!(
            backend.calls(),
            vec![
                "activate_app:Google Chrome",
                "open_url:https://meet.google.com@Google Chrome"
            ]
        );
    }

    #[tokio::test]
    async fn failing_capability_still_recorded() {
        let backend = DryRunBackend::new().fail_on(Capability::PressKeys);
        let chord = KeyChord::parse(["cmd", "t"]);
        assert!(!backend.press_keys(&chord, Some("Safari")).await);
        assert_eq!(backend.calls(), vec!["press_keys:command+t@Safari"]);
    }
}
