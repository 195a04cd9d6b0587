//! Process-spawn fallback tier.
//!
//! Uses the generic `open` primitive for applications and URLs, a Python
//! Quartz one-liner for pointer warps and clicks, and `screencapture` for
//! screenshots.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::capability::{Capability, MouseButton, SystemOp};
use crate::error::Result;
use crate::runner::CommandRunner;
use crate::traits::Driver;

/// Program names used by [`SpawnDriver`].
#[derive(Debug, Clone)]
pub struct SpawnPrograms {
    pub open: String,
    pub python: String,
    pub screenshot: String,
}

/// Driver that spawns helper processes.
pub struct SpawnDriver {
    runner: Arc<dyn CommandRunner>,
    programs: SpawnPrograms,
}

impl SpawnDriver {
    pub fn new(runner: Arc<dyn CommandRunner>, programs: SpawnPrograms) -> Self {
        Self { runner, programs }
    }

    async fn open(&self, args: Vec<String>) -> Result<()> {
        self.runner.run(&self.programs.open, &args).await.map(drop)
    }

    async fn python(&self, code: String) -> Result<()> {
        self.runner
            .run(&self.programs.python, &["-c".to_string(), code])
            .await
            .map(drop)
    }
}

#[async_trait]
impl Driver for SpawnDriver {
    fn id(&self) -> &str {
        "spawn"
    }

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::PressKeys | Capability::TypeText)
    }

    async fn is_available(&self) -> bool {
        self.runner.has_program(&self.programs.open)
            || self.runner.has_program(&self.programs.python)
    }

    async fn activate_app(&self, name: &str) -> Result<()> {
        self.open(open_app_args(name, false)).await
    }

    async fn new_window(&self, name: &str) -> Result<()> {
        self.open(open_app_args(name, true)).await
    }

    async fn move_mouse(&self, x: i32, y: i32) -> Result<()> {
        self.python(warp_pointer_code(x, y)).await
    }

    async fn click(&self, button: MouseButton) -> Result<()> {
        self.python(click_code(button)).await
    }

    async fn open_url(&self, url: &str, browser: Option<&str>, profile: Option<&str>) -> Result<()> {
        let Some(browser) = browser else {
            return self.open(vec![url.to_string()]).await;
        };
        match self.open(open_url_args(url, browser, profile)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(browser = browser, error = %e, "browser launch failed, using default handler");
                self.open(vec![url.to_string()]).await
            }
        }
    }

    async fn system(&self, op: &SystemOp) -> Result<()> {
        match op {
            SystemOp::Screenshot { path } => {
                debug!(path = %path.display(), "capturing screen");
                self.runner
                    .run(&self.programs.screenshot, &screenshot_args(path))
                    .await
                    .map(drop)
            }
            _ => Err(self.unsupported(Capability::System)),
        }
    }
}

// ---------------------------------------------------------------------------
// Argument construction
// ---------------------------------------------------------------------------

pub fn open_app_args(app: &str, new_instance: bool) -> Vec<String> {
    let mut args = Vec::with_capacity(3);
    if new_instance {
        args.push("-n".to_string());
    }
    args.push("-a".to_string());
    args.push(app.to_string());
    args
}

/// `-a <browser> [--args --profile-directory=<p>] <url>`
pub fn open_url_args(url: &str, browser: &str, profile: Option<&str>) -> Vec<String> {
    let mut args = vec!["-a".to_string(), browser.to_string()];
    if let Some(profile) = profile {
        args.push("--args".to_string());
        args.push(format!("--profile-directory={profile}"));
    }
    args.push(url.to_string());
    args
}

pub fn screenshot_args(path: &Path) -> Vec<String> {
    vec!["-x".to_string(), path.display().to_string()]
}

pub fn warp_pointer_code(x: i32, y: i32) -> String {
    format!("import Quartz; Quartz.CGWarpMouseCursorPosition(({x}, {y}))")
}

/// Post a down/up pair at the current pointer location.
pub fn click_code(button: MouseButton) -> String {
    let (down, up, id) = match button {
        MouseButton::Left => ("kCGEventLeftMouseDown", "kCGEventLeftMouseUp", "kCGMouseButtonLeft"),
        MouseButton::Right => (
            "kCGEventRightMouseDown",
            "kCGEventRightMouseUp",
            "kCGMouseButtonRight",
        ),
        MouseButton::Middle => (
            "kCGEventOtherMouseDown",
            "kCGEventOtherMouseUp",
            "kCGMouseButtonCenter",
        ),
    };
    format!(
        "import Quartz\n\
         pos = Quartz.CGEventGetLocation(Quartz.CGEventCreate(None))\n\
         for kind in (Quartz.{down}, Quartz.{up}):\n    \
         Quartz.CGEventPost(Quartz.kCGHIDEventTap, Quartz.CGEventCreateMouseEvent(None, kind, pos, Quartz.{id}))\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_app_arguments() {
        assert_eq!(open_app_args("Notes", false), vec!["-a", "Notes"]);
        assert_eq!(open_app_args("Notes", true), vec!["-n", "-a", "Notes"]);
    }

    #[test]
    fn open_url_with_profile() {
        assert_eq!(
            open_url_args("https://mail.google.com", "Google Chrome", Some("Profile 2")),
            vec![
                "-a",
                "Google Chrome",
                "--args",
                "--profile-directory=Profile 2",
                "https://mail.google.com"
            ]
        );
        assert_eq!(
            open_url_args("https://github.com", "Safari", None),
            vec!["-a", "Safari", "https://github.com"]
        );
    }

    #[test]
    fn click_code_selects_button() {
        let code = click_code(MouseButton::Right);
        assert!(code.contains("kCGEventRightMouseDown"));
        assert!(code.contains("kCGMouseButtonRight"));
        assert!(code.contains("\n    Quartz.CGEventPost"));
    }

    #[test]
    fn screenshot_is_silent() {
        assert_eq!(
            screenshot_args(Path::new("/tmp/shot.png")),
            vec!["-x", "/tmp/shot.png"]
        );
    }
}
