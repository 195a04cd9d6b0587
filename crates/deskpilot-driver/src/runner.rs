//! External program execution for the script and spawn tiers.
//!
//! Tiers never spawn processes directly; they go through a
//! [`CommandRunner`] so tests can substitute a recording fake.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{DriverError, Result};

/// Maximum stderr kept in a [`DriverError::CommandFailed`] (4 KB).
const MAX_STDERR_BYTES: usize = 4 * 1024;

/// Runs an external program to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, returning trimmed stdout on exit status 0.
    async fn run(&self, program: &str, args: &[String]) -> Result<String>;

    /// Whether `program` can be found on this machine.
    fn has_program(&self, program: &str) -> bool;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        debug!(program = program, argc = args.len(), "spawning");

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let status = output.status.code().unwrap_or(-1);
            let (stderr, _) = truncate_output(&output.stderr);
            debug!(program = program, status = status, "program failed");
            Err(DriverError::CommandFailed {
                program: program.to_string(),
                status,
                stderr: stderr.trim().to_string(),
            })
        }
    }

    fn has_program(&self, program: &str) -> bool {
        if program.contains(std::path::MAIN_SEPARATOR) {
            return Path::new(program).is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }
}

/// Truncate raw output to [`MAX_STDERR_BYTES`] as lossy UTF-8.
/// Returns `(output_string, was_truncated)`.
fn truncate_output(raw: &[u8]) -> (String, bool) {
    if raw.len() <= MAX_STDERR_BYTES {
        (String::from_utf8_lossy(raw).into_owned(), false)
    } else {
        let mut s = String::from_utf8_lossy(&raw[..MAX_STDERR_BYTES]).into_owned();
        s.push_str("\n... [truncated]");
        (s, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_output_short_input_not_truncated() {
        let (s, truncated) = truncate_output(b"execution error");
        assert_eq!(s, "execution error");
        assert!(!truncated);
    }

    #[test]
    fn truncate_output_large_input_is_truncated() {
        let data = vec![b'x'; MAX_STDERR_BYTES + 10];
        let (s, truncated) = truncate_output(&data);
        assert!(truncated);
        assert!(s.ends_with("[truncated]"));
    }

    #[test]
    fn missing_program_is_not_found() {
        let runner = SystemRunner::new();
        assert!(!runner.has_program("deskpilot-definitely-not-installed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_command_failed() {
        let runner = SystemRunner::new();
        let err = runner
            .run("sh", &["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .await
            .unwrap_err();
        match err {
            DriverError::CommandFailed { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_trimmed() {
        let runner = SystemRunner::new();
        let out = runner
            .run("sh", &["-c".to_string(), "echo '  hi  '".to_string()])
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }
}
