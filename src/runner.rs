//! [`CommandRunner`] backed by `tokio::process`.
//!
//! Processes are awaited on the calling task, so on a current-thread runtime
//! nothing here ever blocks the control thread or spawns an OS thread.

use crate::traits::{CommandOutput, CommandRunner, MIN_TIMEOUT};
use log::{debug, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn build(argv: &[String]) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());
    Some(cmd)
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String], timeout: Duration) -> CommandOutput {
        let Some(mut cmd) = build(argv) else {
            return CommandOutput::failure("empty command");
        };
        let timeout = timeout.max(MIN_TIMEOUT);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("run {:?} (timeout {:?})", argv, timeout);
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("failed to spawn {}: {}", argv[0], e);
                return CommandOutput::failure(e.to_string());
            }
        };

        // Dropping the output future on timeout drops the child, and
        // `kill_on_drop` terminates it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => {
                warn!("{:?} timed out after {:?}", argv, timeout);
                CommandOutput::timed_out()
            }
            Ok(Err(e)) => {
                warn!("failed waiting for {}: {}", argv[0], e);
                CommandOutput::failure(e.to_string())
            }
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    ok: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                if !result.ok {
                    debug!("{:?} exited with {}", argv, output.status);
                }
                result
            }
        }
    }

    fn launch(&self, argv: &[String]) -> bool {
        let Some(mut cmd) = build(argv) else {
            return false;
        };
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        match cmd.spawn() {
            Ok(_child) => {
                debug!("launched {:?}", argv);
                true
            }
            Err(e) => {
                warn!("failed to launch {}: {}", argv[0], e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let out = ProcessRunner
            .run(&argv(&["sh", "-c", "echo hello"]), Duration::from_secs(5))
            .await;
        assert!(out.ok);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_partial_output() {
        let out = ProcessRunner
            .run(
                &argv(&["sh", "-c", "echo partial; echo oops >&2; exit 3"]),
                Duration::from_secs(5),
            )
            .await;
        assert!(!out.ok);
        assert_eq!(out.stdout.trim(), "partial");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn missing_binary_fails_without_panicking() {
        let out = ProcessRunner
            .run(
                &argv(&["/nonexistent/ddc-switcher-test-binary"]),
                Duration::from_secs(1),
            )
            .await;
        assert!(!out.ok);
        assert!(!out.is_timeout());
    }

    #[tokio::test]
    async fn slow_process_times_out() {
        let started = std::time::Instant::now();
        let out = ProcessRunner
            .run(&argv(&["sleep", "5"]), Duration::from_millis(200))
            .await;
        assert!(out.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn tiny_timeout_is_clamped() {
        let started = std::time::Instant::now();
        let out = ProcessRunner
            .run(&argv(&["sleep", "2"]), Duration::from_millis(1))
            .await;
        assert!(out.is_timeout());
        assert!(started.elapsed() >= MIN_TIMEOUT);
    }

    #[tokio::test]
    async fn empty_argv_is_a_failure() {
        assert!(!ProcessRunner.run(&[], Duration::from_secs(1)).await.ok);
        assert!(!ProcessRunner.launch(&[]));
    }

    #[tokio::test]
    async fn launch_reports_spawn_result() {
        assert!(ProcessRunner.launch(&argv(&["true"])));
        assert!(!ProcessRunner.launch(&argv(&["/nonexistent/ddc-switcher-test-binary"])));
    }
}
