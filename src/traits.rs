//! Seams between the reconciliation core and the outside world.
//!
//! The core never spawns a process or touches a settings backend directly.
//! It goes through [`CommandRunner`] and [`SettingsStore`], so the switcher
//! can be driven by real `ddcutil` and a JSON file in production, or by
//! recording test doubles in unit tests.

use std::collections::BTreeMap;
use std::time::Duration;

/// Shortest timeout a caller may request; smaller values are raised to it.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Captured result of one external command.
///
/// There is no error variant: every failure (spawn error, non-zero exit,
/// timeout) is folded into `ok = false` with whatever output was captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub ok: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            ok: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            ok: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::failure("timeout")
    }

    pub fn is_timeout(&self) -> bool {
        !self.ok && self.stderr == "timeout"
    }
}

/// Executes external commands.
///
/// # Contract
///
/// * [`run`](CommandRunner::run) suspends the caller until the process exits
///   or `timeout` elapses, whichever comes first.  A timed-out process is
///   killed and the result is [`CommandOutput::timed_out`].
/// * [`launch`](CommandRunner::launch) starts a process and returns at once
///   without waiting for it.  It reports only whether the spawn succeeded.
/// * Neither method retries or panics.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `argv` to completion, capturing stdout and stderr.
    async fn run(&self, argv: &[String], timeout: Duration) -> CommandOutput;

    /// Start `argv` without waiting for it (fire-and-forget).
    fn launch(&self, argv: &[String]) -> bool;
}

/// String-keyed settings backend with GSettings-like primitives.
///
/// Implementations perform no merging of their own; every setter replaces
/// the value stored under `key` wholesale.
pub trait SettingsStore {
    /// The error type produced by this store.
    type Error: std::error::Error + Send + 'static;

    /// Read a list of opaque strings.  A missing key reads as empty.
    fn string_list(&self, key: &str) -> Result<Vec<String>, Self::Error>;

    /// Replace the list stored under `key`.
    fn set_string_list(&self, key: &str, value: &[String]) -> Result<(), Self::Error>;

    /// Read a string-to-string map.  A missing key reads as empty.
    fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>, Self::Error>;

    /// Replace the map stored under `key`.
    fn set_string_map(&self, key: &str, value: &BTreeMap<String, String>)
        -> Result<(), Self::Error>;
}
