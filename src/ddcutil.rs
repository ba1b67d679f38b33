//! Talking to `ddcutil`: argument vectors and output parsing.
//!
//! Three invocations are used:
//!
//! | Purpose | argv (after `binary` and `extra_args`) |
//! |---------|----------------------------------------|
//! | probe   | `detect`, falling back to `detect --terse` |
//! | query   | `-d <id> getvcp 60` |
//! | switch  | `-d <id> setvcp 60 <code>` (or without `-d <id>`) |
//!
//! Parsing never fails: unexpected output yields an empty or partial result.

use crate::config::DdcutilConfig;
use crate::monitor::{InputCode, MonitorDescriptor};
use crate::traits::CommandRunner;
use log::{debug, info, warn};
use regex::Regex;
use std::sync::LazyLock;

/// VCP feature code for input source select.
pub const VCP_INPUT_SOURCE: &str = "60";

static DISPLAY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Display\s+(\d+)\s*$").expect("valid regex"));
static MODEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Model:\s*(.*?)\s*$").expect("valid regex"));
static SERIAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:Serial number|SN):\s*(.*?)\s*$").expect("valid regex")
});
static CURRENT_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"current value\s*=\s*(0[xX][0-9A-Fa-f]+|\d+)").expect("valid regex")
});
static SL_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsl\s*=\s*(0[xX][0-9A-Fa-f]+|\d+)").expect("valid regex"));

fn base_argv(cfg: &DdcutilConfig) -> Vec<String> {
    let mut argv = Vec::with_capacity(cfg.extra_args.len() + 6);
    argv.push(cfg.binary.clone());
    argv.extend(cfg.extra_args.iter().cloned());
    argv
}

pub fn detect_argv(cfg: &DdcutilConfig, terse: bool) -> Vec<String> {
    let mut argv = base_argv(cfg);
    argv.push("detect".into());
    if terse {
        argv.push("--terse".into());
    }
    argv
}

pub fn query_argv(cfg: &DdcutilConfig, id: u32) -> Vec<String> {
    let mut argv = base_argv(cfg);
    argv.extend(["-d".into(), id.to_string(), "getvcp".into(), VCP_INPUT_SOURCE.into()]);
    argv
}

/// `display` of `None` addresses whatever display `ddcutil` picks by default.
pub fn switch_argv(cfg: &DdcutilConfig, display: Option<u32>, code: InputCode) -> Vec<String> {
    let mut argv = base_argv(cfg);
    if let Some(id) = display {
        argv.extend(["-d".into(), id.to_string()]);
    }
    argv.extend(["setvcp".into(), VCP_INPUT_SOURCE.into(), code.to_string()]);
    argv
}

/// Accumulates descriptors, enforcing one descriptor per display number.
#[derive(Default)]
struct DescriptorList {
    done: Vec<MonitorDescriptor>,
    open: Option<MonitorDescriptor>,
}

impl DescriptorList {
    fn start(&mut self, id: u32) {
        self.flush();
        self.open = Some(MonitorDescriptor::new(id));
    }

    fn flush(&mut self) {
        if let Some(d) = self.open.take() {
            if self.done.iter().any(|seen| seen.id == d.id) {
                debug!("ignoring repeated block for display {}", d.id);
            } else {
                self.done.push(d);
            }
        }
    }

    fn finish(mut self) -> Vec<MonitorDescriptor> {
        self.flush();
        self.done
    }
}

fn display_id(line: &str) -> Option<u32> {
    DISPLAY_LINE
        .captures(line)
        .and_then(|c| c[1].parse().ok())
}

fn captured_text(re: &Regex, line: &str) -> Option<String> {
    let caps = re.captures(line)?;
    let text = caps[1].trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse verbose `ddcutil detect` output.
///
/// A `Display <N>` line opens a block; the first non-empty `Model:` and
/// `Serial number:` / `SN:` lines inside it fill in the descriptor.  Lines
/// outside any block (and `Invalid display` blocks) are ignored.
pub fn parse_detect(text: &str) -> Vec<MonitorDescriptor> {
    let mut list = DescriptorList::default();
    for line in text.lines() {
        if let Some(id) = display_id(line) {
            list.start(id);
            continue;
        }
        // Any other unindented line ends the current block.
        if !line.is_empty() && !line.starts_with(char::is_whitespace) {
            list.flush();
            continue;
        }
        let Some(current) = list.open.as_mut() else {
            continue;
        };
        if current.model.is_none() {
            if let Some(model) = captured_text(&MODEL_LINE, line) {
                current.model = Some(model);
                continue;
            }
        }
        if current.serial.is_none() {
            if let Some(serial) = captured_text(&SERIAL_LINE, line) {
                current.serial = Some(serial);
            }
        }
    }
    list.finish()
}

/// Parse `ddcutil detect --terse` output, keeping only display numbers.
pub fn parse_terse(text: &str) -> Vec<MonitorDescriptor> {
    let mut list = DescriptorList::default();
    for id in text.lines().filter_map(display_id) {
        list.start(id);
    }
    list.finish()
}

/// Extract the active input from `getvcp 60` output.
///
/// Looks for `current value = <n>` first, then the `sl=<n>` byte that
/// `ddcutil` prints for non-continuous features.
pub fn parse_input_value(text: &str) -> Option<InputCode> {
    let raw = CURRENT_VALUE
        .captures(text)
        .or_else(|| SL_VALUE.captures(text))?;
    InputCode::parse(&raw[1])
}

/// Enumerate attached displays.
///
/// Failures degrade to an empty list: a failed verbose probe means no
/// monitors, a verbose probe that parses to nothing is retried in terse
/// mode.
pub async fn detect<R: CommandRunner>(runner: &R, cfg: &DdcutilConfig) -> Vec<MonitorDescriptor> {
    let out = runner.run(&detect_argv(cfg, false), cfg.detect_timeout()).await;
    if !out.ok {
        warn!("display probe failed: {}", out.stderr.trim());
        return Vec::new();
    }
    let found = parse_detect(&out.stdout);
    if !found.is_empty() {
        info!("detected {} display(s)", found.len());
        return found;
    }

    info!("verbose probe found no displays, retrying in terse mode");
    let out = runner.run(&detect_argv(cfg, true), cfg.detect_timeout()).await;
    if !out.ok {
        warn!("terse display probe failed: {}", out.stderr.trim());
        return Vec::new();
    }
    let found = parse_terse(&out.stdout);
    info!("terse probe found {} display(s)", found.len());
    found
}

/// Ask display `id` which input it is showing.  `None` on any failure.
pub async fn query_input<R: CommandRunner>(
    runner: &R,
    cfg: &DdcutilConfig,
    id: u32,
) -> Option<InputCode> {
    let out = runner.run(&query_argv(cfg, id), cfg.query_timeout()).await;
    if !out.ok {
        if out.is_timeout() {
            info!("input query for display {} timed out", id);
        } else {
            info!("input query for display {} failed: {}", id, out.stderr.trim());
        }
        return None;
    }
    let code = parse_input_value(&out.stdout);
    if code.is_none() {
        debug!("no input value in query output for display {}: {:?}", id, out.stdout);
    }
    code
}
