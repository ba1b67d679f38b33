//! The orchestrator that ties probing, persistence, input tracking and
//! switching together.
//!
//! [`DisplaySwitcher`] owns the in-memory monitor list and exposes every
//! intent a front end needs: list, rescan, switch one, switch all, refresh,
//! and edit per-monitor preferences.
//!
//! Switching is two-phase.  [`switch_input`](DisplaySwitcher::switch_input)
//! launches `ddcutil setvcp` without waiting and records the requested input
//! optimistically; the monitor's real state is only known after a later
//! query ([`refresh_input`](DisplaySwitcher::refresh_input) or
//! [`confirm_switch`](DisplaySwitcher::confirm_switch)).  Consumers should
//! treat the current input as eventually consistent.

use crate::config::Config;
use crate::ddcutil;
use crate::identity::{self, ResolvedMonitor};
use crate::monitor::{InputCode, Monitor, MonitorRecord, Position};
use crate::state::StateStore;
use crate::traits::{CommandRunner, SettingsStore};
use crate::tracker::InputTracker;
use futures::future::join_all;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Why a switch request was turned down without sending anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No monitor with that identity key is attached.
    UnknownMonitor,
    /// The code is not in the configured input catalogue.
    UnrecognizedInput,
    /// The monitor's usable-input list excludes the code.
    NotUsable,
}

/// What happened to one switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The command was launched and the input recorded optimistically.
    Issued,
    /// Policy turned the request down; nothing was sent or changed.
    Rejected(RejectReason),
    /// The command could not be started; nothing was changed.
    LaunchFailed,
}

/// Result of [`DisplaySwitcher::switch_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchAll {
    /// One outcome per known monitor, keyed by identity key.
    PerMonitor(Vec<(String, SwitchOutcome)>),
    /// No monitors were known, so the command went out without `-d`.
    Untargeted(SwitchOutcome),
}

/// A monitor from the latest probe.
#[derive(Debug, Clone)]
struct KnownMonitor {
    key: String,
    label_base: String,
    record: MonitorRecord,
}

/// Reconciles monitors and issues input switches.
///
/// Generic over the process runner and the settings backend so that tests
/// can drive it with recording doubles.
pub struct DisplaySwitcher<R: CommandRunner, S: SettingsStore> {
    runner: R,
    state: StateStore<S>,
    tracker: InputTracker,
    config: Config,
    monitors: RefCell<Vec<KnownMonitor>>,
}

impl<R: CommandRunner, S: SettingsStore> DisplaySwitcher<R, S> {
    /// Create a switcher with no known monitors; call
    /// [`rescan`](Self::rescan) to populate it.
    pub fn new(runner: R, store: S, config: Config) -> Self {
        Self {
            runner,
            state: StateStore::new(store),
            tracker: InputTracker::new(),
            config,
            monitors: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &StateStore<S> {
        &self.state
    }

    pub fn tracker(&self) -> &InputTracker {
        &self.tracker
    }

    /// Attached monitors, ordered by position (left, center, right, unset)
    /// and then display number.
    pub fn list_monitors(&self) -> Vec<Monitor> {
        let mut list: Vec<Monitor> = self
            .monitors
            .borrow()
            .iter()
            .map(|m| Monitor {
                key: m.key.clone(),
                label: identity::decorate(&m.label_base, m.record.position),
                record: m.record.clone(),
                current_input: self.tracker.current(&m.key),
            })
            .collect();
        list.sort_by_key(|m| (m.record.position.rank(), m.record.id));
        list
    }

    /// Find a monitor by identity key, label, or display number.
    pub fn find(&self, query: &str) -> Option<Monitor> {
        let list = self.list_monitors();
        let query = query.trim();
        let by_label = |m: &&Monitor| {
            m.label.eq_ignore_ascii_case(query)
                || self
                    .monitors
                    .borrow()
                    .iter()
                    .any(|k| k.key == m.key && k.label_base.eq_ignore_ascii_case(query))
        };
        list.iter()
            .find(|m| m.key == query)
            .or_else(|| list.iter().find(by_label))
            .or_else(|| {
                let id: u32 = query.parse().ok()?;
                list.iter().find(|m| m.record.id == id)
            })
            .cloned()
    }

    /// Probe the bus, reconcile with stored preferences and replace the
    /// in-memory monitor list.
    ///
    /// A failed probe yields an empty list; stored records are never
    /// removed.
    pub async fn rescan(&self) -> Vec<Monitor> {
        let descriptors = ddcutil::detect(&self.runner, &self.config.ddcutil).await;
        let resolved = identity::resolve(descriptors);
        let previous = self.state.load_records();
        let merged = self.state.merge_and_persist(&resolved, &previous);

        let known: Vec<KnownMonitor> = resolved
            .into_iter()
            .zip(merged.current)
            .map(|(ResolvedMonitor { key, label_base, .. }, record)| KnownMonitor {
                key,
                label_base,
                record,
            })
            .collect();

        for m in &known {
            if let Some(code) = m.record.last_input {
                self.tracker.hydrate(&m.key, code);
            }
        }
        info!(
            "{} monitor(s) attached, {} remembered but absent",
            known.len(),
            merged.stale.len()
        );
        *self.monitors.borrow_mut() = known;
        self.list_monitors()
    }

    // Monitors sharing a key (e.g. a placeholder serial) resolve to the
    // first one attached; `identity::resolve` warns when that happens.
    fn record_of(&self, key: &str) -> Option<MonitorRecord> {
        self.monitors
            .borrow()
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.record.clone())
    }

    fn update_record(&self, key: &str, change: impl FnOnce(&mut MonitorRecord)) -> bool {
        match self.monitors.borrow_mut().iter_mut().find(|m| m.key == key) {
            Some(m) => {
                change(&mut m.record);
                true
            }
            None => false,
        }
    }

    /// Switch one monitor to `code`.
    ///
    /// The command is launched without waiting for it.  On success the input
    /// is recorded optimistically and persisted as the monitor's last input.
    pub fn switch_input(&self, key: &str, code: InputCode) -> SwitchOutcome {
        let Some(record) = self.record_of(key) else {
            info!("switch {} to {}: unknown monitor", key, code);
            return SwitchOutcome::Rejected(RejectReason::UnknownMonitor);
        };
        if !self.config.inputs.is_recognized(code) {
            info!("switch {} to {}: input not in catalogue", key, code);
            return SwitchOutcome::Rejected(RejectReason::UnrecognizedInput);
        }
        if !record.accepts(code) {
            info!("switch {} to {}: input not usable on this monitor", key, code);
            return SwitchOutcome::Rejected(RejectReason::NotUsable);
        }

        let argv = ddcutil::switch_argv(&self.config.ddcutil, Some(record.id), code);
        if !self.runner.launch(&argv) {
            warn!("switch {} to {}: could not launch {}", key, code, argv[0]);
            return SwitchOutcome::LaunchFailed;
        }

        self.tracker.record_switch(key, code);
        self.update_record(key, |r| r.last_input = Some(code));
        self.state.update_last_input(key, code);
        info!("switching {} (display {}) to {}", key, record.id, code);
        SwitchOutcome::Issued
    }

    /// Switch every attached monitor to `code`.
    ///
    /// With no known monitors the command is sent once without a display
    /// qualifier, leaving the choice to `ddcutil`.
    pub fn switch_all(&self, code: InputCode) -> SwitchAll {
        let keys: Vec<String> = self.monitors.borrow().iter().map(|m| m.key.clone()).collect();
        if !keys.is_empty() {
            return SwitchAll::PerMonitor(
                keys.into_iter()
                    .map(|key| {
                        let outcome = self.switch_input(&key, code);
                        (key, outcome)
                    })
                    .collect(),
            );
        }

        if !self.config.inputs.is_recognized(code) {
            return SwitchAll::Untargeted(SwitchOutcome::Rejected(RejectReason::UnrecognizedInput));
        }
        let argv = ddcutil::switch_argv(&self.config.ddcutil, None, code);
        if self.runner.launch(&argv) {
            info!("no known monitors, switching default display to {}", code);
            SwitchAll::Untargeted(SwitchOutcome::Issued)
        } else {
            SwitchAll::Untargeted(SwitchOutcome::LaunchFailed)
        }
    }

    /// Query one monitor's active input and return the tracker's belief
    /// afterwards (the previous belief if the query failed).
    ///
    /// A reading outside the input catalogue counts as a failed query.
    pub async fn refresh_input(&self, key: &str) -> Option<InputCode> {
        let id = self.record_of(key)?.id;
        let applied = self
            .tracker
            .query(key, || async move {
                let code = ddcutil::query_input(&self.runner, &self.config.ddcutil, id).await?;
                if !self.config.inputs.is_recognized(code) {
                    info!("display {} reports unrecognised input {}, ignoring", id, code);
                    return None;
                }
                Some(code)
            })
            .await;
        if let Some(code) = applied {
            self.update_record(key, |r| r.last_input = Some(code));
            self.state.update_last_input(key, code);
        }
        self.tracker.current(key)
    }

    /// Query every attached monitor concurrently and wait for all of them.
    pub async fn refresh_active_inputs(&self) {
        let keys: Vec<String> = self.monitors.borrow().iter().map(|m| m.key.clone()).collect();
        let results = join_all(keys.iter().map(|key| self.refresh_input(key))).await;
        debug!("refreshed {} monitor(s): {:?}", keys.len(), results);
    }

    /// Let the monitor settle after a switch, then query it.
    pub async fn confirm_switch(&self, key: &str) -> Option<InputCode> {
        tokio::time::sleep(self.config.ddcutil.confirm_delay()).await;
        self.refresh_input(key).await
    }

    /// Set a monitor's position preference.  Returns `false` for an unknown
    /// monitor.
    pub fn set_position(&self, key: &str, position: Position) -> bool {
        if !self.update_record(key, |r| r.position = position) {
            return false;
        }
        self.state.update_position(key, position);
        true
    }

    /// Replace a monitor's usable inputs.  An empty set allows every input.
    pub fn set_usable_inputs(
        &self,
        key: &str,
        inputs: impl IntoIterator<Item = InputCode>,
    ) -> bool {
        let inputs: BTreeSet<InputCode> = inputs.into_iter().collect();
        if !self.update_record(key, |r| r.usable_inputs = inputs.clone()) {
            return false;
        }
        self.state.update_usable_inputs(key, &inputs);
        true
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DdcutilConfig;
    use crate::store::{JsonFileStore, MemoryStore};
    use crate::traits::CommandOutput;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::time::Duration;

    const TWO_MONITORS: &str = "\
Display 1
   I2C bus:  /dev/i2c-4
   EDID synopsis:
      Model:                DELL U2720Q
      Serial number:        ABC123
Display 2
   I2C bus:  /dev/i2c-7
   EDID synopsis:
      Model:                Generic
";

    /// Fake `ddcutil` that records every call.
    #[derive(Default)]
    struct FakeDdcutil {
        detect_output: RefCell<Option<String>>,
        queries: RefCell<HashMap<String, CommandOutput>>,
        query_delay: Cell<Option<Duration>>,
        runs: RefCell<Vec<String>>,
        launched: RefCell<Vec<String>>,
        launch_fails: Cell<bool>,
    }

    impl FakeDdcutil {
        fn with_detect(text: &str) -> Self {
            let fake = Self::default();
            *fake.detect_output.borrow_mut() = Some(text.to_string());
            fake
        }

        fn answer_query(&self, id: u32, out: CommandOutput) {
            self.queries
                .borrow_mut()
                .insert(format!("ddcutil -d {} getvcp 60", id), out);
        }

        fn query_count(&self) -> usize {
            self.runs.borrow().iter().filter(|c| c.contains("getvcp")).count()
        }
    }

    impl CommandRunner for FakeDdcutil {
        async fn run(&self, argv: &[String], _timeout: Duration) -> CommandOutput {
            let joined = argv.join(" ");
            self.runs.borrow_mut().push(joined.clone());
            if joined == "ddcutil detect" {
                return match self.detect_output.borrow().clone() {
                    Some(text) => CommandOutput::success(text),
                    None => CommandOutput::failure("ddcutil: command not found"),
                };
            }
            if let Some(delay) = self.query_delay.get() {
                tokio::time::sleep(delay).await;
            }
            let answer = self.queries.borrow().get(&joined).cloned();
            answer.unwrap_or_else(|| CommandOutput::failure("not scripted"))
        }

        fn launch(&self, argv: &[String]) -> bool {
            if self.launch_fails.get() {
                return false;
            }
            self.launched.borrow_mut().push(argv.join(" "));
            true
        }
    }

    fn switcher(fake: FakeDdcutil) -> DisplaySwitcher<FakeDdcutil, MemoryStore> {
        DisplaySwitcher::new(fake, MemoryStore::new(), Config::default())
    }

    const DELL: &str = "sn:ABC123";
    const GENERIC: &str = "model:Generic|id:2";

    #[tokio::test]
    async fn rescan_lists_resolved_monitors() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        let list = s.rescan().await;
        let keys: Vec<&str> = list.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec![DELL, GENERIC]);
        assert_eq!(list[0].label, "DELL U2720Q");
        assert_eq!(s.state().load_records().len(), 2);
    }

    #[tokio::test]
    async fn failed_probe_is_an_empty_list() {
        let s = switcher(FakeDdcutil::default());
        assert!(s.rescan().await.is_empty());
    }

    #[tokio::test]
    async fn switch_is_optimistic_and_persisted() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        s.rescan().await;
        assert_eq!(s.switch_input(DELL, InputCode::DISPLAY_PORT_1), SwitchOutcome::Issued);
        assert_eq!(
            *s.runner.launched.borrow(),
            vec!["ddcutil -d 1 setvcp 60 0x0f".to_string()]
        );
        assert_eq!(s.tracker().current(DELL), Some(InputCode::DISPLAY_PORT_1));
        assert_eq!(
            s.state().load_records()[0].last_input,
            Some(InputCode::DISPLAY_PORT_1)
        );
        assert_eq!(
            s.find(DELL).and_then(|m| m.current_input),
            Some(InputCode::DISPLAY_PORT_1)
        );
    }

    #[tokio::test]
    async fn usable_inputs_gate_switching() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        s.rescan().await;
        assert!(s.set_usable_inputs(DELL, [InputCode::HDMI_1]));

        let outcome = s.switch_input(DELL, InputCode::DISPLAY_PORT_1);
        assert_eq!(outcome, SwitchOutcome::Rejected(RejectReason::NotUsable));
        assert!(s.runner.launched.borrow().is_empty());
        assert_eq!(s.tracker().current(DELL), None);

        // An empty allowlist accepts any recognised input.
        assert_eq!(s.switch_input(GENERIC, InputCode::USB_C), SwitchOutcome::Issued);
        assert_eq!(s.switch_input(DELL, InputCode::HDMI_1), SwitchOutcome::Issued);
    }

    #[tokio::test]
    async fn unknown_monitor_and_input_are_rejected() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        s.rescan().await;
        assert_eq!(
            s.switch_input("sn:NOPE", InputCode::HDMI_1),
            SwitchOutcome::Rejected(RejectReason::UnknownMonitor)
        );
        assert_eq!(
            s.switch_input(DELL, InputCode::new(0x12)),
            SwitchOutcome::Rejected(RejectReason::UnrecognizedInput)
        );
        assert!(s.runner.launched.borrow().is_empty());
    }

    #[tokio::test]
    async fn launch_failure_changes_nothing() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        s.rescan().await;
        s.runner.launch_fails.set(true);
        assert_eq!(s.switch_input(DELL, InputCode::HDMI_1), SwitchOutcome::LaunchFailed);
        assert_eq!(s.tracker().current(DELL), None);
        assert_eq!(s.state().load_records()[0].last_input, None);
    }

    #[tokio::test]
    async fn switch_all_targets_each_monitor() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        s.rescan().await;
        let SwitchAll::PerMonitor(outcomes) = s.switch_all(InputCode::HDMI_1) else {
            panic!("expected per-monitor outcomes");
        };
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|(_, o)| *o == SwitchOutcome::Issued));
        assert_eq!(
            *s.runner.launched.borrow(),
            vec![
                "ddcutil -d 1 setvcp 60 0x11".to_string(),
                "ddcutil -d 2 setvcp 60 0x11".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn switch_all_without_monitors_is_untargeted() {
        let s = switcher(FakeDdcutil::default());
        s.rescan().await;
        assert_eq!(
            s.switch_all(InputCode::USB_C),
            SwitchAll::Untargeted(SwitchOutcome::Issued)
        );
        assert_eq!(
            *s.runner.launched.borrow(),
            vec!["ddcutil setvcp 60 0x1b".to_string()]
        );
    }

    #[tokio::test]
    async fn refresh_overrides_and_failure_preserves() {
        let fake = FakeDdcutil::with_detect(TWO_MONITORS);
        fake.answer_query(
            1,
            CommandOutput::success("VCP code 0x60 (Input Source): current value = 17"),
        );
        let s = switcher(fake);
        s.rescan().await;
        s.switch_input(DELL, InputCode::DISPLAY_PORT_1);

        assert_eq!(s.refresh_input(DELL).await, Some(InputCode::HDMI_1));
        assert_eq!(s.state().load_records()[0].last_input, Some(InputCode::HDMI_1));

        s.runner.answer_query(1, CommandOutput::timed_out());
        assert_eq!(s.refresh_input(DELL).await, Some(InputCode::HDMI_1));
        assert_eq!(s.tracker().current(DELL), Some(InputCode::HDMI_1));

        // Never read, never switched: still unknown after a failed query.
        assert_eq!(s.refresh_input(GENERIC).await, None);
    }

    #[tokio::test]
    async fn unrecognised_reading_keeps_last_input() {
        let fake = FakeDdcutil::with_detect(TWO_MONITORS);
        fake.answer_query(1, CommandOutput::success("current value = 0x12"));
        fake.answer_query(2, CommandOutput::success("current value = 3"));
        let s = switcher(fake);
        s.rescan().await;
        s.switch_input(DELL, InputCode::HDMI_1);

        assert_eq!(s.refresh_input(DELL).await, Some(InputCode::HDMI_1));
        assert_eq!(
            s.tracker().entry(DELL).map(|e| e.source),
            Some(crate::tracker::InputSource::Optimistic)
        );
        assert_eq!(s.state().load_records()[0].last_input, Some(InputCode::HDMI_1));

        assert_eq!(s.refresh_input(GENERIC).await, None);
        assert_eq!(s.state().load_records()[1].last_input, None);
    }

    #[tokio::test]
    async fn refresh_all_queries_each_monitor_once() {
        let fake = FakeDdcutil::with_detect(TWO_MONITORS);
        fake.answer_query(1, CommandOutput::success("current value = 0x0f"));
        fake.answer_query(2, CommandOutput::success("(sl=0x1b)"));
        fake.query_delay.set(Some(Duration::from_millis(10)));
        let s = switcher(fake);
        s.rescan().await;

        let (_, again) = tokio::join!(s.refresh_active_inputs(), s.refresh_input(DELL));
        assert_eq!(again, Some(InputCode::DISPLAY_PORT_1));
        assert_eq!(s.runner.query_count(), 2);
        assert_eq!(s.tracker().current(GENERIC), Some(InputCode::USB_C));
    }

    #[tokio::test]
    async fn persisted_input_hydrates_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let first = DisplaySwitcher::new(
            FakeDdcutil::with_detect(TWO_MONITORS),
            JsonFileStore::new(&path),
            Config::default(),
        );
        first.rescan().await;
        first.switch_input(GENERIC, InputCode::USB_C);
        drop(first);

        let restarted = DisplaySwitcher::new(
            FakeDdcutil::with_detect(TWO_MONITORS),
            JsonFileStore::new(&path),
            Config::default(),
        );
        restarted.rescan().await;
        let entry = restarted.tracker().entry(GENERIC).unwrap();
        assert_eq!(entry.code, InputCode::USB_C);
        assert_eq!(entry.source, crate::tracker::InputSource::Persisted);
        assert_eq!(restarted.tracker().current(DELL), None);
    }

    #[tokio::test]
    async fn positions_order_and_decorate() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        s.rescan().await;
        assert!(s.set_position(GENERIC, Position::Left));
        assert!(s.set_position(DELL, Position::Right));
        assert!(!s.set_position("sn:NOPE", Position::Left));

        let list = s.list_monitors();
        assert_eq!(list[0].label, "Generic (Left)");
        assert_eq!(list[1].label, "DELL U2720Q (Right)");
        assert_eq!(s.find("generic").map(|m| m.key), Some(GENERIC.to_string()));
        assert_eq!(s.find("1").map(|m| m.key), Some(DELL.to_string()));
    }

    #[tokio::test]
    async fn unavailable_store_still_works_in_memory() {
        let s = DisplaySwitcher::new(
            FakeDdcutil::with_detect(TWO_MONITORS),
            MemoryStore::unavailable(),
            Config::default(),
        );
        assert_eq!(s.rescan().await.len(), 2);
        assert!(s.set_usable_inputs(DELL, [InputCode::HDMI_1]));
        assert_eq!(
            s.switch_input(DELL, InputCode::USB_C),
            SwitchOutcome::Rejected(RejectReason::NotUsable)
        );
        assert_eq!(s.switch_input(DELL, InputCode::HDMI_1), SwitchOutcome::Issued);
        assert_eq!(s.tracker().current(DELL), Some(InputCode::HDMI_1));
    }

    #[tokio::test]
    async fn renumbered_monitor_keeps_preferences() {
        let s = switcher(FakeDdcutil::with_detect(TWO_MONITORS));
        let first = s.rescan().await;
        assert_eq!(first[0].key, DELL);
        assert_eq!(first[1].key, GENERIC);

        assert_eq!(s.switch_input(DELL, InputCode::DISPLAY_PORT_1), SwitchOutcome::Issued);
        s.set_position(DELL, Position::Center);
        s.set_usable_inputs(DELL, [InputCode::DISPLAY_PORT_1, InputCode::HDMI_1]);

        // Hot-plug shuffles the bus: the Dell is now display 3.
        *s.runner.detect_output.borrow_mut() = Some(
            "Display 3\n   Model: DELL U2720Q\n   Serial number: ABC123\n".to_string(),
        );
        let second = s.rescan().await;
        assert_eq!(second.len(), 1);
        let dell = &second[0];
        assert_eq!(dell.key, DELL);
        assert_eq!(dell.record.id, 3);
        assert_eq!(dell.record.position, Position::Center);
        assert_eq!(dell.record.last_input, Some(InputCode::DISPLAY_PORT_1));
        assert_eq!(
            dell.record.usable_inputs,
            BTreeSet::from([InputCode::DISPLAY_PORT_1, InputCode::HDMI_1])
        );
        assert_eq!(dell.label, "DELL U2720Q (Center)");

        // The unplugged Generic monitor is remembered, not deleted.
        assert_eq!(s.state().load_records().len(), 2);

        // Switching now addresses the new display number.
        s.switch_input(DELL, InputCode::HDMI_1);
        assert_eq!(
            s.runner.launched.borrow().last().map(String::as_str),
            Some("ddcutil -d 3 setvcp 60 0x11")
        );
    }

    #[test]
    fn custom_binary_is_used() {
        let config = Config {
            ddcutil: DdcutilConfig {
                binary: "/opt/bin/ddcutil".into(),
                ..DdcutilConfig::default()
            },
            ..Config::default()
        };
        let argv = ddcutil::switch_argv(&config.ddcutil, Some(2), InputCode::HDMI_1);
        assert_eq!(argv[0], "/opt/bin/ddcutil");
    }
}
