//! In-memory authority for "which input is this monitor showing".
//!
//! Three sources feed the tracker:
//!
//! 1. **Persisted**: at startup, the last stored input hydrates an empty
//!    entry.
//! 2. **Optimistic**: the moment a switch command is issued the requested
//!    input is recorded, before the monitor has done anything.
//! 3. **Queried**: a successful device query overwrites whatever was
//!    there.
//!
//! A failed or timed-out query never clears an entry: a monitor that is
//! momentarily driven by another host keeps its last confident reading.
//!
//! Queries for the same monitor are coalesced.  While one is in flight, a
//! second request waits for the first one's result instead of starting
//! another probe.  A query that started before the latest switch of that
//! monitor is stale and its result is discarded.
//!
//! All state lives in `RefCell`s and is never borrowed across an `.await`,
//! so the tracker is safe to share between futures on one thread.

use crate::monitor::InputCode;
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use tokio::sync::watch;

/// Where the current belief about a monitor's input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Persisted,
    Optimistic,
    Queried,
}

/// The tracker's belief about one monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedInput {
    pub code: InputCode,
    pub source: InputSource,
    pub updated_at: Instant,
    /// Sequence number of the last optimistic update for this monitor.
    switch_seq: u64,
}

/// Per-monitor current-input state.
#[derive(Debug, Default)]
pub struct InputTracker {
    entries: RefCell<HashMap<String, TrackedInput>>,
    in_flight: RefCell<HashMap<String, watch::Receiver<Option<Option<InputCode>>>>>,
    next_seq: Cell<u64>,
}

/// Removes the in-flight marker even if the leading query is dropped.
struct InFlight<'a> {
    map: &'a RefCell<HashMap<String, watch::Receiver<Option<Option<InputCode>>>>>,
    key: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.map.borrow_mut().remove(self.key);
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The input currently believed to be active, if any.
    pub fn current(&self, key: &str) -> Option<InputCode> {
        self.entries.borrow().get(key).map(|e| e.code)
    }

    pub fn entry(&self, key: &str) -> Option<TrackedInput> {
        self.entries.borrow().get(key).copied()
    }

    /// Seed an entry from persisted state.  Existing entries win.
    pub fn hydrate(&self, key: &str, code: InputCode) {
        self.entries
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| TrackedInput {
                code,
                source: InputSource::Persisted,
                updated_at: Instant::now(),
                switch_seq: 0,
            });
    }

    /// Record that a switch to `code` was just issued.
    pub fn record_switch(&self, key: &str, code: InputCode) {
        let seq = self.next_seq.get() + 1;
        self.next_seq.set(seq);
        self.entries.borrow_mut().insert(
            key.to_string(),
            TrackedInput {
                code,
                source: InputSource::Optimistic,
                updated_at: Instant::now(),
                switch_seq: seq,
            },
        );
        debug!("{}: optimistic input {}", key, code);
    }

    /// Apply a query result that was started when the switch sequence was
    /// `started_at`.  Returns the reading if it was applied.
    fn record_query(
        &self,
        key: &str,
        started_at: u64,
        reading: Option<InputCode>,
    ) -> Option<InputCode> {
        let Some(code) = reading else {
            info!("{}: query gave no reading, keeping {:?}", key, self.current(key));
            return None;
        };
        let mut entries = self.entries.borrow_mut();
        let switch_seq = entries.get(key).map(|e| e.switch_seq).unwrap_or(0);
        if switch_seq > started_at {
            debug!("{}: discarding reading {} older than the last switch", key, code);
            return None;
        }
        entries.insert(
            key.to_string(),
            TrackedInput {
                code,
                source: InputSource::Queried,
                updated_at: Instant::now(),
                switch_seq,
            },
        );
        debug!("{}: queried input {}", key, code);
        Some(code)
    }

    /// Run `query` for `key` unless one is already in flight, in which case
    /// wait for that one instead.
    ///
    /// Returns the reading that was applied to the tracker: `None` when the
    /// query failed, timed out, or was overtaken by a switch.
    pub async fn query<F, Fut>(&self, key: &str, query: F) -> Option<InputCode>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<InputCode>>,
    {
        let pending = self.in_flight.borrow().get(key).cloned();
        if let Some(mut rx) = pending {
            debug!("{}: joining in-flight query", key);
            loop {
                if let Some(applied) = *rx.borrow_and_update() {
                    return applied;
                }
                if rx.changed().await.is_err() {
                    // The leading query was abandoned.
                    return None;
                }
            }
        }

        let (tx, rx) = watch::channel(None);
        self.in_flight.borrow_mut().insert(key.to_string(), rx);
        let _marker = InFlight {
            map: &self.in_flight,
            key,
        };

        let started_at = self.next_seq.get();
        let reading = query().await;
        let applied = self.record_query(key, started_at, reading);
        let _ = tx.send(Some(applied));
        applied
    }

    /// Whether a query for `key` is currently running.
    pub fn is_querying(&self, key: &str) -> bool {
        self.in_flight.borrow().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn hydrate_does_not_override() {
        let t = InputTracker::new();
        t.hydrate("a", InputCode::HDMI_1);
        assert_eq!(t.entry("a").map(|e| e.source), Some(InputSource::Persisted));
        t.record_switch("a", InputCode::USB_C);
        t.hydrate("a", InputCode::HDMI_1);
        assert_eq!(t.current("a"), Some(InputCode::USB_C));
    }

    #[test]
    fn switch_is_applied_immediately() {
        let t = InputTracker::new();
        t.record_switch("a", InputCode::DISPLAY_PORT_1);
        let entry = t.entry("a").unwrap();
        assert_eq!(entry.code, InputCode::DISPLAY_PORT_1);
        assert_eq!(entry.source, InputSource::Optimistic);
    }

    #[tokio::test]
    async fn successful_query_overrides_optimistic() {
        let t = InputTracker::new();
        t.record_switch("a", InputCode::DISPLAY_PORT_1);
        let applied = t.query("a", || async { Some(InputCode::HDMI_1) }).await;
        assert_eq!(applied, Some(InputCode::HDMI_1));
        assert_eq!(t.entry("a").map(|e| e.source), Some(InputSource::Queried));
        assert_eq!(t.current("a"), Some(InputCode::HDMI_1));
    }

    #[tokio::test]
    async fn failed_query_preserves_state() {
        let t = InputTracker::new();
        t.hydrate("a", InputCode::HDMI_1);
        assert_eq!(t.query("a", || async { None }).await, None);
        assert_eq!(t.current("a"), Some(InputCode::HDMI_1));
        assert!(!t.is_querying("a"));
    }

    #[tokio::test]
    async fn failed_query_without_state_stays_unknown() {
        let t = InputTracker::new();
        assert_eq!(t.query("a", || async { None }).await, None);
        assert_eq!(t.current("a"), None);
    }

    #[tokio::test]
    async fn concurrent_queries_are_coalesced() {
        let t = InputTracker::new();
        let counter = Cell::new(0);
        let calls = &counter;
        let slow = move || async move {
            calls.set(calls.get() + 1);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Some(InputCode::USB_C)
        };
        let (first, second) = tokio::join!(t.query("a", slow), t.query("a", slow));
        assert_eq!(calls.get(), 1);
        assert_eq!(first, Some(InputCode::USB_C));
        assert_eq!(second, Some(InputCode::USB_C));
        assert!(!t.is_querying("a"));

        // Once settled, a new request runs a fresh query.
        t.query("a", slow).await;
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn different_monitors_do_not_coalesce() {
        let t = InputTracker::new();
        let counter = Cell::new(0);
        let calls = &counter;
        let (a, b) = tokio::join!(
            t.query("a", move || async move {
                calls.set(calls.get() + 1);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Some(InputCode::HDMI_1)
            }),
            t.query("b", move || async move {
                calls.set(calls.get() + 1);
                None
            }),
        );
        assert_eq!(calls.get(), 2);
        assert_eq!(a, Some(InputCode::HDMI_1));
        assert_eq!(b, None);
        assert_eq!(t.current("a"), Some(InputCode::HDMI_1));
        assert_eq!(t.current("b"), None);
    }

    #[tokio::test]
    async fn reading_older_than_switch_is_discarded() {
        let t = InputTracker::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let query = t.query("a", || async move {
            let _ = rx.await;
            Some(InputCode::HDMI_1)
        });
        let switch = async {
            tokio::task::yield_now().await;
            t.record_switch("a", InputCode::DISPLAY_PORT_1);
            let _ = tx.send(());
        };
        let (applied, ()) = tokio::join!(query, switch);
        assert_eq!(applied, None);
        assert_eq!(t.current("a"), Some(InputCode::DISPLAY_PORT_1));
    }

    #[tokio::test]
    async fn abandoned_query_clears_in_flight_marker() {
        let t = InputTracker::new();
        let never = t.query("a", || std::future::pending::<Option<InputCode>>());
        let timed = tokio::time::timeout(Duration::from_millis(10), never).await;
        assert!(timed.is_err());
        assert!(!t.is_querying("a"));
    }
}
