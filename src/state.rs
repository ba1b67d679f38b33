//! The single gateway to persisted monitor state.
//!
//! All reads and writes of monitor records go through [`StateStore`].  Each
//! update is a full read-modify-write of the record list: read the list,
//! change one record, write the whole list back.  There is no locking; the
//! last writer wins, which is fine because this program's own control
//! thread is the only writer.
//!
//! When the backend fails (no settings file permissions, corrupt document,
//! missing schema, …) every operation degrades to a logged no-op and the
//! caller keeps working from memory.

use crate::identity::ResolvedMonitor;
use crate::monitor::{InputCode, MonitorRecord, Position};
use crate::traits::SettingsStore;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Settings key of the serialized record list.
pub const MONITORS_KEY: &str = "monitors";

/// Settings key of the older `identity key -> position` map.
pub const LEGACY_POSITIONS_KEY: &str = "monitor-positions";

/// Result of reconciling a probe with stored records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Merged {
    /// One record per probed monitor, in probe order.
    pub current: Vec<MonitorRecord>,
    /// Stored records no probed monitor claimed (unplugged monitors).
    pub stale: Vec<MonitorRecord>,
}

impl Merged {
    /// Every record, current first, as it is written back.
    pub fn all(&self) -> Vec<MonitorRecord> {
        self.current.iter().chain(&self.stale).cloned().collect()
    }
}

fn conflicts(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a != b
}

/// Reconcile probed monitors with previously stored records.
///
/// A stored record is claimed by exact identity key first.  Failing that, a
/// record with the same display number is claimed as long as its serial and
/// model do not contradict the probe (this is how a monitor that was once
/// seen without a serial, e.g. by a terse probe, finds its preferences
/// again).  Each stored record is claimed at most once.
///
/// Claimed records keep `position`, `lastInput` and `usableInputs` and take
/// `id`, `model` and `serial` from the probe.  A record whose position is
/// still unset adopts the value from the legacy position map.
pub fn merge_records(
    current: &[ResolvedMonitor],
    previous: &[MonitorRecord],
    legacy_positions: &BTreeMap<String, String>,
) -> Merged {
    let mut pool: Vec<Option<&MonitorRecord>> = previous.iter().map(Some).collect();
    let mut claims: Vec<Option<&MonitorRecord>> = vec![None; current.len()];

    // Exact keys first, so an id match can never take a record that some
    // other probed monitor owns by key.
    for (monitor, claim) in current.iter().zip(claims.iter_mut()) {
        let exact = pool
            .iter()
            .position(|r| r.is_some_and(|r| r.identity_key() == monitor.key));
        *claim = exact.and_then(|i| pool[i].take());
    }

    for (monitor, claim) in current.iter().zip(claims.iter_mut()) {
        if claim.is_some() {
            continue;
        }
        let d = &monitor.descriptor;
        let by_id = pool.iter().position(|r| {
            r.is_some_and(|r| {
                r.id == d.id
                    && !conflicts(&r.serial, d.serial_str())
                    && !conflicts(&r.model, d.model_str())
            })
        });
        *claim = by_id.and_then(|i| pool[i].take());
    }

    let mut merged = Vec::with_capacity(current.len());
    for (monitor, claimed) in current.iter().zip(claims) {
        let d = &monitor.descriptor;
        let mut record = match claimed {
            Some(previous) => {
                debug!("{} matches stored record {}", monitor.key, previous.identity_key());
                previous.clone()
            }
            None => {
                debug!("{} is a new monitor", monitor.key);
                MonitorRecord::from_descriptor(d)
            }
        };
        record.refresh_from(d);
        if record.position == Position::Unset {
            if let Some(legacy) = legacy_positions.get(&monitor.key) {
                record.position = Position::parse(legacy);
            }
        }
        merged.push(record);
    }

    Merged {
        current: merged,
        stale: pool.into_iter().flatten().cloned().collect(),
    }
}

/// Adapter between the core and a [`SettingsStore`].
pub struct StateStore<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> StateStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Read every well-formed stored record.  Malformed entries are skipped;
    /// an unavailable backend reads as no records.
    pub fn load_records(&self) -> Vec<MonitorRecord> {
        self.try_load_records().unwrap_or_else(|e| {
            warn!("cannot read monitor records: {}", e);
            Vec::new()
        })
    }

    fn try_load_records(&self) -> Result<Vec<MonitorRecord>, S::Error> {
        let raw = self.store.string_list(MONITORS_KEY)?;
        Ok(raw
            .iter()
            .filter_map(|entry| match serde_json::from_str::<MonitorRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("skipping malformed monitor record {:?}: {}", entry, e);
                    None
                }
            })
            .collect())
    }

    /// Read the legacy position map (empty when unavailable).
    pub fn legacy_positions(&self) -> BTreeMap<String, String> {
        self.store
            .string_map(LEGACY_POSITIONS_KEY)
            .unwrap_or_else(|e| {
                debug!("cannot read legacy positions: {}", e);
                BTreeMap::new()
            })
    }

    /// Merge a probe into `previous` and write the full result back.
    ///
    /// Merging the same probe twice in a row changes nothing, and the second
    /// merge does not write at all.
    pub fn merge_and_persist(
        &self,
        current: &[ResolvedMonitor],
        previous: &[MonitorRecord],
    ) -> Merged {
        let merged = merge_records(current, previous, &self.legacy_positions());
        let all = merged.all();
        if all.as_slice() != previous {
            self.save_records(&all);
        }
        merged
    }

    /// Set the last known input of one monitor.
    pub fn update_last_input(&self, key: &str, code: InputCode) -> bool {
        self.modify(key, |record| record.last_input = Some(code))
    }

    /// Set the position of one monitor, mirroring it into the legacy map.
    pub fn update_position(&self, key: &str, position: Position) -> bool {
        let found = self.modify(key, |record| record.position = position);
        if found {
            self.mirror_legacy_position(key, position);
        }
        found
    }

    /// Replace the usable-input allowlist of one monitor.
    pub fn update_usable_inputs(&self, key: &str, inputs: &BTreeSet<InputCode>) -> bool {
        self.modify(key, |record| record.usable_inputs = inputs.clone())
    }

    fn modify(&self, key: &str, change: impl FnOnce(&mut MonitorRecord)) -> bool {
        let mut records = match self.try_load_records() {
            Ok(records) => records,
            Err(e) => {
                warn!("cannot update {}: {}", key, e);
                return false;
            }
        };
        let Some(record) = records.iter_mut().find(|r| r.identity_key() == key) else {
            debug!("no stored record for {}", key);
            return false;
        };
        change(record);
        self.save_records(&records);
        true
    }

    fn save_records(&self, records: &[MonitorRecord]) {
        let raw: Vec<String> = records
            .iter()
            .filter_map(|r| serde_json::to_string(r).ok())
            .collect();
        match self.store.set_string_list(MONITORS_KEY, &raw) {
            Ok(()) => debug!("saved {} monitor record(s)", raw.len()),
            Err(e) => warn!("cannot save monitor records: {}", e),
        }
    }

    fn mirror_legacy_position(&self, key: &str, position: Position) {
        let mut map = match self.store.string_map(LEGACY_POSITIONS_KEY) {
            Ok(map) => map,
            Err(e) => {
                debug!("cannot read legacy positions: {}", e);
                return;
            }
        };
        match position {
            Position::Unset => map.remove(key),
            other => map.insert(key.to_string(), other.as_str().to_string()),
        };
        if let Err(e) = self.store.set_string_map(LEGACY_POSITIONS_KEY, &map) {
            warn!("cannot save legacy positions: {}", e);
        }
    }
}
