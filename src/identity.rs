//! Identity keys and user-facing labels for probed monitors.
//!
//! Two monitors of the same model on one bus would otherwise be
//! indistinguishable in a menu, so duplicates get an ordinal: three
//! `Acme X` panels on displays 1, 2 and 3 become `Acme X (1)`,
//! `Acme X (2)` and `Acme X (3)`.  The ordinal follows display number, not
//! probe order.
//!
//! Position suffixes are applied separately by [`decorate`] so that
//! changing a position never rewrites the base label.

use crate::monitor::{MonitorDescriptor, Position};
use log::warn;
use std::collections::{HashMap, HashSet};

/// A probed monitor with its identity key and undecorated label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMonitor {
    pub descriptor: MonitorDescriptor,
    pub key: String,
    pub label_base: String,
}

/// Compute identity keys and disambiguated labels, preserving input order.
///
/// Monitors reporting the same serial get the same key.  They share one
/// stored record and only the first of them can be addressed by key.
pub fn resolve(descriptors: Vec<MonitorDescriptor>) -> Vec<ResolvedMonitor> {
    let names: Vec<String> = descriptors.iter().map(|d| d.display_name()).collect();

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, name) in names.iter().enumerate() {
        groups.entry(name.as_str()).or_default().push(index);
    }

    let mut labels = names.clone();
    for members in groups.values().filter(|m| m.len() > 1) {
        let mut by_id = members.clone();
        by_id.sort_by_key(|&i| descriptors[i].id);
        for (ordinal, &index) in by_id.iter().enumerate() {
            labels[index] = format!("{} ({})", names[index], ordinal + 1);
        }
    }

    let resolved: Vec<ResolvedMonitor> = descriptors
        .into_iter()
        .zip(labels)
        .map(|(descriptor, label_base)| ResolvedMonitor {
            key: descriptor.identity_key(),
            descriptor,
            label_base,
        })
        .collect();

    let mut seen = HashSet::new();
    for m in &resolved {
        if !seen.insert(m.key.as_str()) {
            warn!(
                "display {} shares identity {} with an earlier monitor and cannot be addressed",
                m.descriptor.id, m.key
            );
        }
    }
    resolved
}

/// Append the position suffix, e.g. `Acme X (2) (Left)`.
pub fn decorate(label_base: &str, position: Position) -> String {
    match position.label_suffix() {
        Some(suffix) => format!("{} ({})", label_base, suffix),
        None => label_base.to_string(),
    }
}
