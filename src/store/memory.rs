//! In-process [`SettingsStore`].

use crate::traits::SettingsStore;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Settings that live only as long as the process.
///
/// A store built with [`MemoryStore::unavailable`] fails every call, which
/// is how a missing settings backend looks to the adapter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: RefCell<BTreeMap<String, Vec<String>>>,
    maps: RefCell<BTreeMap<String, BTreeMap<String, String>>>,
    unavailable: bool,
    writes: Cell<usize>,
}

/// Returned by every call on an unavailable [`MemoryStore`].
#[derive(Debug, thiserror::Error)]
#[error("settings backend unavailable")]
pub struct Unavailable;

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of successful set calls so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn check(&self) -> Result<(), Unavailable> {
        if self.unavailable {
            Err(Unavailable)
        } else {
            Ok(())
        }
    }
}

impl SettingsStore for MemoryStore {
    type Error = Unavailable;

    fn string_list(&self, key: &str) -> Result<Vec<String>, Unavailable> {
        self.check()?;
        Ok(self.lists.borrow().get(key).cloned().unwrap_or_default())
    }

    fn set_string_list(&self, key: &str, value: &[String]) -> Result<(), Unavailable> {
        self.check()?;
        self.lists
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>, Unavailable> {
        self.check()?;
        Ok(self.maps.borrow().get(key).cloned().unwrap_or_default())
    }

    fn set_string_map(
        &self,
        key: &str,
        value: &BTreeMap<String, String>,
    ) -> Result<(), Unavailable> {
        self.check()?;
        self.maps.borrow_mut().insert(key.to_string(), value.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
