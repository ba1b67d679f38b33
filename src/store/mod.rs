//! Concrete [`SettingsStore`](crate::traits::SettingsStore) backends.
//!
//! [`JsonFileStore`](file::JsonFileStore) keeps settings in one JSON
//! document on disk; [`MemoryStore`](memory::MemoryStore) keeps them in
//! process memory for tests and `--no-persist` runs.

pub mod file;
pub mod memory;

pub use file::{JsonFileStore, StoreError};
pub use memory::MemoryStore;
