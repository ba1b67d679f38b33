//! [`SettingsStore`] persisted as a single JSON document.
//!
//! # File format
//!
//! ```json
//! {
//!   "monitors": [
//!     "{\"id\":1,\"model\":\"DELL U2720Q\",\"serial\":\"ABC123\",...}"
//!   ],
//!   "monitor-positions": { "sn:ABC123": "left" }
//! }
//! ```
//!
//! Every read goes back to disk and every write re-reads the document,
//! replaces one key and renames a temporary file over the original, so
//! keys this program does not own survive untouched.

use crate::traits::SettingsStore;
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Errors produced by the JSON settings file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings document is malformed: {0}")]
    Malformed(String),
}

/// Settings document at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// The file is not touched until the first read or write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Malformed(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_key(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut document = self.read_document()?;
        document.insert(key.to_string(), value);

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, serde_json::to_string_pretty(&Value::Object(document))?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("wrote {:?} to {}", key, self.path.display());
        Ok(())
    }
}

fn wrong_type(key: &str, expected: &str) -> StoreError {
    StoreError::Malformed(format!("{:?} is not {}", key, expected))
}

impl SettingsStore for JsonFileStore {
    type Error = StoreError;

    fn string_list(&self, key: &str) -> Result<Vec<String>, StoreError> {
        match self.read_document()?.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(wrong_type(key, "a list of strings")),
                })
                .collect(),
            Some(_) => Err(wrong_type(key, "a list of strings")),
        }
    }

    fn set_string_list(&self, key: &str, value: &[String]) -> Result<(), StoreError> {
        self.write_key(key, Value::from(value.to_vec()))
    }

    fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        match self.read_document()?.remove(key) {
            None | Some(Value::Null) => Ok(BTreeMap::new()),
            Some(Value::Object(entries)) => entries
                .into_iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k, s)),
                    _ => Err(wrong_type(key, "a map of strings")),
                })
                .collect(),
            Some(_) => Err(wrong_type(key, "a map of strings")),
        }
    }

    fn set_string_map(
        &self,
        key: &str,
        value: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let object: Map<String, Value> = value
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        self.write_key(key, Value::Object(object))
    }
}
