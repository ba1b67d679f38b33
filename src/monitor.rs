//! Monitor vocabulary shared by every component.
//!
//! [`MonitorDescriptor`] is what one probe cycle reports, [`MonitorRecord`]
//! is what survives between runs, and [`Monitor`] is the reconciled
//! snapshot handed to the presentation layer.  [`InputCode`] and
//! [`Position`] are the small value types all of them carry.
//!
//! Persisted records are parsed leniently: a field with the wrong shape
//! falls back to its default instead of rejecting the whole record, and
//! fields this version does not know about are carried through untouched.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Normalised value of VCP feature 0x60 (input source select).
///
/// Always rendered as lowercase hexadecimal with a `0x` prefix and at least
/// two digits (`0x0f`, `0x11`), whatever notation the source used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputCode(u16);

impl InputCode {
    pub const DISPLAY_PORT_1: InputCode = InputCode(0x0f);
    pub const HDMI_1: InputCode = InputCode(0x11);
    pub const USB_C: InputCode = InputCode(0x1b);

    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Parse `0x`-prefixed hexadecimal or plain decimal digits.
    ///
    /// `"15"`, `"0x0f"`, `"0X0F"` and `"0xf"` all yield the same code.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            return u16::from_str_radix(hex, 16).ok().map(Self);
        }
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        s.parse::<u16>().ok().map(Self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()).map(Self),
            _ => None,
        }
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

impl Serialize for InputCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InputCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        InputCode::from_json(&value)
            .ok_or_else(|| DeError::custom(format!("invalid input code: {}", value)))
    }
}

/// Where the user says a monitor sits on the desk.
///
/// Only used to order monitors and to suffix their labels; it never affects
/// switching.  The discriminant is the sort rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Position {
    Left = 0,
    Center = 1,
    Right = 2,
    #[default]
    Unset = 3,
}

impl Position {
    /// Parse a stored or typed position (case-insensitive, `centre` accepted).
    /// Anything unrecognised is [`Position::Unset`].
    pub fn parse(s: &str) -> Position {
        match s.trim().to_lowercase().as_str() {
            "left" => Position::Left,
            "center" | "centre" => Position::Center,
            "right" => Position::Right,
            _ => Position::Unset,
        }
    }

    pub fn rank(self) -> u8 {
        self as u8
    }

    /// The persisted spelling; unset is the empty string.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
            Position::Unset => "",
        }
    }

    /// Human-readable suffix for labels, `None` when unset.
    pub fn label_suffix(self) -> Option<&'static str> {
        match self {
            Position::Left => Some("Left"),
            Position::Center => Some("Center"),
            Position::Right => Some("Right"),
            Position::Unset => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Unset => write!(f, "unset"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Position::parse(&s),
            _ => Position::Unset,
        })
    }
}

/// Build the identity key for a monitor.
///
/// `sn:<serial>` when a serial is known, otherwise `model:<model>|id:<id>`.
/// The model form is only as stable as the probe tool's numbering.
pub fn identity_key(id: u32, model: &str, serial: &str) -> String {
    if serial.is_empty() {
        format!("model:{}|id:{}", model, id)
    } else {
        format!("sn:{}", serial)
    }
}

/// One display as reported by a single probe cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDescriptor {
    /// Bus-scoped display number assigned by the probe tool.  Not stable
    /// across reboots or hot-plug.
    pub id: u32,
    pub model: Option<String>,
    pub serial: Option<String>,
}

impl MonitorDescriptor {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            model: None,
            serial: None,
        }
    }

    pub fn model_str(&self) -> &str {
        self.model.as_deref().unwrap_or("")
    }

    pub fn serial_str(&self) -> &str {
        self.serial.as_deref().unwrap_or("")
    }

    pub fn identity_key(&self) -> String {
        identity_key(self.id, self.model_str(), self.serial_str())
    }

    /// The undecorated name: the model, or `Display <id>` without one.
    pub fn display_name(&self) -> String {
        match self.model.as_deref() {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => format!("Display {}", self.id),
        }
    }
}

/// Persisted preferences and last-known state for one identity key.
///
/// The serialized form is the full schema every time:
///
/// ```json
/// {"id":1,"model":"DELL U2720Q","serial":"ABC123","position":"left",
///  "lastInput":"0x0f","usableInputs":["0x0f","0x11"]}
/// ```
///
/// An empty `usableInputs` means every input is usable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serial: String,
    #[serde(default)]
    pub position: Position,
    #[serde(
        default,
        deserialize_with = "lenient_last_input",
        serialize_with = "serialize_last_input"
    )]
    pub last_input: Option<InputCode>,
    #[serde(default, deserialize_with = "lenient_codes")]
    pub usable_inputs: BTreeSet<InputCode>,
    /// Fields written by other versions, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MonitorRecord {
    /// A fresh record for a monitor seen for the first time.
    pub fn from_descriptor(descriptor: &MonitorDescriptor) -> Self {
        Self {
            id: descriptor.id,
            model: descriptor.model_str().to_string(),
            serial: descriptor.serial_str().to_string(),
            ..Self::default()
        }
    }

    pub fn identity_key(&self) -> String {
        identity_key(self.id, &self.model, &self.serial)
    }

    pub fn descriptor(&self) -> MonitorDescriptor {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        MonitorDescriptor {
            id: self.id,
            model: non_empty(&self.model),
            serial: non_empty(&self.serial),
        }
    }

    /// Overwrite the probe-derived fields, keeping every preference.
    pub fn refresh_from(&mut self, descriptor: &MonitorDescriptor) {
        self.id = descriptor.id;
        self.model = descriptor.model_str().to_string();
        self.serial = descriptor.serial_str().to_string();
    }

    /// Whether the usable-input policy allows `code`.
    pub fn accepts(&self, code: InputCode) -> bool {
        self.usable_inputs.is_empty() || self.usable_inputs.contains(&code)
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_last_input<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<InputCode>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(InputCode::from_json(&value))
}

fn serialize_last_input<S: Serializer>(
    code: &Option<InputCode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match code {
        Some(code) => serializer.collect_str(code),
        None => serializer.serialize_str(""),
    }
}

fn lenient_codes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeSet<InputCode>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(InputCode::from_json).collect(),
        _ => BTreeSet::new(),
    })
}

/// Reconciled view of one attached monitor, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Monitor {
    /// Stable identity key (see [`identity_key`]).
    pub key: String,
    /// Disambiguated name decorated with the position suffix.
    pub label: String,
    pub record: MonitorRecord,
    /// What the input tracker currently believes is selected.
    pub current_input: Option<InputCode>,
}
