use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Well-known keys in the `app_settings` table.
pub mod keys {
    pub const WINDOW_BACKGROUND_COLOR: &str = "Window.BackgroundColor";
    pub const WINDOW_OPACITY: &str = "Window.Opacity";
    pub const WINDOW_ALWAYS_ON_TOP: &str = "Window.AlwaysOnTop";
    pub const START_MINIMIZED: &str = "App.StartMinimized";
    pub const LAST_BACKUP_AT: &str = "Backup.LastBackupAt";
}

/// A raw row of the key/value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: i64,
}

/// Which typed interpretation to apply to a stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Text,
    Bool,
    Int,
    Double,
    DateTime,
}

/// A setting value with its kind attached.
///
/// Values are stored as canonical strings and coerced back on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SettingValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    DateTime(DateTime<Utc>),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Text(_) => SettingKind::Text,
            SettingValue::Bool(_) => SettingKind::Bool,
            SettingValue::Int(_) => SettingKind::Int,
            SettingValue::Double(_) => SettingKind::Double,
            SettingValue::DateTime(_) => SettingKind::DateTime,
        }
    }

    /// The string written to the store.
    pub fn to_canonical(&self) -> String {
        match self {
            SettingValue::Text(s) => s.clone(),
            SettingValue::Bool(b) => format_bool(*b),
            SettingValue::Int(i) => format_int(*i),
            SettingValue::Double(d) => format_double(*d),
            SettingValue::DateTime(dt) => format_datetime(dt),
        }
    }

    /// Interprets `raw` as `kind`. Returns `None` when the text does not parse.
    pub fn parse(kind: SettingKind, raw: &str) -> Option<SettingValue> {
        match kind {
            SettingKind::Text => Some(SettingValue::Text(raw.to_string())),
            SettingKind::Bool => parse_bool(raw).map(SettingValue::Bool),
            SettingKind::Int => parse_int(raw).map(SettingValue::Int),
            SettingKind::Double => parse_double(raw).map(SettingValue::Double),
            SettingKind::DateTime => parse_datetime(raw).map(SettingValue::DateTime),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            SettingValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            SettingValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

pub fn format_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn format_int(value: i64) -> String {
    value.to_string()
}

pub fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Shortest decimal form that parses back to the same `f64`.
pub fn format_double(value: f64) -> String {
    value.to_string()
}

pub fn parse_double(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// RFC 3339 in UTC, with as many fractional digits as needed to round-trip.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
