//! # Setting Values
//!
//! Untyped option values as they appear in defaults documents and override
//! mappings, before they are checked against the typed [`crate::Settings`]
//! schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single option value: scalar, string, or sequence.
///
/// Deserialization is untagged, so the same type reads YAML, TOML and JSON
/// documents. Variant order matters: booleans and integers are tried before
/// floats and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<SettingValue>)
}

impl SettingValue {
    /// Name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list"
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// False for NaN or infinite floats, including ones nested in lists.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(x) => x.is_finite(),
            Self::List(items) => items.iter().all(Self::is_finite),
            _ => true
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None
        }
    }

    /// Parse a raw string the way a YAML scalar would be read.
    ///
    /// Surrounding whitespace is ignored. `true` becomes a bool, `3` an
    /// integer, `[a, b]` a list and anything unparsable falls back to the
    /// trimmed string. Numeric-looking strings such as `0500` read as
    /// numbers; quote them (`'0500'`) to keep them strings.
    #[must_use]
    pub fn parse_scalar(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::String(String::new());
        }
        serde_yaml::from_str::<Self>(trimmed).unwrap_or_else(|_| Self::String(trimmed.to_string()))
    }
}

/// Canonical rendering used for cache keys.
///
/// Strings are quoted and floats always carry a fractional part, so values
/// of different kinds never render identically.
impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<SettingValue>> From<Vec<T>> for SettingValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<SettingValue>> From<Option<T>> for SettingValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
