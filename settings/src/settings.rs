//! # Settings
//!
//! The resolved, typed view of every date-parser option.
//!
//! A [`Settings`] value is built either fresh, from a defaults mapping plus
//! overrides ([`Settings::new`]), or derived from an existing instance
//! ([`Settings::replace`]). Both paths go through the same serde schema, so
//! unknown option names and mistyped values are rejected at construction.

use crate::defaults::DefaultsMapping;
use crate::overrides::Overrides;
use crate::value::SettingValue;
use errors::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which period to prefer when a date is ambiguous (e.g. a bare weekday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreferDatesFrom {
    #[default]
    CurrentPeriod,
    Future,
    Past
}

/// Which day to use when a date names only a month and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreferDayOfMonth {
    #[default]
    Current,
    First,
    Last
}

impl fmt::Display for PreferDatesFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CurrentPeriod => "current_period",
            Self::Future => "future",
            Self::Past => "past"
        })
    }
}

impl fmt::Display for PreferDayOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Current => "current",
            Self::First => "first",
            Self::Last => "last"
        })
    }
}

/// Resolved date-parser settings.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Carries one typed field per option so consumers never see a partially
/// resolved configuration. Field names serialize as the upper-case option
/// names used in defaults documents and override mappings.
///
/// ## Usage
/// ```rust,no_run
/// use settings::{Overrides, PreferDatesFrom, SettingsRegistry};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = SettingsRegistry::bundled()?;
///     let base = registry.default_settings();
///     let derived = base.replace(&Overrides::new().with("PREFER_DATES_FROM", "past"))?;
///     assert_eq!(derived.prefer_dates_from, PreferDatesFrom::Past);
///     assert!(!derived.is_default());
///     Ok(())
/// }
/// ```
///
/// ## Fallbacks
/// An option missing from the defaults document takes the value of its
/// field default below, so an empty document still yields complete
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(rename = "PREFER_DATES_FROM", default)]
    pub prefer_dates_from: PreferDatesFrom,

    #[serde(rename = "SUPPORT_BEFORE_COMMON_ERA", default)]
    pub support_before_common_era: bool,

    #[serde(rename = "PREFER_DAY_OF_MONTH", default)]
    pub prefer_day_of_month: PreferDayOfMonth,

    #[serde(rename = "SKIP_TOKENS", default = "default_skip_tokens")]
    pub skip_tokens: Vec<String>,

    #[serde(rename = "SKIP_TOKENS_PARSER", default = "default_skip_tokens_parser")]
    pub skip_tokens_parser: Vec<String>,

    #[serde(rename = "TIMEZONE", default = "default_timezone")]
    pub timezone: String,

    #[serde(rename = "TO_TIMEZONE", default)]
    pub to_timezone: Option<String>,

    #[serde(rename = "RETURN_AS_TIMEZONE_AWARE", default)]
    pub return_as_timezone_aware: bool,

    #[serde(rename = "PREFER_LANGUAGE_DATE_ORDER", default = "default_true")]
    pub prefer_language_date_order: bool,

    #[serde(rename = "DATE_ORDER", default)]
    pub date_order: Option<String>,

    #[serde(rename = "STRICT_PARSING", default)]
    pub strict_parsing: bool,

    #[serde(skip)]
    is_default: bool
}

fn default_skip_tokens() -> Vec<String> {
    vec!["t".to_string()]
}

fn default_skip_tokens_parser() -> Vec<String> {
    ["t", "year", "hour", "minute"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_timezone() -> String {
    "local".to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Every option name the schema accepts, in declaration order.
    pub const OPTION_NAMES: [&'static str; 11] = [
        "PREFER_DATES_FROM",
        "SUPPORT_BEFORE_COMMON_ERA",
        "PREFER_DAY_OF_MONTH",
        "SKIP_TOKENS",
        "SKIP_TOKENS_PARSER",
        "TIMEZONE",
        "TO_TIMEZONE",
        "RETURN_AS_TIMEZONE_AWARE",
        "PREFER_LANGUAGE_DATE_ORDER",
        "DATE_ORDER",
        "STRICT_PARSING",
    ];

    /// Whether `name` is an option this schema knows.
    #[must_use]
    pub fn is_known_option(name: &str) -> bool {
        Self::OPTION_NAMES.contains(&name)
    }

    /// Build fresh settings: `defaults` merged with `overrides`, overrides
    /// winning. The result is flagged default only when `overrides` is
    /// empty.
    pub fn new(defaults: &DefaultsMapping, overrides: &Overrides) -> Result<Self, SettingsError> {
        let mut merged = defaults.as_map().clone();
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut settings = Self::from_mapping(merged)?;
        settings.is_default = overrides.is_empty();
        Ok(settings)
    }

    /// Derive new settings from this instance.
    ///
    /// Options not named in `overrides` keep this instance's values, so
    /// chained calls compose. The result is never flagged default, even
    /// when nothing changed.
    pub fn replace(&self, overrides: &Overrides) -> Result<Self, SettingsError> {
        let mut merged = self.to_mapping()?;
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut settings = Self::from_mapping(merged)?;
        settings.is_default = false;
        Ok(settings)
    }

    /// Whether these are the untouched process defaults.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Look up one option by name. `Ok(None)` for names outside the
    /// schema.
    pub fn get(&self, name: &str) -> Result<Option<SettingValue>, SettingsError> {
        if !Self::is_known_option(name) {
            return Ok(None);
        }
        Ok(self.to_mapping()?.remove(name))
    }

    /// All option values keyed by option name.
    pub fn to_mapping(&self) -> Result<BTreeMap<String, SettingValue>, SettingsError> {
        let value = serde_json::to_value(self).map_err(|e| SettingsError::InvalidValue {
            reason: e.to_string()
        })?;
        serde_json::from_value(value).map_err(|e| SettingsError::InvalidValue {
            reason: e.to_string()
        })
    }

    fn from_mapping(mapping: BTreeMap<String, SettingValue>) -> Result<Self, SettingsError> {
        if let Some(unknown) = mapping.keys().find(|name| !Self::is_known_option(name)) {
            return Err(SettingsError::UnknownOption {
                name: unknown.clone()
            });
        }

        // serde_json writes non-finite floats as null, which would let them
        // pass as an unset nullable option.
        if let Some((name, value)) = mapping.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SettingsError::InvalidValue {
                reason: format!("{name} must be a finite value, got {value}")
            });
        }

        let value = serde_json::to_value(&mapping).map_err(|e| SettingsError::InvalidValue {
            reason: e.to_string()
        })?;
        serde_json::from_value(value).map_err(|e| SettingsError::InvalidValue {
            reason: e.to_string()
        })
    }
}
