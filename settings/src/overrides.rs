//! # Overrides
//!
//! Caller-supplied option values that take precedence over defaults for one
//! settings instance.
//!
//! # Precedence Order
//! When several override layers are combined with [`merge_layers`], later
//! layers win:
//! 1. `--set` style assignments (highest priority)
//! 2. Environment variables
//! 3. Override file
//! 4. Defaults document (lowest priority, applied by [`crate::Settings::new`])

use crate::key::get_key;
use crate::value::SettingValue;
use errors::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A set of named option overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides {
    entries: BTreeMap<String, SettingValue>
}

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert an override, returning the value it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SettingValue>
    ) -> Option<SettingValue> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<SettingValue> {
        self.entries.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, SettingValue> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Cache key for this set of overrides. See [`get_key`].
    #[must_use]
    pub fn key(&self) -> String {
        get_key(self)
    }

    /// Parse `NAME=value` assignments. Values are read as YAML scalars, so
    /// `STRICT_PARSING=true` yields a bool and `SKIP_TOKENS=[t, at]` a list.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let mut overrides = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (name, raw) =
                assignment
                    .split_once('=')
                    .ok_or_else(|| SettingsError::InvalidAssignment {
                        assignment: assignment.to_string()
                    })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(SettingsError::InvalidAssignment {
                    assignment: assignment.to_string()
                });
            }
            overrides.insert(name, SettingValue::parse_scalar(raw));
        }
        Ok(overrides)
    }

    /// Apply `layer` on top of these overrides. Returns the list of changes
    /// as `NAME = value` strings.
    pub fn merge(&mut self, layer: &Overrides) -> Vec<String> {
        let mut changes = Vec::new();
        for (name, value) in layer.iter() {
            if self.entries.get(name) != Some(value) {
                changes.push(format!("{name} = {value}"));
                self.entries.insert(name.clone(), value.clone());
            }
        }
        changes
    }
}

impl<K, V> FromIterator<(K, V)> for Overrides
where
    K: Into<String>,
    V: Into<SettingValue>
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut overrides = Self::new();
        for (name, value) in iter {
            overrides.insert(name, value);
        }
        overrides
    }
}

impl<'a> IntoIterator for &'a Overrides {
    type Item = (&'a String, &'a SettingValue);
    type IntoIter = btree_map::Iter<'a, String, SettingValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Merge override layers in precedence order (lowest first), logging what
/// each named layer changed.
pub fn merge_layers<'a, I>(layers: I) -> Overrides
where
    I: IntoIterator<Item = (&'a str, &'a Overrides)>
{
    let mut merged = Overrides::new();
    for (source_name, layer) in layers {
        let changes = merged.merge(layer);
        if !changes.is_empty() {
            tracing::info!("Settings overrides from {}: {:?}", source_name, changes);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let overrides = Overrides::new()
            .with("PREFER_DATES_FROM", "past")
            .with("STRICT_PARSING", true);

        assert_eq!(overrides.len(), 2);
        assert!(overrides.contains("STRICT_PARSING"));
        assert_eq!(
            overrides.get("PREFER_DATES_FROM"),
            Some(&SettingValue::from("past"))
        );
        assert_eq!(
            overrides.names().collect::<Vec<_>>(),
            vec!["PREFER_DATES_FROM", "STRICT_PARSING"]
        );
    }

    #[test]
    fn test_from_assignments() {
        let overrides =
            Overrides::from_assignments(["PREFER_DATES_FROM=future", "SKIP_TOKENS=[t, at]"])
                .unwrap();
        assert_eq!(
            overrides.get("PREFER_DATES_FROM"),
            Some(&SettingValue::from("future"))
        );
        assert_eq!(
            overrides.get("SKIP_TOKENS"),
            Some(&SettingValue::from(vec!["t", "at"]))
        );
    }

    #[test]
    fn test_from_assignments_rejects_missing_equals() {
        let result = Overrides::from_assignments(["PREFER_DATES_FROM"]);
        assert!(matches!(
            result,
            Err(SettingsError::InvalidAssignment { .. })
        ));

        let result = Overrides::from_assignments(["=past"]);
        assert!(matches!(
            result,
            Err(SettingsError::InvalidAssignment { .. })
        ));
    }

    #[test]
    fn test_merge_reports_changes_only() {
        let mut base = Overrides::new()
            .with("PREFER_DATES_FROM", "past")
            .with("STRICT_PARSING", false);
        let layer = Overrides::new()
            .with("PREFER_DATES_FROM", "past")
            .with("STRICT_PARSING", true);

        let changes = base.merge(&layer);
        assert_eq!(changes, vec!["STRICT_PARSING = true".to_string()]);
        assert_eq!(base.get("STRICT_PARSING"), Some(&SettingValue::Bool(true)));
    }

    #[test]
    fn test_merge_layers_later_wins() {
        let file = Overrides::new()
            .with("PREFER_DATES_FROM", "past")
            .with("TIMEZONE", "UTC");
        let env = Overrides::new().with("PREFER_DATES_FROM", "future");
        let cli = Overrides::new().with("STRICT_PARSING", true);

        let merged = merge_layers([("file", &file), ("env", &env), ("cli", &cli)]);
        assert_eq!(
            merged.get("PREFER_DATES_FROM"),
            Some(&SettingValue::from("future"))
        );
        assert_eq!(merged.get("TIMEZONE"), Some(&SettingValue::from("UTC")));
        assert_eq!(merged.get("STRICT_PARSING"), Some(&SettingValue::Bool(true)));
    }

    #[test]
    fn test_from_iterator() {
        let overrides: Overrides = [("TIMEZONE", "UTC"), ("TO_TIMEZONE", "EST")]
            .into_iter()
            .collect();
        assert_eq!(overrides.len(), 2);
    }

    #[test]
    fn test_deserialize_from_json_object() {
        let overrides: Overrides =
            serde_json::from_value(serde_json::json!({"PREFER_DATES_FROM": "past"})).unwrap();
        assert_eq!(
            overrides.get("PREFER_DATES_FROM"),
            Some(&SettingValue::from("past"))
        );
    }
}
