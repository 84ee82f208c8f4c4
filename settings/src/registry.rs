//! # Settings Registry
//!
//! Owns the loaded defaults and the process default [`Settings`], and turns
//! whatever a call site passes as its settings argument into resolved
//! settings.
//!
//! Consumers receive a registry (or resolved settings) explicitly. A lazily
//! built [`SettingsRegistry::global`] exists for call sites that have no
//! registry to thread through.

use crate::defaults::{DefaultsLoader, DefaultsMapping, DefaultsSource, load_defaults};
use crate::overrides::Overrides;
use crate::settings::Settings;
use dashmap::DashMap;
use errors::SettingsError;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// What a call site supplied as its settings argument.
#[derive(Debug, Clone, Default)]
pub enum SettingsArg {
    /// Nothing supplied: use the process default.
    #[default]
    Absent,

    /// Overrides to apply on top of the process default.
    Overrides(Overrides),

    /// Already resolved settings, used as is.
    Resolved(Arc<Settings>),

    /// An untyped value from a dynamic boundary (JSON payloads, scripting
    /// hosts). Only `null` and objects are accepted.
    Dynamic(serde_json::Value)
}

impl From<Overrides> for SettingsArg {
    fn from(overrides: Overrides) -> Self {
        Self::Overrides(overrides)
    }
}

impl From<Settings> for SettingsArg {
    fn from(settings: Settings) -> Self {
        Self::Resolved(Arc::new(settings))
    }
}

impl From<Arc<Settings>> for SettingsArg {
    fn from(settings: Arc<Settings>) -> Self {
        Self::Resolved(settings)
    }
}

impl From<&Arc<Settings>> for SettingsArg {
    fn from(settings: &Arc<Settings>) -> Self {
        Self::Resolved(Arc::clone(settings))
    }
}

impl From<serde_json::Value> for SettingsArg {
    fn from(value: serde_json::Value) -> Self {
        Self::Dynamic(value)
    }
}

impl<T: Into<SettingsArg>> From<Option<T>> for SettingsArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object"
    }
}

/// Defaults plus the process default settings built from them.
///
/// Settings derived from overrides are interned by their cache key, so
/// resolving equal overrides twice returns the same `Arc`. Clones of a
/// registry share that cache.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Constructed once at startup and passed by reference to whatever needs
/// settings. Every instance it hands out is immutable.
///
/// ## Usage
/// ```rust,no_run
/// use settings::{Overrides, SettingsRegistry};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = SettingsRegistry::bundled()?;
///     let strict = registry.apply(
///         Overrides::new().with("STRICT_PARSING", true),
///         |settings| settings.strict_parsing,
///     )?;
///     assert!(strict);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SettingsRegistry {
    defaults: Arc<DefaultsMapping>,
    default_settings: Arc<Settings>,
    derived: Arc<DashMap<String, Arc<Settings>>>
}

static GLOBAL_REGISTRY: OnceLock<SettingsRegistry> = OnceLock::new();

impl SettingsRegistry {
    /// Build a registry from an already loaded defaults mapping.
    pub fn new(defaults: Arc<DefaultsMapping>) -> Result<Self, SettingsError> {
        let default_settings = Settings::new(&defaults, &Overrides::new())?;
        Ok(Self {
            defaults,
            default_settings: Arc::new(default_settings),
            derived: Arc::new(DashMap::new())
        })
    }

    /// Build a registry from the bundled defaults document.
    pub fn bundled() -> Result<Self, SettingsError> {
        Self::new(load_defaults()?)
    }

    /// Build a registry from any defaults loader.
    pub fn from_loader<S: DefaultsSource>(loader: &DefaultsLoader<S>) -> Result<Self, SettingsError> {
        Self::new(loader.load()?)
    }

    /// The process-wide registry over the bundled defaults, built on first
    /// use. A failed build is returned to the caller and retried on the next
    /// call.
    pub fn global() -> Result<&'static Self, SettingsError> {
        if let Some(registry) = GLOBAL_REGISTRY.get() {
            return Ok(registry);
        }
        let registry = Self::bundled()?;
        Ok(GLOBAL_REGISTRY.get_or_init(|| registry))
    }

    #[must_use]
    pub fn defaults(&self) -> &DefaultsMapping {
        &self.defaults
    }

    /// The default settings; always flagged default.
    #[must_use]
    pub fn default_settings(&self) -> Arc<Settings> {
        Arc::clone(&self.default_settings)
    }

    /// Fresh settings from this registry's defaults and `overrides`.
    pub fn construct(&self, overrides: &Overrides) -> Result<Settings, SettingsError> {
        Settings::new(&self.defaults, overrides)
    }

    /// Resolve a call site's settings argument.
    ///
    /// - absent or `null`: the default settings
    /// - overrides or a JSON object: the default settings with those
    ///   overrides applied (never flagged default)
    /// - resolved settings: returned unchanged
    /// - any other dynamic value: `SettingsError::TypeMismatch`
    pub fn resolve(&self, arg: impl Into<SettingsArg>) -> Result<Arc<Settings>, SettingsError> {
        match arg.into() {
            SettingsArg::Absent => Ok(self.default_settings()),
            SettingsArg::Resolved(settings) => Ok(settings),
            SettingsArg::Overrides(overrides) => self.derive(&overrides),
            SettingsArg::Dynamic(serde_json::Value::Null) => Ok(self.default_settings()),
            SettingsArg::Dynamic(value @ serde_json::Value::Object(_)) => {
                let overrides: Overrides =
                    serde_json::from_value(value).map_err(|e| SettingsError::InvalidValue {
                        reason: e.to_string()
                    })?;
                self.derive(&overrides)
            }
            SettingsArg::Dynamic(other) => {
                let found = json_kind(&other);
                warn!("Rejected settings argument of type {}", found);
                Err(SettingsError::TypeMismatch {
                    found: found.to_string()
                })
            }
        }
    }

    /// Resolve `arg`, then run `consumer` once with the resolved settings.
    /// `consumer` is not run when resolution fails.
    pub fn apply<F, R>(&self, arg: impl Into<SettingsArg>, consumer: F) -> Result<R, SettingsError>
    where
        F: FnOnce(&Settings) -> R
    {
        let settings = self.resolve(arg)?;
        Ok(consumer(&settings))
    }

    /// Number of distinct derived settings interned so far.
    #[must_use]
    pub fn derived_count(&self) -> usize {
        self.derived.len()
    }

    fn derive(&self, overrides: &Overrides) -> Result<Arc<Settings>, SettingsError> {
        let key = overrides.key();
        if let Some(hit) = self.derived.get(&key) {
            debug!("Reusing derived settings for key {}", key);
            return Ok(Arc::clone(hit.value()));
        }

        let settings = Arc::new(self.default_settings.replace(overrides)?);
        debug!("Derived settings for key {}", key);
        Ok(Arc::clone(self.derived.entry(key).or_insert(settings).value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::tests::CountingSource;
    use crate::settings::PreferDatesFrom;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> SettingsRegistry {
        SettingsRegistry::bundled().unwrap()
    }

    #[test]
    fn test_absent_argument_uses_default_instance() {
        let registry = registry();
        let resolved = registry.resolve(SettingsArg::Absent).unwrap();
        assert!(Arc::ptr_eq(&resolved, &registry.default_settings()));
        assert!(resolved.is_default());

        let resolved = registry.resolve(None::<Overrides>).unwrap();
        assert!(Arc::ptr_eq(&resolved, &registry.default_settings()));

        let resolved = registry.resolve(json!(null)).unwrap();
        assert!(Arc::ptr_eq(&resolved, &registry.default_settings()));
    }

    #[test]
    fn test_overrides_derive_from_default() {
        let registry = registry();
        let resolved = registry
            .resolve(Overrides::new().with("PREFER_DATES_FROM", "past"))
            .unwrap();

        assert!(!resolved.is_default());
        assert_eq!(resolved.prefer_dates_from, PreferDatesFrom::Past);

        let mut expected = registry.default_settings().to_mapping().unwrap();
        expected.insert(
            "PREFER_DATES_FROM".to_string(),
            crate::SettingValue::from("past")
        );
        assert_eq!(resolved.to_mapping().unwrap(), expected);
    }

    #[test]
    fn test_json_object_derives_from_default() {
        let registry = registry();
        let resolved = registry
            .resolve(json!({"PREFER_DATES_FROM": "past"}))
            .unwrap();
        assert_eq!(resolved.prefer_dates_from, PreferDatesFrom::Past);
        assert!(!resolved.is_default());
    }

    #[test]
    fn test_empty_mapping_is_not_default() {
        let registry = registry();
        let resolved = registry.resolve(json!({})).unwrap();
        assert!(!resolved.is_default());
        assert_eq!(
            resolved.to_mapping().unwrap(),
            registry.default_settings().to_mapping().unwrap()
        );
    }

    #[test]
    fn test_resolved_settings_pass_through() {
        let registry = registry();
        let custom = Arc::new(
            registry
                .construct(&Overrides::new().with("STRICT_PARSING", true))
                .unwrap()
        );
        let resolved = registry.resolve(&custom).unwrap();
        assert!(Arc::ptr_eq(&resolved, &custom));
    }

    #[test]
    fn test_wrong_type_never_runs_consumer() {
        let registry = registry();
        let calls = AtomicUsize::new(0);

        for bad in [json!(123), json!("past"), json!(true), json!(["past"])] {
            let result = registry.apply(bad, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
            assert!(matches!(result, Err(SettingsError::TypeMismatch { .. })));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_type_mismatch_names_found_type() {
        let err = registry().resolve(json!(123)).unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { ref found } if found == "number"));
    }

    #[test]
    fn test_apply_runs_consumer_once() {
        let registry = registry();
        let calls = AtomicUsize::new(0);

        let from = registry
            .apply(json!({"PREFER_DATES_FROM": "future"}), |settings| {
                calls.fetch_add(1, Ordering::SeqCst);
                settings.prefer_dates_from
            })
            .unwrap();

        assert_eq!(from, PreferDatesFrom::Future);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_override_fails_before_consumer() {
        let registry = registry();
        let calls = AtomicUsize::new(0);
        let result = registry.apply(json!({"LANGUAGES": ["en"]}), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        assert!(matches!(result, Err(SettingsError::UnknownOption { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_does_not_touch_default_instance() {
        let registry = registry();
        let before = registry.default_settings().to_mapping().unwrap();
        registry
            .resolve(Overrides::new().with("TIMEZONE", "UTC"))
            .unwrap();
        assert_eq!(registry.default_settings().to_mapping().unwrap(), before);
        assert!(registry.default_settings().is_default());
    }

    #[test]
    fn test_registry_from_loader_reads_once() {
        let loader = DefaultsLoader::new(CountingSource::new(
            "settings:\n  PREFER_DATES_FROM: future\n  SKIP_TOKENS: [t]\n"
        ));

        for _ in 0..20 {
            let registry = SettingsRegistry::from_loader(&loader).unwrap();
            let settings = registry
                .construct(&Overrides::new().with("STRICT_PARSING", true))
                .unwrap();
            assert_eq!(settings.prefer_dates_from, PreferDatesFrom::Future);
        }

        assert_eq!(loader.source().reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_equal_overrides_resolve_to_same_instance() {
        let registry = registry();
        let first = registry
            .resolve(Overrides::new().with("PREFER_DATES_FROM", "past"))
            .unwrap();
        let second = registry
            .resolve(json!({"PREFER_DATES_FROM": "past"}))
            .unwrap();
        let other = registry
            .resolve(Overrides::new().with("PREFER_DATES_FROM", "future"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.derived_count(), 2);
    }

    #[test]
    fn test_failed_derivation_is_not_interned() {
        let registry = registry();
        let result = registry.resolve(Overrides::new().with("STRICT_PARSING", "sometimes"));
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
        assert_eq!(registry.derived_count(), 0);
    }

    #[test]
    fn test_cloned_registry_shares_interned_settings() {
        let registry = registry();
        let clone = registry.clone();
        let first = registry
            .resolve(Overrides::new().with("TIMEZONE", "UTC"))
            .unwrap();
        let second = clone
            .resolve(Overrides::new().with("TIMEZONE", "UTC"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_global_registry_is_shared() {
        let first = SettingsRegistry::global().unwrap();
        let second = SettingsRegistry::global().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(first.default_settings().is_default());
    }
}
