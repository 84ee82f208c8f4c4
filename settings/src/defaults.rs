//! # Defaults Loader
//!
//! Reads a declarative defaults document once and caches the parsed
//! mapping for the lifetime of the loader.
//!
//! The process-wide loader reads the document compiled into this crate
//! (`data/settings.yaml`). Other sources, such as a file on disk or a test
//! double, plug in through [`DefaultsSource`].

use crate::value::SettingValue;
use errors::SettingsError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Name under which the bundled defaults document is reported in logs and
/// errors.
pub const BUNDLED_RESOURCE: &str = "data/settings.yaml";

const BUNDLED_DOCUMENT: &str = include_str!("../data/settings.yaml");

/// Serialization formats a defaults or overrides document may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml
}

/// Immutable mapping of option name to default value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultsMapping {
    values: BTreeMap<String, SettingValue>
}

impl DefaultsMapping {
    #[must_use]
    pub fn new(values: BTreeMap<String, SettingValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.values.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }
}

#[derive(Debug, Deserialize)]
struct DefaultsDocument {
    #[serde(default)]
    settings: Option<BTreeMap<String, SettingValue>>
}

/// Parse a defaults document, returning the mapping found under its
/// top-level `settings` key. A missing or null `settings` key yields an
/// empty mapping.
pub fn parse_defaults(
    resource: &str,
    contents: &str,
    format: DocumentFormat
) -> Result<DefaultsMapping, SettingsError> {
    let document: DefaultsDocument = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(contents)
            .map_err(|e| SettingsError::resource_load(resource, e))?,
        DocumentFormat::Toml => {
            toml::from_str(contents).map_err(|e| SettingsError::resource_load(resource, e))?
        }
    };

    Ok(DefaultsMapping::new(document.settings.unwrap_or_default()))
}

/// Where a [`DefaultsLoader`] reads its document from.
pub trait DefaultsSource: Send + Sync {
    /// Stable name of the resource, used in logs and errors.
    fn name(&self) -> String;

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Yaml
    }

    /// Read the raw document.
    fn read(&self) -> Result<String, SettingsError>;
}

/// The defaults document shipped inside this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDefaults;

impl DefaultsSource for BundledDefaults {
    fn name(&self) -> String {
        BUNDLED_RESOURCE.to_string()
    }

    fn read(&self) -> Result<String, SettingsError> {
        Ok(BUNDLED_DOCUMENT.to_string())
    }
}

/// Loads a defaults document at most once and hands out the cached mapping.
///
/// Initialization is get-then-set: two threads racing on the first load may
/// both parse, but only one mapping is ever published and both parses
/// produce the same value. Failures are returned to the caller and leave the
/// cache empty.
#[derive(Debug)]
pub struct DefaultsLoader<S> {
    source: S,
    cache: OnceLock<Arc<DefaultsMapping>>
}

impl<S: DefaultsSource> DefaultsLoader<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            cache: OnceLock::new()
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether the document has already been parsed.
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn load(&self) -> Result<Arc<DefaultsMapping>, SettingsError> {
        if let Some(cached) = self.cache.get() {
            debug!("Using cached settings defaults from {}", self.source.name());
            return Ok(Arc::clone(cached));
        }

        let resource = self.source.name();
        let contents = self.source.read()?;
        let mapping = parse_defaults(&resource, &contents, self.source.format())?;
        info!(
            "Loaded {} settings defaults from {}",
            mapping.len(),
            resource
        );

        Ok(Arc::clone(self.cache.get_or_init(|| Arc::new(mapping))))
    }
}

static BUNDLED_LOADER: DefaultsLoader<BundledDefaults> = DefaultsLoader::new(BundledDefaults);

/// Load the bundled defaults, parsing them on first use only.
pub fn load_defaults() -> Result<Arc<DefaultsMapping>, SettingsError> {
    BUNDLED_LOADER.load()
}
