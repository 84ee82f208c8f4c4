//! # Date-Parser Settings
//!
//! Runtime settings registry for the date parser.
//!
//! This crate provides:
//! - Defaults loaded once from a bundled YAML document (or any other
//!   [`DefaultsSource`])
//! - Typed, immutable [`Settings`] built fresh or derived with `replace`
//! - Deterministic cache keys for sets of overrides
//! - [`SettingsRegistry`] to resolve whatever a call site passes as its
//!   settings argument
//! - Override layers from files and environment variables

pub mod defaults;
pub mod file_loader;
pub mod key;
pub mod loader;
pub mod overrides;
pub mod registry;
pub mod settings;
pub mod value;

pub use defaults::{
    BUNDLED_RESOURCE, BundledDefaults, DefaultsLoader, DefaultsMapping, DefaultsSource,
    DocumentFormat, load_defaults, parse_defaults,
};
pub use errors::SettingsError;
pub use file_loader::{FileDefaults, detect_format, load_overrides_from_file};
pub use key::{DEFAULT_KEY, get_key};
pub use loader::{DEFAULT_ENV_PREFIX, overrides_from_env};
pub use overrides::{Overrides, merge_layers};
pub use registry::{SettingsArg, SettingsRegistry};
pub use settings::{PreferDatesFrom, PreferDayOfMonth, Settings};
pub use value::SettingValue;
