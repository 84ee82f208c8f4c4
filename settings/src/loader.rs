//! # Environment Variable Loader
//!
//! Reads settings overrides from environment variables.
//!
//! # Naming Convention
//! `<PREFIX><OPTION>`, e.g. `DATEPARSER_PREFER_DATES_FROM=past` with the
//! default prefix. Values are read as YAML scalars, so
//! `DATEPARSER_SKIP_TOKENS="[t, at]"` yields a list.

use crate::overrides::Overrides;
use crate::settings::Settings;
use crate::value::SettingValue;
use std::env;

/// Prefix used when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "DATEPARSER_";

/// Collect overrides for every known option that has a variable set.
///
/// Only names in [`Settings::OPTION_NAMES`] are consulted; unrelated
/// variables sharing the prefix are ignored. Variables that are not valid
/// unicode are skipped.
#[must_use]
pub fn overrides_from_env(prefix: &str) -> Overrides {
    let mut overrides = Overrides::new();
    for name in Settings::OPTION_NAMES {
        let key = format!("{prefix}{name}");
        if let Ok(raw) = env::var(&key) {
            tracing::debug!("Settings override {} from environment", key);
            overrides.insert(name, SettingValue::parse_scalar(&raw));
        }
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear(prefix: &str) {
        for name in Settings::OPTION_NAMES {
            unsafe {
                env::remove_var(format!("{prefix}{name}"));
            }
        }
    }

    #[test]
    #[serial]
    fn test_overrides_from_env_empty() {
        clear(DEFAULT_ENV_PREFIX);
        let overrides = overrides_from_env(DEFAULT_ENV_PREFIX);
        assert!(overrides.is_empty());
    }

    #[test]
    #[serial]
    fn test_overrides_from_env_values() {
        clear(DEFAULT_ENV_PREFIX);
        unsafe {
            env::set_var("DATEPARSER_PREFER_DATES_FROM", "past");
            env::set_var("DATEPARSER_STRICT_PARSING", "true");
            env::set_var("DATEPARSER_SKIP_TOKENS", "[t, at]");
            env::set_var("DATEPARSER_LANGUAGES", "[en]");
        }

        let overrides = overrides_from_env(DEFAULT_ENV_PREFIX);
        assert_eq!(overrides.len(), 3);
        assert_eq!(
            overrides.get("PREFER_DATES_FROM"),
            Some(&SettingValue::from("past"))
        );
        assert_eq!(
            overrides.get("STRICT_PARSING"),
            Some(&SettingValue::Bool(true))
        );
        assert_eq!(
            overrides.get("SKIP_TOKENS"),
            Some(&SettingValue::from(vec!["t", "at"]))
        );

        clear(DEFAULT_ENV_PREFIX);
        unsafe {
            env::remove_var("DATEPARSER_LANGUAGES");
        }
    }

    #[test]
    #[serial]
    fn test_overrides_from_env_custom_prefix() {
        clear("MYAPP_");
        unsafe {
            env::set_var("MYAPP_TIMEZONE", "UTC");
        }

        let overrides = overrides_from_env("MYAPP_");
        assert_eq!(overrides.get("TIMEZONE"), Some(&SettingValue::from("UTC")));

        clear("MYAPP_");
    }
}
