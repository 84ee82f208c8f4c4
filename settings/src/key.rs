//! # Cache Keys
//!
//! Derives a short, deterministic identifier from a set of overrides so
//! result caches can partition by behavior without comparing whole
//! settings objects.

use crate::overrides::Overrides;

/// Key returned for an empty set of overrides.
pub const DEFAULT_KEY: &str = "default";

/// Compute the cache key for `overrides`.
///
/// Each entry renders as `NAME-value` using the canonical value form from
/// [`crate::SettingValue`]'s `Display`. The fragments are sorted, joined and
/// hashed with MD5, giving 32 lowercase hex characters. The result depends
/// only on the content of `overrides`, never on insertion order.
#[must_use]
pub fn get_key(overrides: &Overrides) -> String {
    if overrides.is_empty() {
        return DEFAULT_KEY.to_string();
    }

    let mut fragments: Vec<String> = overrides
        .iter()
        .map(|(name, value)| format!("{name}-{value}"))
        .collect();
    fragments.sort();

    format!("{:x}", md5::compute(fragments.concat()))
}
