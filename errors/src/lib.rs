//! # Settings Errors
//!
//! Error handling for the date-parser settings registry.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields on every variant so messages carry their context

use thiserror::Error;

/// Settings registry errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings resource {resource}: {reason}")]
    ResourceLoad { resource: String, reason: String },

    #[error("settings can only be either a mapping or a Settings instance, got {found}")]
    TypeMismatch { found: String },

    #[error("Unknown settings option: {name}")]
    UnknownOption { name: String },

    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },

    #[error("Invalid override assignment: {assignment} (expected NAME=value)")]
    InvalidAssignment { assignment: String },

    #[error("Unsupported settings document format: {extension}")]
    UnsupportedFormat { extension: String }
}

impl SettingsError {
    /// Build a `ResourceLoad` error from any displayable cause.
    pub fn resource_load(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceLoad {
            resource: resource.into(),
            reason: reason.to_string()
        }
    }

    /// Whether this error came from reading or parsing a defaults resource.
    #[must_use]
    pub fn is_resource_failure(&self) -> bool {
        matches!(self, Self::ResourceLoad { .. } | Self::UnsupportedFormat { .. })
    }
}

/// Result alias used across the settings crates.
pub type SettingsResult<T> = Result<T, SettingsError>;
