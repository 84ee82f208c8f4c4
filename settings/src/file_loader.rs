//! # Settings File Loading
//!
//! Loads defaults documents and override documents from TOML or YAML files.
//!
//! Supports automatic format detection based on file extension.

use crate::defaults::{DefaultsSource, DocumentFormat};
use crate::overrides::Overrides;
use errors::SettingsError;
use std::path::{Path, PathBuf};

/// Detect the document format from a file extension.
///
/// - `.toml`: TOML format
/// - `.yaml`: YAML format
/// - `.yml`: YAML format
pub fn detect_format(path: &Path) -> Result<DocumentFormat, SettingsError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SettingsError::UnsupportedFormat {
            extension: String::new()
        })?;

    match extension.to_lowercase().as_str() {
        "toml" => Ok(DocumentFormat::Toml),
        "yaml" | "yml" => Ok(DocumentFormat::Yaml),
        other => Err(SettingsError::UnsupportedFormat {
            extension: other.to_string()
        })
    }
}

/// A defaults document stored on disk, in place of the bundled one.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Lets deployments and tests run against an alternate defaults document
/// with the same `settings:` layout as the bundled resource.
///
/// ## Usage
/// ```rust,no_run
/// use settings::{DefaultsLoader, FileDefaults, SettingsRegistry};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let loader = DefaultsLoader::new(FileDefaults::new("settings.yaml")?);
///     let registry = SettingsRegistry::from_loader(&loader)?;
///     println!("{:?}", registry.default_settings());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileDefaults {
    path: PathBuf,
    format: DocumentFormat
}

impl FileDefaults {
    /// Fails when the extension is not a supported format.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let format = detect_format(&path)?;
        Ok(Self { path, format })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DefaultsSource for FileDefaults {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn read(&self) -> Result<String, SettingsError> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| SettingsError::resource_load(self.path.display().to_string(), e))
    }
}

/// Load an overrides document: a flat mapping of option name to value.
///
/// ## Error Handling
/// Returns `SettingsError` for:
/// - File not found or unreadable (`ResourceLoad`)
/// - Invalid file extension (`UnsupportedFormat`)
/// - Parse errors for detected format (`ResourceLoad`)
pub fn load_overrides_from_file(path: &Path) -> Result<Overrides, SettingsError> {
    let format = detect_format(path)?;
    let resource = path.display().to_string();
    let contents =
        std::fs::read_to_string(path).map_err(|e| SettingsError::resource_load(&resource, e))?;

    let overrides = match format {
        DocumentFormat::Yaml => {
            serde_yaml::from_str(&contents).map_err(|e| SettingsError::resource_load(&resource, e))?
        }
        DocumentFormat::Toml => {
            toml::from_str(&contents).map_err(|e| SettingsError::resource_load(&resource, e))?
        }
    };

    tracing::debug!("Loaded settings overrides from {}", resource);
    Ok(overrides)
}
