//! Application configuration management

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::services::format_catalog::FormatCatalog;
use crate::services::profile_catalog::ProfileCatalog;

const CONFIG_DIR_NAME: &str = "librarian";
const PROFILES_FILE: &str = "quality_profiles.yaml";
const FORMATS_FILE: &str = "custom_formats.yaml";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn from_arg(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" | "plain" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// User quality profiles YAML, layered on the built-in presets
    pub quality_profiles_path: Option<PathBuf>,

    /// Extra custom formats YAML, layered on the built-in catalog
    pub custom_formats_path: Option<PathBuf>,

    /// Profile used when a command does not name one
    pub default_profile: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config_dir = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME));

        let log_format = match env::var("LOG_FORMAT") {
            Ok(value) => LogFormat::from_arg(&value)
                .with_context(|| format!("Invalid LOG_FORMAT: {}", value))?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            quality_profiles_path: definition_path(
                env::var("QUALITY_PROFILES_PATH").ok(),
                config_dir.as_deref(),
                PROFILES_FILE,
            ),

            custom_formats_path: definition_path(
                env::var("CUSTOM_FORMATS_PATH").ok(),
                config_dir.as_deref(),
                FORMATS_FILE,
            ),

            default_profile: env::var("DEFAULT_QUALITY_PROFILE")
                .unwrap_or_else(|_| "best".to_string()),

            log_format,
        })
    }

    /// Built-in format catalog extended with the user's formats, if any
    pub fn load_format_catalog(&self) -> Result<Arc<FormatCatalog>> {
        let builtin = FormatCatalog::builtin();
        let Some(ref path) = self.custom_formats_path else {
            return Ok(builtin);
        };

        let extra = FormatCatalog::load(path)
            .with_context(|| format!("Failed to load custom formats from {}", path.display()))?;
        let catalog = builtin
            .extended_with(extra)
            .context("Failed to merge custom formats")?;

        info!(path = %path.display(), formats = catalog.len(), "Loaded custom formats");
        Ok(Arc::new(catalog))
    }

    /// Built-in presets extended with the user's profiles, if any
    pub fn load_profile_catalog(&self, formats: &FormatCatalog) -> Result<Arc<ProfileCatalog>> {
        let builtin = ProfileCatalog::builtin();
        let catalog = match self.quality_profiles_path {
            Some(ref path) => {
                let user = ProfileCatalog::load(path).with_context(|| {
                    format!("Failed to load quality profiles from {}", path.display())
                })?;
                let merged = builtin
                    .extended_with(user)
                    .context("Failed to merge quality profiles")?;
                info!(path = %path.display(), profiles = merged.all().len(), "Loaded quality profiles");
                Arc::new(merged)
            }
            None => builtin,
        };

        catalog.check_against(formats);
        Ok(catalog)
    }
}

/// An explicitly configured path, or the default file in the config
/// directory when that file exists
fn definition_path(explicit: Option<String>, config_dir: Option<&Path>, file: &str) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join(file))
        .filter(|path| path.is_file())
}
