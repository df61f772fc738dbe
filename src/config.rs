//! Configuration for hosts of the document model
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (openapi.toml)
//! - Environment variables (OPENAPI__*)
//!
//! ## Example config file (openapi.toml):
//! ```toml
//! [validation]
//! skip_examples = false
//! allow_undefined_tags_in_operation = true
//! max_depth = 64
//!
//! [output]
//! format = "yaml"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec::Format;
use crate::validation::ValidationOptions;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Rule toggles passed to the validator
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Encoding used when converting documents
    #[serde(default)]
    pub format: Format,
}

impl Settings {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["openapi.toml", ".openapi.toml", "config/openapi.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "openapi-model", "openapi") {
            let xdg_config = config_dir.config_dir().join("openapi.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // OPENAPI__VALIDATION__SKIP_EXAMPLES=true
        builder = builder.add_source(
            Environment::with_prefix("OPENAPI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::DEFAULT_MAX_DEPTH;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.validation.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!settings.validation.skip_examples);
        assert_eq!(settings.output.format, Format::Json);
    }

    #[test]
    fn test_serialize_settings() {
        let toml_str = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[validation]\nskip_default_values = true\nmax_depth = 8\n\n[output]\nformat = \"yaml\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert!(settings.validation.skip_default_values);
        assert!(!settings.validation.skip_examples);
        assert_eq!(settings.validation.max_depth, 8);
        assert_eq!(settings.output.format, Format::Yaml);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut settings = Settings::default();
        settings.validation.allow_undefined_tags_in_operation = true;
        settings.save(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded, settings);
    }
}
