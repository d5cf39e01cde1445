use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::reporting::OutputFormat;

pub const ENV_PREFIX: &str = "QC_FORGE";
pub const LOCAL_CONFIG_FILE: &str = "qc-forge.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Output location and formats
    pub general: GeneralConfig,
    /// Analysis behaviour
    pub analysis: AnalysisConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory report files are written to
    pub output_dir: PathBuf,
    /// Report formats to generate
    pub formats: Vec<OutputFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Always use the template narrative
    pub fast_mode: bool,
    /// Datasets with fewer reads than this skip the narrative provider
    pub small_dataset_threshold: usize,
    /// Upper bound on one narrative request
    pub narrative_timeout_secs: u64,
    /// Shell command acting as the narrative provider; none means template only
    pub narrator_command: Option<String>,
}

impl AnalysisConfig {
    pub fn narrative_timeout(&self) -> Duration {
        Duration::from_secs(self.narrative_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration error: {0}")]
    Load(#[from] ConfigError),

    #[error("Validation error: {field} is invalid: {reason}")]
    Validation { field: String, reason: String },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Input/Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("qc_reports"),
            formats: vec![OutputFormat::Html, OutputFormat::Json],
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fast_mode: false,
            small_dataset_threshold: 50,
            narrative_timeout_secs: 30,
            narrator_command: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default locations, then an optional explicit file, then the environment
    ///
    /// Later layers override earlier ones:
    /// 1. built-in defaults
    /// 2. `./qc-forge.toml`
    /// 3. `~/.config/qc-forge/config.toml`
    /// 4. `explicit`, which must exist when given
    /// 5. `QC_FORGE__SECTION__KEY` environment variables
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut files = vec![(PathBuf::from(LOCAL_CONFIG_FILE), false)];
        if let Some(home_dir) = dirs::home_dir() {
            files.push((
                home_dir.join(".config").join("qc-forge").join("config.toml"),
                false,
            ));
        }
        if let Some(path) = explicit {
            files.push((path.to_path_buf(), true));
        }

        Self::load_layers(&files, ENV_PREFIX)
    }

    /// Layer `(path, required)` files over the defaults, then environment variables with `env_prefix`
    pub fn load_layers(
        files: &[(PathBuf, bool)],
        env_prefix: &str,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        for (path, required) in files {
            debug!("Config layer: {} (required: {})", path.display(), required);
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("general.formats")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single file over the defaults, ignoring the environment
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let config: AppConfig = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.general.formats.is_empty() {
            return Err(ConfigurationError::Validation {
                field: "general.formats".to_string(),
                reason: "at least one output format is required".to_string(),
            });
        }

        if self.analysis.narrative_timeout_secs == 0 {
            return Err(ConfigurationError::Validation {
                field: "analysis.narrative_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if let Some(command) = &self.analysis.narrator_command {
            if command.trim().is_empty() {
                return Err(ConfigurationError::Validation {
                    field: "analysis.narrator_command".to_string(),
                    reason: "must not be blank when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Save current configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        info!("💾 Configuration saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.small_dataset_threshold, 50);
        assert_eq!(config.analysis.narrative_timeout(), Duration::from_secs(30));
        assert_eq!(config.general.formats, vec![OutputFormat::Html, OutputFormat::Json]);
    }

    #[test]
    fn test_validation_rejects_zero_timeout_and_no_formats() {
        let mut config = AppConfig::default();
        config.analysis.narrative_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Validation { field, .. }) if field == "analysis.narrative_timeout_secs"
        ));

        let mut config = AppConfig::default();
        config.general.formats.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Validation { field, .. }) if field == "general.formats"
        ));

        let mut config = AppConfig::default();
        config.analysis.narrator_command = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_layers_override_defaults() {
        let temp_dir = tempdir().unwrap();
        let base = temp_dir.path().join("base.toml");
        let over = temp_dir.path().join("override.toml");
        std::fs::write(&base, "[analysis]\nfast_mode = true\nnarrative_timeout_secs = 5\n").unwrap();
        std::fs::write(&over, "[analysis]\nnarrative_timeout_secs = 12\n[general]\nformats = [\"tsv\"]\n")
            .unwrap();

        let config = AppConfig::load_layers(
            &[(base, true), (over, true), (temp_dir.path().join("absent.toml"), false)],
            "QC_FORGE_TEST_LAYERS",
        )
        .unwrap();

        assert!(config.analysis.fast_mode);
        assert_eq!(config.analysis.narrative_timeout_secs, 12);
        assert_eq!(config.general.formats, vec![OutputFormat::Tsv]);
        assert_eq!(config.analysis.small_dataset_threshold, 50);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            AppConfig::load_layers(&[(missing, true)], "QC_FORGE_TEST_MISSING"),
            Err(ConfigurationError::Load(_))
        ));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[general]\nformats = []\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigurationError::Validation { .. })
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("saved.toml");

        let mut config = AppConfig::default();
        config.analysis.narrator_command = Some("my-narrator --json".to_string());
        config.general.formats = vec![OutputFormat::Markdown, OutputFormat::Json];
        config.save(&path).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }
}
