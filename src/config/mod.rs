use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{AppError, Result};

/// Output format for check reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Csv,
    Html,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" | "console" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            _ => Err(AppError::Config(format!("Unknown output format: {}", s))),
        }
    }
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            output_format: OutputFormat::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// What to check and how deep to go
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckConfig {
    /// AWS profile; unset means the default credential chain
    pub profile: Option<String>,
    /// Target regions; empty means the catalog default pair
    #[serde(default)]
    pub regions: Vec<String>,
    /// Probe every region the catalog knows
    #[serde(default)]
    pub all_regions: bool,
    /// Issue minimal inference calls (may incur small charges)
    #[serde(default)]
    pub test_invoke: bool,
    /// Include per-model inference parameters in the report
    #[serde(default)]
    pub advanced: bool,
    /// Suggest alternatives for missing key models
    #[serde(default)]
    pub alternatives: bool,
}

/// Optional overrides of the built-in capability catalog
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    pub regions: Option<Vec<String>>,
    pub key_models: Option<Vec<String>>,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::FileNotFound(path.display().to_string())
            } else {
                AppError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Config {
            global: GlobalConfig {
                timeout_seconds: 30,
                output_format: OutputFormat::Human,
            },
            check: CheckConfig {
                profile: None,
                regions: vec!["us-east-1".to_string(), "us-west-2".to_string()],
                all_regions: false,
                test_invoke: false,
                advanced: false,
                alternatives: false,
            },
            catalog: CatalogConfig::default(),
        }
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Build the immutable catalog, applying any configured overrides.
    pub fn build_catalog(&self) -> Catalog {
        let mut catalog = Catalog::builtin();
        if let Some(regions) = &self.catalog.regions {
            catalog = catalog.with_regions(regions);
        }
        if let Some(key_models) = &self.catalog.key_models {
            catalog = catalog.with_key_models(key_models);
        }
        catalog
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if self.check.profile.is_none() {
            if let Ok(profile) = std::env::var("AWS_PROFILE") {
                if !profile.is_empty() {
                    self.check.profile = Some(profile);
                }
            }
        }

        if let Ok(regions) = std::env::var("BEDROCK_CHECK_REGIONS") {
            let regions: Vec<String> = regions
                .split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            if !regions.is_empty() {
                self.check.regions = regions;
            }
        }

        if let Ok(timeout) = std::env::var("BEDROCK_CHECK_TIMEOUT") {
            if let Ok(seconds) = timeout.parse() {
                self.global.timeout_seconds = seconds;
            }
        }

        if let Ok(format) = std::env::var("BEDROCK_CHECK_OUTPUT") {
            if let Ok(f) = format.parse() {
                self.global.output_format = f;
            }
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    let catalog = config.build_catalog();
    for region in &config.check.regions {
        if !catalog.known_regions().iter().any(|r| &r.id == region) {
            warnings.push(format!("Region '{}' may not support Bedrock", region));
        }
    }

    if config.check.all_regions && !config.check.regions.is_empty() {
        warnings.push(
            "all_regions is set; the explicit regions list will be ignored".to_string(),
        );
    }

    if config.global.timeout_seconds == 0 {
        warnings.push("timeout_seconds is 0; calls will fail immediately".to_string());
    }

    if config.check.test_invoke {
        warnings.push(
            "test_invoke is enabled; invocation tests may incur small AWS charges".to_string(),
        );
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!(
            "console".parse::<OutputFormat>().unwrap(),
            OutputFormat::Human
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.global.timeout_seconds, 30);
        assert_eq!(
            config.check.regions,
            vec!["us-east-1".to_string(), "us-west-2".to_string()]
        );
        assert!(!config.check.test_invoke);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default_config();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.global.timeout_seconds, config.global.timeout_seconds);
        assert_eq!(parsed.check.regions, config.check.regions);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[global]\ntimeout_seconds = 10\n\n[check]\nprofile = \"dev\"\ntest_invoke = true\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.global.timeout_seconds, 10);
        assert_eq!(config.check.profile.as_deref(), Some("dev"));
        assert!(config.check.test_invoke);
        // Unspecified sections fall back to defaults.
        assert!(config.catalog.regions.is_none());
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_unknown_region() {
        let mut config = Config::default_config();
        config.check.regions.push("mars-north-1".to_string());
        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.contains("mars-north-1")));
    }

    #[test]
    fn test_catalog_overrides() {
        let mut config = Config::default_config();
        config.catalog.key_models =
            Some(vec!["anthropic.claude-3-haiku-20240307-v1:0".to_string()]);
        let catalog = config.build_catalog();
        assert_eq!(catalog.key_models().len(), 1);
    }
}
