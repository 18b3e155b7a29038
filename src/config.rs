use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::{ExtractError, Result};

/// Default location of the extraction API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Environment variable that overrides the API base URL
pub const API_BASE_URL_ENV: &str = "WORKOUT_EXTRACT_API_BASE_URL";

/// Configuration for the workout extraction client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// External API connection settings
    pub api: ApiConfig,

    /// Job status polling settings
    pub polling: PollingConfig,

    /// Output and logging settings
    pub output: OutputConfig,

    /// Creator catalog settings
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between two status requests (milliseconds)
    pub interval_ms: u64,

    /// Pause between seeing COMPLETE and handing over the result (milliseconds)
    pub redirect_delay_ms: u64,

    /// Stop after this many status requests (unbounded when absent)
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory exported PDFs are written to
    pub output_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Number of creators shown in the featured listing
    pub featured_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: 30,
            user_agent: format!("workout-extract/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            redirect_delay_ms: 1500,
            max_attempts: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            log_level: "info".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { featured_limit: 6 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
            output: OutputConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply
    /// environment overrides
    ///
    /// A config file that exists but cannot be parsed is an error rather than
    /// a silent fallback to the defaults.
    pub fn load() -> Result<Self> {
        Self::load_first(&[
            "workout-extract.toml",
            "config/workout-extract.toml",
            "/etc/workout-extract/config.toml",
        ])
    }

    fn load_first<P: AsRef<Path>>(config_paths: &[P]) -> Result<Self> {
        let found = config_paths
            .iter()
            .map(|p| -> &Path { p.as_ref() })
            .find(|p| p.exists());

        let mut config = match found {
            Some(path) => {
                let loaded = Self::from_file(path).map_err(|e| {
                    ExtractError::Configuration(format!(
                        "failed to parse config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                tracing::info!("📄 Loaded configuration from: {}", path.display());
                loaded
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a specific file, then apply environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&config_str)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override settings with environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base_url) = lookup(API_BASE_URL_ENV) {
            self.api.base_url = base_url;
        }

        if let Some(interval) = lookup("WORKOUT_EXTRACT_POLL_INTERVAL_MS") {
            self.polling.interval_ms = interval.trim().parse().map_err(|_| {
                ExtractError::Configuration(format!(
                    "WORKOUT_EXTRACT_POLL_INTERVAL_MS is not a number: {}",
                    interval
                ))
            })?;
        }

        if let Some(timeout) = lookup("WORKOUT_EXTRACT_TIMEOUT_SECONDS") {
            self.api.timeout_seconds = timeout.trim().parse().map_err(|_| {
                ExtractError::Configuration(format!(
                    "WORKOUT_EXTRACT_TIMEOUT_SECONDS is not a number: {}",
                    timeout
                ))
            })?;
        }

        if let Some(output_dir) = lookup("WORKOUT_EXTRACT_OUTPUT_DIR") {
            self.output.output_dir = PathBuf::from(output_dir);
        }

        if let Some(log_level) = lookup("WORKOUT_EXTRACT_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| ExtractError::Configuration(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url).map_err(|e| {
            ExtractError::Configuration(format!("invalid base_url {}: {}", self.api.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExtractError::Configuration(format!(
                "base_url must use http or https: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ExtractError::Configuration(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.polling.interval_ms == 0 {
            return Err(ExtractError::Configuration(
                "interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.catalog.featured_limit == 0 {
            return Err(ExtractError::Configuration(
                "featured_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Workout Extract Configuration:\n\
            - API: {}\n\
            - Timeout: {}s\n\
            - Poll Interval: {}ms\n\
            - Max Attempts: {}\n\
            - Output Directory: {}",
            self.api.base_url,
            self.api.timeout_seconds,
            self.polling.interval_ms,
            self.polling
                .max_attempts
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string()),
            self.output.output_dir.display(),
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.api.timeout_seconds = seconds;
        self
    }

    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.config.polling.interval_ms = interval_ms;
        self
    }

    pub fn with_redirect_delay(mut self, delay_ms: u64) -> Self {
        self.config.polling.redirect_delay_ms = delay_ms;
        self
    }

    pub fn with_max_attempts(mut self, attempts: Option<u32>) -> Self {
        self.config.polling.max_attempts = attempts;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.output_dir = dir;
        self
    }

    pub fn with_featured_limit(mut self, limit: usize) -> Self {
        self.config.catalog.featured_limit = limit;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.polling.interval_ms, 3000);
        assert_eq!(config.polling.redirect_delay_ms, 1500);
        assert_eq!(config.polling.max_attempts, None);
        assert_eq!(config.catalog.featured_limit, 6);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_base_url("https://workouts.example.com/api/v1")
            .with_poll_interval(500)
            .with_max_attempts(Some(10))
            .build();

        assert_eq!(config.api.base_url, "https://workouts.example.com/api/v1");
        assert_eq!(config.polling.interval_ms, 500);
        assert_eq!(config.polling.max_attempts, Some(10));
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let bad_scheme = ConfigBuilder::new().with_base_url("ftp://example.com").build();
        assert!(bad_scheme.validate().is_err());

        let zero_interval = ConfigBuilder::new().with_poll_interval(0).build();
        assert!(zero_interval.validate().is_err());

        let zero_timeout = ConfigBuilder::new().with_timeout(0).build();
        assert!(zero_timeout.validate().is_err());

        let zero_limit = ConfigBuilder::new().with_featured_limit(0).build();
        assert!(zero_limit.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://workouts.example.com/api/v1"

            [polling]
            interval_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://workouts.example.com/api/v1");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(config.polling.redirect_delay_ms, 1500);
        assert_eq!(config.catalog.featured_limit, 6);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (API_BASE_URL_ENV, "https://env.example.com/api/v1"),
            ("WORKOUT_EXTRACT_POLL_INTERVAL_MS", "250"),
            ("WORKOUT_EXTRACT_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api.base_url, "https://env.example.com/api/v1");
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.output.log_level, "debug");
    }

    #[test]
    fn test_invalid_env_override_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_vars(|key| {
                (key == "WORKOUT_EXTRACT_TIMEOUT_SECONDS").then(|| "not-a-number".to_string())
            })
            .unwrap_err();

        assert!(matches!(err, ExtractError::Configuration(_)));
        assert!(err.to_string().contains("WORKOUT_EXTRACT_TIMEOUT_SECONDS"));
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn test_malformed_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("workout-extract.toml");
        std::fs::write(&broken, "[api\nbase_url = ").unwrap();
        let absent = dir.path().join("missing.toml");

        let err = Config::load_first(&[&absent, &broken]).unwrap_err();
        assert!(matches!(err, ExtractError::Configuration(_)));
        assert!(err.to_string().contains("workout-extract.toml"));
    }

    #[test]
    fn test_load_first_uses_first_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workout-extract.toml");
        std::fs::write(&path, "[catalog]\nfeatured_limit = 3\n").unwrap();

        let config = Config::load_first(&[dir.path().join("missing.toml"), path]).unwrap();
        assert_eq!(config.catalog.featured_limit, 3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workout-extract.toml");

        let config = ConfigBuilder::new()
            .with_base_url("https://saved.example.com/api/v1")
            .with_max_attempts(Some(5))
            .build();
        config.save(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
