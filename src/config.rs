use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GmapsError, Result};
use crate::invoker::RetryPolicy;
use crate::tools::Limits;

/// Accepted `log_level` values (case-insensitive)
const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub google_maps_api_key: String,
    pub log_level: String,
    pub limits: LimitsConfig,
    pub retry: RetryConfig,
    pub http: HttpConfig,
    pub workers: WorkersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_results: u32,
    pub default_radius_meters: u32,
    pub max_radius_meters: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_results: 20,
            default_radius_meters: 5000,
            max_radius_meters: 50000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_wait_ms: 1000,
            max_wait_ms: 10000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.min_wait_ms),
            Duration::from_millis(self.max_wait_ms),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub max_concurrent_calls: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self { max_concurrent_calls: 8 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_maps_api_key: String::new(),
            log_level: "INFO".to_string(),
            limits: LimitsConfig::default(),
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
            workers: WorkersConfig::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("google_maps_api_key", &redact(&self.google_maps_api_key))
            .field("log_level", &self.log_level)
            .field("limits", &self.limits)
            .field("retry", &self.retry)
            .field("http", &self.http)
            .field("workers", &self.workers)
            .finish()
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .map_err(|e| GmapsError::Config(format!("Failed to load config from {}: {}", path.display(), e)));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        log::debug!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `GOOGLE_MAPS_API_KEY`, `LOG_LEVEL` and `MAX_RESULTS` overrides
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GOOGLE_MAPS_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.google_maps_api_key = key;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(max_results) = lookup("MAX_RESULTS") {
            match max_results.trim().parse() {
                Ok(n) => self.limits.max_results = n,
                Err(_) => log::warn!("Ignoring invalid MAX_RESULTS value: {}", max_results),
            }
        }
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.google_maps_api_key.trim().is_empty() {
            return Err(GmapsError::Config(
                "Google Maps API key is required (set GOOGLE_MAPS_API_KEY)".to_string(),
            ));
        }

        let level = self.log_level.to_uppercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(GmapsError::Config(format!(
                "Invalid log level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(GmapsError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.min_wait_ms > self.retry.max_wait_ms {
            return Err(GmapsError::Config(format!(
                "retry.min_wait_ms ({}) exceeds retry.max_wait_ms ({})",
                self.retry.min_wait_ms, self.retry.max_wait_ms
            )));
        }
        if self.limits.default_radius_meters > self.limits.max_radius_meters {
            return Err(GmapsError::Config(format!(
                "limits.default_radius_meters ({}) exceeds limits.max_radius_meters ({})",
                self.limits.default_radius_meters, self.limits.max_radius_meters
            )));
        }

        Ok(())
    }

    /// Map the configured level onto the log crate's filter
    pub fn log_filter(&self) -> log::LevelFilter {
        match self.log_level.to_uppercase().as_str() {
            "DEBUG" => log::LevelFilter::Debug,
            "WARNING" => log::LevelFilter::Warn,
            "ERROR" | "CRITICAL" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_results: self.limits.max_results,
            default_radius_meters: self.limits.default_radius_meters,
            max_radius_meters: self.limits.max_radius_meters,
        }
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<redacted>" }
}
