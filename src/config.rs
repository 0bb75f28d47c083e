//! Configuration management for the Nearbook engine

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// External book-availability API settings and probe tuning.
#[derive(Debug, Deserialize, Clone)]
pub struct AvailabilityConfig {
    /// Base URL of the availability provider.
    pub endpoint: String,
    /// Ordered credential pool for the provider. Probes fall back through
    /// this list in order when a key is rejected or quota-limited.
    pub auth_keys: Vec<String>,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout_seconds: u64,
    /// Search radius applied when the caller does not supply one.
    pub default_radius_km: f64,
    /// Cap on simultaneously running probes. `None` dispatches one worker
    /// per candidate library, which can over-saturate the provider under a
    /// large catalog.
    pub max_concurrent_probes: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub availability: AvailabilityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Hydrate process environment from .env when present
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix NEARBOOK_)
            .add_source(
                Environment::with_prefix("NEARBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override endpoint from BOOK_API_ENDPOINT env var if present
            .set_override_option("availability.endpoint", env::var("BOOK_API_ENDPOINT").ok())?
            .build()?;

        let mut config: AppConfig = config.try_deserialize()?;

        // Credential pools are usually provisioned as one comma-separated
        // env var rather than a config file list
        if let Ok(keys) = env::var("BOOK_API_AUTH_KEYS") {
            config.availability.auth_keys = keys
                .split(',')
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect();
        }

        Ok(config)
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://data4library.kr".to_string(),
            auth_keys: Vec::new(),
            timeout_seconds: 10,
            default_radius_km: 10.0,
            max_concurrent_probes: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
