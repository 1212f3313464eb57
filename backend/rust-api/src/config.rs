use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::models::policy::AdaptivePolicy;
use crate::models::scoring::ScoringConfig;
use crate::utils::version_history::DEFAULT_MAX_HISTORY;

/// Upper bound for session durations: one year.
pub const MAX_SESSION_SECS: i64 = 86_400 * 365;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub scoring: ScoringConfig,
    pub policy: AdaptivePolicy,
    pub sessions: SessionsConfig,
    pub capabilities: CapabilitiesConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// How long a submitted session stays readable.
    pub retention_secs: i64,
    /// How long an unsubmitted session may sit untouched before it is dropped.
    pub idle_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// HTTPS endpoint of the `getCapabilities` callable function.
    pub function_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub max_attempts: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Directory for per-course JSON snapshots; in-memory when unset.
    pub storage_dir: Option<PathBuf>,
    pub max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            scoring: ScoringConfig::default(),
            policy: AdaptivePolicy::default(),
            sessions: SessionsConfig::default(),
            capabilities: CapabilitiesConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            retention_secs: 600,
            idle_secs: 3600,
        }
    }
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            function_url: None,
            cache_ttl_secs: 300,
            timeout_secs: 5,
            max_attempts: 3,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            max_entries: DEFAULT_MAX_HISTORY,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables, e.g. APP__SCORING__HINT_PENALTY=5
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring
            .validate()
            .map_err(|e| ConfigError::Message(format!("scoring: {}", e)))?;
        self.policy
            .validate()
            .map_err(|e| ConfigError::Message(format!("policy: {}", e)))?;
        if self.history.max_entries == 0 {
            return Err(ConfigError::Message(
                "history: max_entries must be at least 1".to_string(),
            ));
        }
        check_session_secs("retention_secs", self.sessions.retention_secs)?;
        check_session_secs("idle_secs", self.sessions.idle_secs)?;
        Ok(())
    }
}

impl SessionsConfig {
    pub fn retention(&self) -> chrono::Duration {
        session_duration(self.retention_secs)
    }

    pub fn idle(&self) -> chrono::Duration {
        session_duration(self.idle_secs)
    }
}

fn check_session_secs(name: &str, secs: i64) -> Result<(), ConfigError> {
    if (0..=MAX_SESSION_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::Message(format!(
            "sessions: {} must be between 0 and {}",
            name, MAX_SESSION_SECS
        )))
    }
}

fn session_duration(secs: i64) -> chrono::Duration {
    chrono::Duration::try_seconds(secs.clamp(0, MAX_SESSION_SECS))
        .unwrap_or_else(chrono::Duration::zero)
}
