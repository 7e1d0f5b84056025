use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-step lot decay applied on every daily move
pub const DEFAULT_PENALTY: f64 = 1.0;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: EnvConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Market environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Directory holding one `<instrument>.csv` per instrument
    pub data_dir: PathBuf,
    /// Instruments episodes are drawn from
    pub targets: Vec<String>,
    /// Extra instruments; only widen the observation space for now
    #[serde(default)]
    pub auxiliaries: Vec<String>,
    /// First date loaded (inclusive, lexicographic)
    pub start_date: String,
    /// Episodes end once the next date is at or after this one
    pub end_date: String,
    /// Observation window length in days
    #[serde(default = "default_scope")]
    pub scope: usize,
    /// Close-out loss per lot that force-ends an episode
    #[serde(default = "default_sudden_death")]
    pub sudden_death: f64,
    /// Average realized reward over the number of lots closed
    #[serde(default)]
    pub cumulative_reward: bool,
    /// Multiplicative lot decay per step (1.0 = none; 0.999756079 was the alternative)
    #[serde(default = "default_penalty")]
    pub penalty: f64,
    /// Let a same-direction action add another lot instead of being ignored
    #[serde(default)]
    pub allow_accumulation: bool,
    /// RNG seed for instrument selection (None = OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_scope() -> usize {
    60
}

fn default_sudden_death() -> f64 {
    -1.0
}

fn default_penalty() -> f64 {
    DEFAULT_PENALTY
}

impl EnvConfig {
    /// Create a configuration with default tunables
    pub fn new(
        data_dir: impl Into<PathBuf>,
        targets: Vec<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            targets,
            auxiliaries: Vec::new(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            scope: default_scope(),
            sudden_death: default_sudden_death(),
            cumulative_reward: false,
            penalty: default_penalty(),
            allow_accumulation: false,
            seed: None,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }

        if self.targets.is_empty() {
            errors.push("at least one target instrument is required".to_string());
        }

        if self.scope == 0 {
            errors.push("scope must be at least 1".to_string());
        }

        if self.start_date >= self.end_date {
            errors.push(format!(
                "start_date ({}) must sort before end_date ({})",
                self.start_date, self.end_date
            ));
        }

        if !(self.penalty > 0.0 && self.penalty.is_finite()) {
            errors.push(format!("penalty must be positive, got {}", self.penalty));
        }

        if self.sudden_death.is_nan() {
            errors.push("sudden_death must be a number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("env.scope", 60)?
            .set_default("env.sudden_death", -1.0)?
            .set_default("env.cumulative_reward", false)?
            .set_default("env.penalty", DEFAULT_PENALTY)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific overlay (e.g. config/eval.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MARKETGYM_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // MARKETGYM__ENV__SCOPE=30, MARKETGYM__ENV__TARGETS=7203,6758, ...
            .add_source(
                Environment::with_prefix("MARKETGYM")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("env.targets")
                    .with_list_parse_key("env.auxiliaries")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        self.env.validate()
    }
}
