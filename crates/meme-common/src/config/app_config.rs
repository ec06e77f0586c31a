//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub engine: EngineConfig,
    pub transport: TransportConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Largest accepted window in hours, ten years
pub const MAX_WINDOW_HOURS: i64 = 24 * 365 * 10;

/// Ranking, deduplication and scheduling knobs
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Decay constant of the recency coefficient, in hours
    pub decay_hours: f64,
    /// Per-platform rating used when a bucket has no rating yet
    pub default_ratings: HashMap<String, f64>,
    /// Inclusive signature distance under which pictures are the same
    pub dedup_distance: u32,
    pub external_timeout_secs: u64,
    pub corpus_cache_ttl_secs: u64,
    /// Where the aggregator's corpus copy is held
    pub corpus_cache: CorpusCacheKind,
    pub aggregator_interval_secs: u64,
    pub selection_lookback_hours: i64,
    /// How long applied vote event ids are remembered
    pub vote_event_retention_hours: i64,
}

impl EngineConfig {
    /// Reject values that would stall the schedule or overflow time arithmetic
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the offending variable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.decay_hours.is_finite() && self.decay_hours > 0.0) {
            return Err(ConfigError::InvalidValue(
                "SCORE_DECAY_HOURS",
                self.decay_hours.to_string(),
            ));
        }
        if self.external_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "EXTERNAL_TIMEOUT_SECS",
                self.external_timeout_secs.to_string(),
            ));
        }
        if self.aggregator_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "AGGREGATOR_INTERVAL_SECS",
                self.aggregator_interval_secs.to_string(),
            ));
        }
        if !(1..=MAX_WINDOW_HOURS).contains(&self.selection_lookback_hours) {
            return Err(ConfigError::InvalidValue(
                "SELECTION_LOOKBACK_HOURS",
                self.selection_lookback_hours.to_string(),
            ));
        }
        if !(1..=MAX_WINDOW_HOURS).contains(&self.vote_event_retention_hours) {
            return Err(ConfigError::InvalidValue(
                "VOTE_EVENT_RETENTION_HOURS",
                self.vote_event_retention_hours.to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }

    #[must_use]
    pub fn corpus_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.corpus_cache_ttl_secs)
    }

    #[must_use]
    pub fn aggregator_interval(&self) -> Duration {
        Duration::from_secs(self.aggregator_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay_hours: default_decay_hours(),
            default_ratings: HashMap::new(),
            dedup_distance: default_dedup_distance(),
            external_timeout_secs: default_external_timeout_secs(),
            corpus_cache_ttl_secs: default_corpus_cache_ttl_secs(),
            corpus_cache: CorpusCacheKind::default(),
            aggregator_interval_secs: default_aggregator_interval_secs(),
            selection_lookback_hours: default_selection_lookback_hours(),
            vote_event_retention_hours: default_vote_event_retention_hours(),
        }
    }
}

/// Backend of the corpus cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorpusCacheKind {
    /// Shared between instances through Redis
    #[default]
    Redis,
    /// Private to this process
    Memory,
}

impl FromStr for CorpusCacheKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Outbound notification transport
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransportConfig {
    /// Webhook receiving published memes; publishing is disabled without it
    pub webhook_url: Option<String>,
}

// Default value functions
fn default_app_name() -> String {
    "memerank".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_decay_hours() -> f64 {
    24.0
}

fn default_dedup_distance() -> u32 {
    5
}

fn default_external_timeout_secs() -> u64 {
    10
}

fn default_corpus_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_aggregator_interval_secs() -> u64 {
    600 // 10 minutes
}

fn default_selection_lookback_hours() -> i64 {
    24
}

fn default_vote_event_retention_hours() -> i64 {
    168 // 7 days
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Parse a variable that must be present
fn required_var<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    let raw = env::var(name).map_err(|_| ConfigError::MissingVar(name))?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, raw))
}

/// Parse `platform=value,platform=value` into a rating table
pub fn parse_default_ratings(raw: &str) -> Result<HashMap<String, f64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (platform, value) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidValue("DEFAULT_RATINGS", entry.to_string()))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DEFAULT_RATINGS", entry.to_string()))?;
            Ok((platform.trim().to_string(), value))
        })
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// a variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: required_var("API_PORT")?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS", default_min_connections())?,
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: parse_var(
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections(),
                )?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second(),
                )?,
                burst: parse_var("RATE_LIMIT_BURST", default_burst())?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            engine: EngineConfig {
                decay_hours: parse_var("SCORE_DECAY_HOURS", default_decay_hours())?,
                default_ratings: env::var("DEFAULT_RATINGS")
                    .ok()
                    .map(|s| parse_default_ratings(&s))
                    .transpose()?
                    .unwrap_or_default(),
                dedup_distance: parse_var("DEDUP_DISTANCE", default_dedup_distance())?,
                external_timeout_secs: parse_var(
                    "EXTERNAL_TIMEOUT_SECS",
                    default_external_timeout_secs(),
                )?,
                corpus_cache_ttl_secs: parse_var(
                    "CORPUS_CACHE_TTL_SECS",
                    default_corpus_cache_ttl_secs(),
                )?,
                corpus_cache: parse_var("CORPUS_CACHE", CorpusCacheKind::default())?,
                aggregator_interval_secs: parse_var(
                    "AGGREGATOR_INTERVAL_SECS",
                    default_aggregator_interval_secs(),
                )?,
                selection_lookback_hours: parse_var(
                    "SELECTION_LOOKBACK_HOURS",
                    default_selection_lookback_hours(),
                )?,
                vote_event_retention_hours: parse_var(
                    "VOTE_EVENT_RETENTION_HOURS",
                    default_vote_event_retention_hours(),
                )?,
            },
            transport: TransportConfig {
                webhook_url: env::var("TRANSPORT_WEBHOOK_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
            },
        };

        config.engine.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
