//! Configuration structs

mod app_config;

pub use app_config::{
    parse_default_ratings, AppConfig, AppSettings, ConfigError, CorpusCacheKind, CorsConfig,
    DatabaseConfig, EngineConfig, Environment, RateLimitConfig, RedisConfig, ServerConfig,
    TransportConfig, MAX_WINDOW_HOURS,
};
