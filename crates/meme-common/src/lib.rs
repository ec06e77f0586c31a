//! # meme-common
//!
//! Shared utilities: configuration, error handling and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, ConfigError, CorpusCacheKind, CorsConfig, DatabaseConfig,
    EngineConfig, Environment, RateLimitConfig, RedisConfig, ServerConfig, TransportConfig,
    MAX_WINDOW_HOURS,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
