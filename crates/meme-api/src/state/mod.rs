//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the configuration and the probes used by the readiness check.

use std::sync::Arc;

use axum::async_trait;
use meme_cache::RedisPool;
use meme_common::AppConfig;
use meme_db::PgPool;
use meme_service::ServiceContext;

/// Connectivity checks of the backing stores
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    async fn database(&self) -> bool;

    async fn redis(&self) -> bool;
}

/// Probe backed by the live PostgreSQL and Redis pools
#[derive(Debug, Clone)]
pub struct LiveProbe {
    pool: PgPool,
    redis_pool: RedisPool,
}

impl LiveProbe {
    pub fn new(pool: PgPool, redis_pool: RedisPool) -> Self {
        Self { pool, redis_pool }
    }
}

#[async_trait]
impl DependencyProbe for LiveProbe {
    async fn database(&self) -> bool {
        self.pool.acquire().await.is_ok()
    }

    async fn redis(&self) -> bool {
        self.redis_pool.health_check().await.is_ok()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    probe: Arc<dyn DependencyProbe>,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        probe: Arc<dyn DependencyProbe>,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            probe,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn probe(&self) -> &dyn DependencyProbe {
        self.probe.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
