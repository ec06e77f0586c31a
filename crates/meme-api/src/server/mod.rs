//! Server setup and initialization
//!
//! Provides the application builder, the dependency wiring and the server
//! runner. Starting the server also starts the rating aggregation schedule.

use std::sync::Arc;

use axum::Router;
use meme_cache::{MemoryCorpusCache, RedisCorpusCache, RedisPool, RedisPoolConfig};
use meme_common::{AppConfig, AppError, CorpusCacheKind};
use meme_core::traits::{CorpusCache, MemeRepository};
use meme_db::{
    create_pool, migrations_dir, run_migrations, DatabaseConfig, PgMemeRepository,
    PgPublicationRepository, PgVoteRepository,
};
use meme_service::{
    spawn_event_pruning, EngineSettings, HttpSignatureProvider, ServiceContextBuilder, Transport,
    WebhookTransport,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::{AppState, LiveProbe};

/// Build the complete Axum application with all routes and middleware.
///
/// Health routes are merged after the middleware so probes are never rate
/// limited.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(api.merge(health_routes()).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    config
        .engine
        .validate()
        .map_err(|e| AppError::Config(e.to_string()))?;

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool, &migrations_dir())
        .await
        .map_err(|e| AppError::Database(format!("migrations failed: {e}")))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::new(RedisPoolConfig::from(&config.redis))
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool created");

    let engine = &config.engine;
    let settings = EngineSettings::from_config(engine);

    // Repositories
    let meme_repo: Arc<dyn MemeRepository> = Arc::new(PgMemeRepository::new(pool.clone()));
    let publication_repo = Arc::new(PgPublicationRepository::new(pool.clone()));
    let vote_repo = Arc::new(PgVoteRepository::new(pool.clone()));

    let corpus_cache: Arc<dyn CorpusCache> = match engine.corpus_cache {
        CorpusCacheKind::Redis => Arc::new(RedisCorpusCache::new(
            redis_pool.clone(),
            Arc::clone(&meme_repo),
            engine.corpus_cache_ttl(),
            settings.external_timeout,
        )),
        CorpusCacheKind::Memory => Arc::new(MemoryCorpusCache::new(
            Arc::clone(&meme_repo),
            engine.corpus_cache_ttl(),
            settings.external_timeout,
        )),
    };
    info!(kind = ?engine.corpus_cache, "Corpus cache configured");

    let signatures = Arc::new(
        HttpSignatureProvider::new(settings.external_timeout)
            .map_err(|e| AppError::Config(e.to_string()))?,
    );

    let transport: Option<Arc<dyn Transport>> = match &config.transport.webhook_url {
        Some(url) => {
            let webhook = WebhookTransport::new(url.clone(), settings.external_timeout)
                .map_err(|e| AppError::Config(e.to_string()))?;
            info!(url = %url, "Webhook transport configured");
            Some(Arc::new(webhook))
        }
        None => {
            warn!("TRANSPORT_WEBHOOK_URL not set, publish endpoint is disabled");
            None
        }
    };

    let service_context = ServiceContextBuilder::new()
        .meme_repo(meme_repo)
        .publication_repo(publication_repo)
        .vote_repo(vote_repo)
        .corpus_cache(corpus_cache)
        .signatures(signatures)
        .transport(transport)
        .settings(settings)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let probe = Arc::new(LiveProbe::new(pool, redis_pool));
    Ok(AppState::new(service_context, config, probe))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let interval = config.engine.aggregator_interval();

    let state = create_app_state(config).await?;
    let schedule = state.service_context().aggregator().spawn_refresh_loop(interval);
    let pruning = spawn_event_pruning(state.service_context().clone(), interval);

    let app = create_app(state)?;
    let result = run_server(app, &addr).await;

    schedule.abort();
    pruning.abort();
    result
}
