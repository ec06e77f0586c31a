//! Test helpers for integration tests
//!
//! Provides the test server, the mock upstream (pictures and webhook
//! transport) and response assertions.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode as AxumStatus},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use meme_api::{create_app, create_app_state};
use meme_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, EngineConfig, Environment,
    RateLimitConfig, RedisConfig, ServerConfig, TransportConfig,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server whose transport posts to `upstream`
    pub async fn start(upstream: &MockUpstream) -> Result<Self> {
        Self::start_with_config(test_config(Some(upstream.url("/deliver")))?).await
    }

    /// Start a server without a transport
    pub async fn start_without_transport() -> Result<Self> {
        Self::start_with_config(test_config(None)?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url(), path)
    }

    /// GET a path outside `/api/v1`
    pub async fn get_root(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.api_url(path)).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.api_url(path)).json(body).send().await?)
    }

    /// POST without a body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        Ok(self.client.post(self.api_url(path)).send().await?)
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.put(self.api_url(path)).json(body).send().await?)
    }
}

/// Local HTTP server standing in for picture hosts and the chat transport
pub struct MockUpstream {
    pub addr: SocketAddr,
    deliveries: Arc<AtomicI64>,
    _handle: JoinHandle<()>,
}

/// First message id handed out by the mock transport
const FIRST_MESSAGE_ID: i64 = 1_000;

impl MockUpstream {
    pub async fn start() -> Result<Self> {
        let deliveries = Arc::new(AtomicI64::new(0));
        let app = Router::new()
            .route("/pictures/:seed", get(picture))
            .route("/deliver", post(deliver))
            .with_state(Arc::clone(&deliveries));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            deliveries,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// URL of the noise picture generated from `seed`
    pub fn picture(&self, seed: u64) -> String {
        self.url(&format!("/pictures/{seed}"))
    }

    /// Number of deliveries received so far
    pub fn deliveries(&self) -> i64 {
        self.deliveries.load(Ordering::SeqCst)
    }
}

async fn picture(Path(seed): Path<u64>) -> impl IntoResponse {
    match noise_png(seed) {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes)),
        Err(_) => Err(AxumStatus::INTERNAL_SERVER_ERROR),
    }
}

async fn deliver(State(deliveries): State<Arc<AtomicI64>>) -> Json<serde_json::Value> {
    let n = deliveries.fetch_add(1, Ordering::SeqCst);
    Json(serde_json::json!({ "message_id": FIRST_MESSAGE_ID + n }))
}

/// 64x64 grayscale noise, deterministic in `seed`
pub fn noise_png(seed: u64) -> Result<Vec<u8>> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let img = GrayImage::from_fn(64, 64, |_, _| {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        Luma([(state >> 56) as u8])
    });

    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Configuration pointing at `DATABASE_URL` / `REDIS_URL` with test friendly
/// limits
pub fn test_config(webhook_url: Option<String>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    Ok(AppConfig {
        app: AppSettings {
            name: "memerank-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: 5,
            min_connections: 1,
        },
        redis: RedisConfig {
            url: std::env::var("REDIS_URL")?,
            max_connections: 5,
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 1_000,
            burst: 1_000,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        engine: EngineConfig {
            corpus_cache_ttl_secs: 1,
            external_timeout_secs: 5,
            ..EngineConfig::default()
        },
        transport: TransportConfig { webhook_url },
    })
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
