//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{health, memes, selection, stats, votes};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately so they
/// bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(meme_routes())
        .merge(chat_routes())
        .merge(stats_routes())
}

/// Ingestion, lookup and export
fn meme_routes() -> Router<AppState> {
    Router::new()
        .route("/memes", post(memes::ingest_memes).get(memes::export_memes))
        .route("/memes/:id", get(memes::get_meme))
}

/// Selection, publication and feedback of one chat
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats/:chat_id/top", get(selection::get_top))
        .route("/chats/:chat_id/publish", post(selection::publish))
        .route("/chats/:chat_id/publications", post(selection::record_publication))
        .route("/chats/:chat_id/stats", get(stats::get_chat_stats))
        .route(
            "/chats/:chat_id/messages/:message_id/votes",
            get(votes::get_vote_counts),
        )
        .route(
            "/chats/:chat_id/messages/:message_id/votes/:user_id",
            put(votes::toggle_vote),
        )
}

fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/ratings", get(stats::get_ratings))
        .route("/stats/ratings/:map", get(stats::get_rating_map))
}
