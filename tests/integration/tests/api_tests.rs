//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{Duration, SecondsFormat, Utc};
use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, MockUpstream, TestServer,
};
use reqwest::StatusCode;

async fn ingest(server: &TestServer, memes: Vec<IngestMeme>) -> IngestResult {
    let response = server
        .post("/memes", &IngestBatch { memes })
        .await
        .expect("Request failed");
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn ingest_one(server: &TestServer, meme: IngestMeme) -> i64 {
    let result = ingest(server, vec![meme]).await;
    assert_eq!(result.admitted, 1, "{result:?}");
    result.items[0].meme_id.unwrap()
}

fn since_param(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.expect("Failed to start server");
    let response = server.get_root("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.expect("Failed to start server");
    let response = server.get_root("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["redis"], "healthy");
}

// ============================================================================
// Ingestion Tests
// ============================================================================

#[tokio::test]
async fn test_ingest_is_idempotent_on_key() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();
    let meme = IngestMeme::unique(upstream.picture(unique_suffix()));

    let first = ingest(&server, vec![meme.clone()]).await;
    assert_eq!(first.admitted, 1);
    let id = first.items[0].meme_id.unwrap();

    let second = ingest(&server, vec![meme.clone()]).await;
    assert_eq!(second.already_stored, 1);
    assert_eq!(second.items[0].status, "already_stored");
    assert_eq!(second.items[0].meme_id, Some(id));

    let response = server.get(&format!("/memes/{id}")).await.unwrap();
    let stored: MemeBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.external_id, meme.external_id);
}

#[tokio::test]
async fn test_same_picture_and_caption_is_duplicate() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();
    let picture = upstream.picture(unique_suffix());

    let original = IngestMeme::unique(picture.clone());
    let original_id = ingest_one(&server, original.clone()).await;

    // Reposted elsewhere with the same caption
    let mut repost = IngestMeme::unique(picture.clone());
    repost.description = original.description.clone();
    // Same picture, new caption
    let recaptioned = IngestMeme::unique(picture);

    let result = ingest(&server, vec![repost]).await;
    assert_eq!(result.duplicates, 1, "{result:?}");
    assert_eq!(result.items[0].duplicate_of, Some(original_id));

    let result = ingest(&server, vec![recaptioned]).await;
    assert_eq!(result.admitted, 1, "{result:?}");
    assert!(result.items[0].caption_variants.contains(&original_id));
}

#[tokio::test]
async fn test_batch_isolates_failed_items() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();

    let good = IngestMeme::unique(upstream.picture(unique_suffix()));
    let unreachable = IngestMeme::unique(upstream.url("/missing.png"));

    let result = ingest(&server, vec![unreachable, good]).await;
    assert_eq!((result.admitted, result.failed), (1, 1), "{result:?}");
    assert_eq!(result.items[0].index, 0);
    assert_eq!(result.items[0].status, "failed");
    assert_eq!(result.items[1].status, "admitted");
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let response = server.post("/memes", &IngestBatch { memes: Vec::new() }).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_meme_is_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let response = server.get(&format!("/memes/{}", i64::MAX)).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "NOT_FOUND");
}

#[tokio::test]
async fn test_corpus_export_pages_by_id() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();

    // Later than the memes of every other test
    let created_at = Utc::now() + Duration::hours(2);
    let memes: Vec<_> = (0..3)
        .map(|_| IngestMeme::unique(upstream.picture(unique_suffix())).created_at(created_at))
        .collect();
    let result = ingest(&server, memes).await;
    assert_eq!(result.admitted, 3, "{result:?}");
    let mut expected: Vec<i64> = result.items.iter().filter_map(|i| i.meme_id).collect();
    expected.sort_unstable();

    let since = since_param(created_at - Duration::seconds(1));
    let response = server.get(&format!("/memes?since={since}&limit=2")).await.unwrap();
    let first: MemePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first.memes.len(), 2);
    let after = first.next_after.unwrap();

    let response = server
        .get(&format!("/memes?since={since}&limit=2&after={after}"))
        .await
        .unwrap();
    let last: MemePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(last.next_after, None);

    let ids: Vec<i64> = first.memes.iter().chain(&last.memes).map(|m| m.id).collect();
    assert_eq!(ids, expected);

    let response = server.get("/memes?after=first").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_QUERY_PARAMETER");
}

// ============================================================================
// Selection Tests
// ============================================================================

#[tokio::test]
async fn test_selection_prefers_highest_kek_index() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();

    // Newer than anything the other tests ingest
    let created_at = Utc::now() + Duration::hours(1);
    let group = format!("it-group-{}", unique_suffix());
    let memes: Vec<_> = [(50, 10), (10, 1), (90, 5)]
        .into_iter()
        .map(|(likes, reposts)| {
            IngestMeme::unique(upstream.picture(unique_suffix()))
                .in_group(&group)
                .engagement(likes, reposts, 100)
                .created_at(created_at)
        })
        .collect();
    let expected = memes[2].external_id.clone();

    let result = ingest(&server, memes).await;
    assert_eq!(result.admitted, 3, "{result:?}");

    let chat = unique_id();
    let since = since_param(created_at - Duration::seconds(1));
    let response = server.get(&format!("/chats/{chat}/top?since={since}")).await.unwrap();
    let top: SelectionBody = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(top.meme.external_id, expected);
    assert_eq!(top.breakdown.meme_id, top.meme.id);
    assert!((top.breakdown.group_rating - 0.5).abs() < 1e-9);
    assert!(top.breakdown.score > 0.0);
}

#[tokio::test]
async fn test_top_without_candidates_is_no_content() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let since = since_param(Utc::now() + Duration::days(3650));
    let response = server
        .get(&format!("/chats/{}/top?since={since}", unique_id()))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_invalid_path_and_query_are_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();

    let response = server.get("/chats/not-a-chat/top").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_PATH_PARAMETER");

    let response = server.get("/chats/1/top?since=yesterday").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_QUERY_PARAMETER");
}

#[tokio::test]
async fn test_publish_without_transport_is_unavailable() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let response = server
        .post_empty(&format!("/chats/{}/publish", unique_id()))
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::SERVICE_UNAVAILABLE).await.unwrap();
    assert_eq!(body.error.code, "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_publish_delivers_and_hides_meme() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();
    let meme = IngestMeme::unique(upstream.picture(unique_suffix()));
    let created_at = meme.created_at;
    ingest_one(&server, meme).await;

    let chat = unique_id();
    let since = since_param(created_at - Duration::seconds(1));
    let response = server
        .post(&format!("/chats/{chat}/publish"), &serde_json::json!({ "since": since }))
        .await
        .unwrap();
    let published: PublishBody = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(published.publication.chat_id, chat);
    assert_eq!(published.publication.meme_id, published.selection.meme.id);
    assert!(published.publication.message_id >= 1_000);
    assert_eq!(upstream.deliveries(), 1);

    // The published meme is never offered to the same chat again
    let response = server.get(&format!("/chats/{chat}/top?since={since}")).await.unwrap();
    if response.status() == StatusCode::OK {
        let next: SelectionBody = response.json().await.unwrap();
        assert_ne!(next.meme.id, published.publication.meme_id);
    } else {
        assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    }

    // Feedback on the delivered message shows up in the chat stats
    let message = published.publication.message_id;
    let response = server
        .put(&format!("/chats/{chat}/messages/{message}/votes/{}", unique_id()), &Vote::approve())
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&format!("/chats/{chat}/stats")).await.unwrap();
    let stats: Vec<ChatStat> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].meme_id, published.publication.meme_id);
    assert_eq!(stats[0].message_id, message);
    assert_eq!((stats[0].likes, stats[0].dislikes), (1, 0));
}

#[tokio::test]
async fn test_record_publication_is_idempotent() {
    if !check_test_env().await {
        return;
    }

    let upstream = MockUpstream::start().await.unwrap();
    let server = TestServer::start(&upstream).await.unwrap();
    let meme_id = ingest_one(&server, IngestMeme::unique(upstream.picture(unique_suffix()))).await;

    let chat = unique_id();
    let request = RecordPublication {
        meme_id,
        message_id: unique_id(),
    };

    let response = server.post(&format!("/chats/{chat}/publications"), &request).await.unwrap();
    let first: RecordedBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(first.created);
    assert_eq!(first.meme_id, meme_id);

    let response = server.post(&format!("/chats/{chat}/publications"), &request).await.unwrap();
    let second: RecordedBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!second.created);

    let unknown = RecordPublication {
        meme_id: i64::MAX,
        message_id: unique_id(),
    };
    let response = server.post(&format!("/chats/{chat}/publications"), &unknown).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Vote Tests
// ============================================================================

#[tokio::test]
async fn test_vote_toggle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let (chat, message, user) = (unique_id(), unique_id(), unique_id());
    let path = format!("/chats/{chat}/messages/{message}/votes/{user}");

    let response = server.put(&path, &Vote::approve()).await.unwrap();
    let vote: VoteBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(vote.outcome, "added");
    assert_eq!(vote.counts.approve, 1);

    // Same choice again retracts
    let response = server.put(&path, &Vote::approve()).await.unwrap();
    let vote: VoteBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(vote.outcome, "retracted");
    assert_eq!(vote.counts.total, 0);

    server.put(&path, &Vote::approve()).await.unwrap();
    let response = server.put(&path, &Vote::disapprove()).await.unwrap();
    let vote: VoteBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(vote.outcome, "changed");

    let response = server
        .get(&format!("/chats/{chat}/messages/{message}/votes"))
        .await
        .unwrap();
    let counts: Counts = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!((counts.approve, counts.disapprove, counts.total), (0, 1, 1));
}

#[tokio::test]
async fn test_redelivered_vote_event_is_ignored() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let path = format!(
        "/chats/{}/messages/{}/votes/{}",
        unique_id(),
        unique_id(),
        unique_id()
    );
    let vote = Vote {
        choice: 0,
        event_id: Some(format!("cb-{}", unique_suffix())),
    };

    let response = server.put(&path, &vote).await.unwrap();
    let first: VoteBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first.outcome, "added");

    let response = server.put(&path, &vote).await.unwrap();
    let second: VoteBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(second.outcome, "duplicate");
    assert_eq!(second.counts.approve, 1);
}

#[tokio::test]
async fn test_invalid_vote_choice_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();
    let response = server
        .put(
            "/chats/1/messages/1/votes/1",
            &Vote {
                choice: 2,
                event_id: None,
            },
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

// ============================================================================
// Stats Tests
// ============================================================================

#[tokio::test]
async fn test_rating_export() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_without_transport().await.unwrap();

    let response = server.get("/stats/ratings").await.unwrap();
    let snapshot: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(snapshot.get("version").is_some());
    assert!(snapshot["groupRatings"].is_object());

    for map in ["groupRatings", "groupActivity", "platformRatings", "platformActivity"] {
        let response = server.get(&format!("/stats/ratings/{map}")).await.unwrap();
        let rows: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
        assert_eq!(rows["map"], map);
        assert!(rows["rows"].is_array());
    }

    let response = server.get("/stats/ratings/groupRating").await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}
