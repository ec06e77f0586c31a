//! Corpus page extractor
//!
//! Keyset paging parameters of the corpus export.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use meme_core::{CorpusQuery, MemeId};
use serde::Deserialize;

use crate::response::ApiError;

/// Default page size
const DEFAULT_LIMIT: i64 = 100;
/// Maximum page size
const MAX_LIMIT: i64 = 1000;

/// Raw query parameters
#[derive(Debug, Deserialize)]
pub struct CorpusPageParams {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Validated page request
#[derive(Debug, Clone, Copy)]
pub struct CorpusPage(pub CorpusQuery);

impl TryFrom<CorpusPageParams> for CorpusPage {
    type Error = ApiError;

    fn try_from(params: CorpusPageParams) -> Result<Self, Self::Error> {
        let after = params
            .after
            .map(|s| {
                s.parse::<MemeId>()
                    .map_err(|_| ApiError::invalid_query("Invalid 'after' cursor format"))
            })
            .transpose()?;

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok(CorpusPage(CorpusQuery {
            since: params.since,
            after,
            limit,
        }))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CorpusPage
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<CorpusPageParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        CorpusPage::try_from(params)
    }
}
