//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{ApiError, ProviderError, Result};
use crate::models::{
    CaptionTracksResponse, HealthResponse, StatsResponse, SubtitlesResponse, TranscriptQuery,
};
use crate::provider::{TranscriptProvider, YoutubeProvider};
use crate::service::{CachedPayload, SharedCache, TranscriptService};

/// Application state shared across all handlers.
///
/// The cache is created here once and shared with the service and, through
/// `cache`, with the sweep task.
#[derive(Clone)]
pub struct AppState {
    /// Cache shared with the sweep task
    pub cache: SharedCache,
    pub service: TranscriptService,
}

impl AppState {
    /// Creates a new AppState around the given cache and provider.
    pub fn new(cache: CacheStore<CachedPayload>, provider: Arc<dyn TranscriptProvider>) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        Self {
            service: TranscriptService::new(cache.clone(), provider),
            cache,
        }
    }

    /// Creates a new AppState from configuration, talking to YouTube.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ProviderError> {
        let cache = CacheStore::new(config.cache_max_size, config.max_age());
        let provider = YoutubeProvider::new(&config.youtube_base_url, config.upstream_timeout())?;
        Ok(Self::new(cache, Arc::new(provider)))
    }
}

/// Handler for GET /api/subtitles/list
///
/// Returns the caption tracks available for `videoId`.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<CaptionTracksResponse>> {
    let req = query.validate().map_err(ApiError::InvalidRequest)?;
    let tracks = state.service.caption_tracks(&req).await?;

    Ok(Json(CaptionTracksResponse {
        caption_tracks: tracks.as_ref().clone(),
    }))
}

/// Handler for GET /api/subtitles/fetch
///
/// Returns the subtitle segments of `videoId`, optionally in `lang`.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<SubtitlesResponse>> {
    let req = query.validate().map_err(ApiError::InvalidRequest)?;
    let subtitles = state.service.subtitles(&req).await?;

    Ok(Json(SubtitlesResponse {
        subtitles: subtitles.as_ref().clone(),
    }))
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;

    Json(StatsResponse::new(
        cache.stats(),
        cache.max_size(),
        cache.max_age().as_secs(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
