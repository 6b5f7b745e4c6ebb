//! Response DTOs for the transcript proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{CacheStats, Namespace};
use crate::models::{CaptionTrack, SubtitleSegment};

/// Response body for `GET /api/subtitles/list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTracksResponse {
    pub caption_tracks: Vec<CaptionTrack>,
}

/// Response body for `GET /api/subtitles/fetch`
#[derive(Debug, Clone, Serialize)]
pub struct SubtitlesResponse {
    pub subtitles: Vec<SubtitleSegment>,
}

/// Response body for the stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Entries currently held, per namespace
    pub entries: BTreeMap<Namespace, usize>,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub max_size: usize,
    pub max_age_secs: u64,
}

impl StatsResponse {
    /// Builds the response from a cache snapshot and its limits.
    pub fn new(stats: CacheStats, max_size: usize, max_age_secs: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries(),
            hit_rate: stats.hit_rate(),
            entries: stats.entries,
            max_size,
            max_age_secs,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
