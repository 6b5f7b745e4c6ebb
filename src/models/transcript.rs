//! Transcript data shared by the provider, the cache and the API.

use serde::{Deserialize, Serialize};

/// A caption track available for a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub language_code: String,
    pub name: String,
    /// Carries the video id; clients pass it back to the fetch endpoint.
    pub base_url: String,
}

/// One timed line of a transcript. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// A transcript as returned by the upstream provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    /// Language of the fetched track, when the provider reports one
    pub language_code: Option<String>,
    pub segments: Vec<SubtitleSegment>,
}
