//! Upstream Transcript Provider
//!
//! The proxy never talks to YouTube directly; it goes through a
//! [`TranscriptProvider`], which lets tests swap in a fake.

mod youtube;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::Transcript;

pub use youtube::{YoutubeProvider, DEFAULT_YOUTUBE_BASE_URL};

/// Fetches transcripts from an upstream source.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetches the transcript of `video_id`, in `lang` when given, otherwise
    /// in the first language the video offers.
    async fn fetch_transcript(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Transcript, ProviderError>;
}
