//! YouTube Transcript Provider
//!
//! Fetches the watch page, reads the caption track list embedded in it and
//! downloads the chosen track in YouTube's `json3` timed-text format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::ProviderError;
use crate::models::{SubtitleSegment, Transcript};
use crate::provider::TranscriptProvider;

pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/85.0.4183.83 Safari/537.36";
const CAPTIONS_MARKER: &str = "\"captions\":";
const VIDEO_DETAILS_MARKER: &str = ",\"videoDetails";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PLAYABILITY_MARKER: &str = "\"playabilityStatus\":";

// == Upstream JSON shapes ==
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsJson {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

// == Youtube Provider ==
/// [`TranscriptProvider`] backed by youtube.com.
#[derive(Debug, Clone)]
pub struct YoutubeProvider {
    client: Client,
    base_url: Url,
}

impl YoutubeProvider {
    /// Creates a provider talking to `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::Malformed(format!("base url '{}': {}", base_url, e)))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    async fn fetch_caption_tracks(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<RawCaptionTrack>, ProviderError> {
        let mut url = self.join("watch")?;
        url.query_pairs_mut().append_pair("v", video_id);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, lang.unwrap_or("en"))
            .send()
            .await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::TooManyRequests);
        }
        let html = response.error_for_status()?.text().await?;

        extract_caption_tracks(&html, video_id)
    }

    async fn fetch_timed_text(
        &self,
        track: &RawCaptionTrack,
    ) -> Result<Vec<SubtitleSegment>, ProviderError> {
        let mut url = self.join(&track.base_url)?;
        url.query_pairs_mut().append_pair("fmt", "json3");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_timed_text(&body)
    }

    fn join(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Malformed(format!("url '{}': {}", path, e)))
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeProvider {
    async fn fetch_transcript(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Transcript, ProviderError> {
        let tracks = self.fetch_caption_tracks(video_id, lang).await?;
        let track = select_track(&tracks, lang)?;
        debug!(video_id, lang = %track.language_code, "fetching timed text");

        let segments = self.fetch_timed_text(track).await?;
        Ok(Transcript {
            language_code: Some(track.language_code.clone()),
            segments,
        })
    }
}

// == Page parsing ==
/// Pulls the caption track list out of a watch page.
fn extract_caption_tracks(
    html: &str,
    video_id: &str,
) -> Result<Vec<RawCaptionTrack>, ProviderError> {
    let Some((_, after)) = html.split_once(CAPTIONS_MARKER) else {
        if html.contains(RECAPTCHA_MARKER) {
            warn!(video_id, "upstream answered with a captcha");
            return Err(ProviderError::TooManyRequests);
        }
        if !html.contains(PLAYABILITY_MARKER) {
            return Err(ProviderError::VideoUnavailable(video_id.to_string()));
        }
        return Err(ProviderError::TranscriptsDisabled(video_id.to_string()));
    };

    let json = after
        .split_once(VIDEO_DETAILS_MARKER)
        .map_or(after, |(captions, _)| captions);
    let captions: CaptionsJson = serde_json::from_str(json)
        .map_err(|e| ProviderError::Malformed(format!("captions json: {}", e)))?;

    match captions.player_captions_tracklist_renderer {
        Some(renderer) if !renderer.caption_tracks.is_empty() => Ok(renderer.caption_tracks),
        _ => Err(ProviderError::TranscriptsDisabled(video_id.to_string())),
    }
}

/// Picks the track for `lang`, or the first track when no language is asked for.
fn select_track<'a>(
    tracks: &'a [RawCaptionTrack],
    lang: Option<&str>,
) -> Result<&'a RawCaptionTrack, ProviderError> {
    let found = match lang {
        Some(lang) => tracks.iter().find(|t| t.language_code == lang),
        None => tracks.first(),
    };

    found.ok_or_else(|| ProviderError::LanguageNotAvailable {
        lang: lang.unwrap_or_default().to_string(),
        available: tracks
            .iter()
            .map(|t| t.language_code.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Converts a `json3` timed-text body into segments, skipping events that
/// carry no text (window and line-break markers).
fn parse_timed_text(body: &str) -> Result<Vec<SubtitleSegment>, ProviderError> {
    let timed: TimedText = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("timed text: {}", e)))?;

    Ok(timed
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(SubtitleSegment {
                text: text.to_string(),
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect())
}
