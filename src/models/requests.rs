//! Request DTOs for the transcript proxy API
//!
//! Defines the query parameters accepted by the subtitle endpoints and the
//! normalisation of YouTube video identifiers.

use serde::Deserialize;
use url::Url;

/// Length of a YouTube video id.
pub const VIDEO_ID_LEN: usize = 11;

/// Query string for `GET /api/subtitles/list` and `GET /api/subtitles/fetch`
///
/// # Fields
/// - `videoId`: bare video id or any common YouTube URL
/// - `lang`: optional language code of the wanted track
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptQuery {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

/// A validated transcript lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    pub video_id: String,
    pub lang: Option<String>,
}

impl TranscriptRequest {
    /// Cache key for this lookup: the video id, or `videoId:lang`.
    pub fn cache_key(&self) -> String {
        match &self.lang {
            Some(lang) => format!("{}:{}", self.video_id, lang),
            None => self.video_id.clone(),
        }
    }
}

impl TranscriptQuery {
    /// Validates the query.
    ///
    /// Returns the normalised request, or an error message if validation fails.
    pub fn validate(&self) -> Result<TranscriptRequest, String> {
        let video_id = self
            .video_id
            .as_deref()
            .and_then(parse_video_id)
            .ok_or_else(|| "Please provide a valid YouTube video ID.".to_string())?;

        let lang = match self.lang.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(lang) if is_language_code(lang) => Some(lang.to_string()),
            Some(_) => return Err("Please provide a valid language code.".to_string()),
        };

        Ok(TranscriptRequest { video_id, lang })
    }
}

/// Extracts a video id from a bare id or a YouTube URL.
///
/// Accepts `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/`, `/live/` and `/v/`
/// forms, with or without a scheme.
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Some(input.to_string());
    }

    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;
    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            match url.query_pairs().find(|(k, _)| k == "v") {
                Some((_, v)) => Some(v.into_owned()),
                None => {
                    let mut segments = url.path_segments()?;
                    match segments.next() {
                        Some("embed" | "shorts" | "live" | "v") => {
                            segments.next().map(str::to_string)
                        }
                        _ => None,
                    }
                }
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// BCP 47-ish: "en", "pt-BR", "zh-Hans"
fn is_language_code(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 16
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
