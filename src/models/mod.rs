//! Request and Response models for the transcript proxy API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP requests and response bodies, plus the
//! transcript types shared with the upstream provider.

pub mod requests;
pub mod responses;
pub mod transcript;

// Re-export commonly used types
pub use requests::{parse_video_id, TranscriptQuery, TranscriptRequest};
pub use responses::{CaptionTracksResponse, HealthResponse, StatsResponse, SubtitlesResponse};
pub use transcript::{CaptionTrack, SubtitleSegment, Transcript};
