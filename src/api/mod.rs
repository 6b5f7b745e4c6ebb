//! API Module
//!
//! HTTP handlers and routing for the transcript proxy.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/subtitles/list?videoId=&lang=` - Caption tracks for a video
//! - `GET /api/subtitles/fetch?videoId=&lang=` - Subtitle segments for a video
//! - `GET /api/cache/stats` - Cache statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
