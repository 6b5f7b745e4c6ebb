//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::handlers::{fetch_handler, health_handler, list_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /api/subtitles/list` - Caption tracks for a video
/// - `GET /api/subtitles/fetch` - Subtitle segments for a video
/// - `GET /api/cache/stats` - Cache statistics
///
/// When `static_dir` is given, every other path is served from that
/// directory, falling back to its `index.html` for client-side routes.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/subtitles/list", get(list_handler))
        .route("/api/subtitles/fetch", get(fetch_handler))
        .route("/api/cache/stats", get(stats_handler));

    if let Some(dir) = static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
