//! Transcript Cache - A YouTube transcript proxy
//!
//! Fetches caption tracks and subtitles from an upstream transcript provider
//! and keeps them in a namespaced in-memory cache with a maximum entry age and
//! oldest-first eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
