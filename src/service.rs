//! Transcript Service
//!
//! Lookup-or-fetch over the cache: serve from the cache when possible,
//! otherwise ask the upstream provider and remember the answer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStore, Namespace};
use crate::error::{ApiError, ProviderError, Result};
use crate::models::{CaptionTrack, SubtitleSegment, TranscriptRequest};
use crate::provider::TranscriptProvider;

/// Cache shared between request handlers and the sweep task.
pub type SharedCache = Arc<RwLock<CacheStore<CachedPayload>>>;

type FlightKey = (Namespace, String);
type InFlight = Arc<StdMutex<HashMap<FlightKey, Flight>>>;

/// What the cache holds. The variant always matches the namespace it is
/// stored under.
#[derive(Debug, Clone)]
pub enum CachedPayload {
    Tracks(Arc<Vec<CaptionTrack>>),
    Subtitles(Arc<Vec<SubtitleSegment>>),
}

/// Resolves transcript lookups through the cache and the upstream provider.
///
/// Concurrent misses for the same key share one upstream fetch: the first
/// caller fetches while later callers wait on a per-key gate and then read
/// the cached result.
#[derive(Clone)]
pub struct TranscriptService {
    cache: SharedCache,
    provider: Arc<dyn TranscriptProvider>,
    in_flight: InFlight,
}

impl TranscriptService {
    pub fn new(cache: SharedCache, provider: Arc<dyn TranscriptProvider>) -> Self {
        Self {
            cache,
            provider,
            in_flight: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Caption Tracks ==
    /// Returns the caption tracks for a video.
    pub async fn caption_tracks(&self, req: &TranscriptRequest) -> Result<Arc<Vec<CaptionTrack>>> {
        match self.lookup_or_fetch(Namespace::TrackList, req).await? {
            CachedPayload::Tracks(tracks) => Ok(tracks),
            CachedPayload::Subtitles(_) => Err(mismatched(Namespace::TrackList)),
        }
    }

    // == Subtitles ==
    /// Returns the subtitle segments for a video.
    pub async fn subtitles(&self, req: &TranscriptRequest) -> Result<Arc<Vec<SubtitleSegment>>> {
        match self.lookup_or_fetch(Namespace::SubtitleBody, req).await? {
            CachedPayload::Subtitles(segments) => Ok(segments),
            CachedPayload::Tracks(_) => Err(mismatched(Namespace::SubtitleBody)),
        }
    }

    async fn lookup_or_fetch(
        &self,
        namespace: Namespace,
        req: &TranscriptRequest,
    ) -> Result<CachedPayload> {
        let key = req.cache_key();

        let cached = self.cache.write().await.get(namespace, &key);
        if let Some(payload) = cached {
            debug!(%namespace, key = %key, "cache hit");
            return Ok(payload);
        }

        let flight = FlightGuard::join(&self.in_flight, (namespace, key));
        let turn = flight.gate.lock().await;
        let result = self.fetch_once(namespace, &flight.key.1, req).await;
        drop(turn);

        result
    }

    /// Runs with the per-key gate held. Another caller may have filled the
    /// cache while we waited, so peek again before going upstream. The
    /// lookup was already counted as a miss.
    async fn fetch_once(
        &self,
        namespace: Namespace,
        key: &str,
        req: &TranscriptRequest,
    ) -> Result<CachedPayload> {
        let cached = self.cache.write().await.peek(namespace, key);
        if let Some(payload) = cached {
            debug!(%namespace, key, "filled by concurrent fetch");
            return Ok(payload);
        }

        info!(%namespace, key, "cache miss, fetching from upstream");
        let transcript = self
            .provider
            .fetch_transcript(&req.video_id, req.lang.as_deref())
            .await
            .map_err(|e| provider_error(namespace, &req.video_id, e))?;

        if transcript.segments.is_empty() {
            return Err(ApiError::NotFound(no_captions_message(namespace).to_string()));
        }

        let payload = match namespace {
            Namespace::TrackList => {
                let language_code = transcript
                    .language_code
                    .or_else(|| req.lang.clone())
                    .unwrap_or_else(|| "en".to_string());
                CachedPayload::Tracks(Arc::new(vec![CaptionTrack {
                    name: language_code.clone(),
                    language_code,
                    base_url: req.video_id.clone(),
                }]))
            }
            Namespace::SubtitleBody => CachedPayload::Subtitles(Arc::new(transcript.segments)),
        };

        self.cache
            .write()
            .await
            .put(namespace, key.to_string(), payload.clone());
        Ok(payload)
    }
}

// == Single Flight ==
/// Per-key gate plus the number of lookups currently holding or waiting on it.
#[derive(Default)]
struct Flight {
    gate: Arc<Mutex<()>>,
    waiters: usize,
}

/// Membership of one lookup in a key's flight. Dropping it, whether the
/// lookup finished or was cancelled, releases the membership and removes the
/// map entry once nobody is left.
struct FlightGuard {
    in_flight: InFlight,
    key: FlightKey,
    gate: Arc<Mutex<()>>,
}

impl FlightGuard {
    fn join(in_flight: &InFlight, key: FlightKey) -> Self {
        let gate = {
            let mut flights = lock_flights(in_flight);
            let flight = flights.entry(key.clone()).or_default();
            flight.waiters += 1;
            flight.gate.clone()
        };

        Self {
            in_flight: in_flight.clone(),
            key,
            gate,
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut flights = lock_flights(&self.in_flight);
        if let Some(flight) = flights.get_mut(&self.key) {
            flight.waiters = flight.waiters.saturating_sub(1);
            if flight.waiters == 0 {
                flights.remove(&self.key);
            }
        }
    }
}

/// The map is only touched in short non-async sections, so a poisoned lock
/// still holds consistent data.
fn lock_flights(in_flight: &InFlight) -> MutexGuard<'_, HashMap<FlightKey, Flight>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

fn no_captions_message(namespace: Namespace) -> &'static str {
    match namespace {
        Namespace::TrackList => "No captions available for this video. Please try another video.",
        Namespace::SubtitleBody => "No subtitles found for this video.",
    }
}

fn provider_error(namespace: Namespace, video_id: &str, err: ProviderError) -> ApiError {
    match err {
        ProviderError::TranscriptsDisabled(_) | ProviderError::VideoUnavailable(_) => {
            debug!(%namespace, video_id, error = %err, "no transcript upstream");
            ApiError::NotFound(no_captions_message(namespace).to_string())
        }
        ProviderError::LanguageNotAvailable { .. } => ApiError::NotFound(err.to_string()),
        ProviderError::TooManyRequests => {
            warn!(%namespace, video_id, "upstream rate limited");
            ApiError::Upstream(upstream_message(namespace).to_string())
        }
        ProviderError::Http(_) | ProviderError::Malformed(_) => {
            error!(%namespace, video_id, error = %err, "upstream fetch failed");
            ApiError::Upstream(upstream_message(namespace).to_string())
        }
    }
}

fn upstream_message(namespace: Namespace) -> &'static str {
    match namespace {
        Namespace::TrackList => "Unable to fetch captions. Please try again later.",
        Namespace::SubtitleBody => "Unable to fetch subtitles. Please try again later.",
    }
}

fn mismatched(namespace: Namespace) -> ApiError {
    error!(%namespace, "cached payload does not match namespace");
    ApiError::Internal(format!("Unexpected payload in {} cache", namespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::cache::ManualClock;
    use crate::models::Transcript;

    /// Provider that counts calls and answers after a short delay.
    #[derive(Default)]
    struct FakeProvider {
        calls: AtomicUsize,
        empty: bool,
        fail: bool,
    }

    #[async_trait]
    impl TranscriptProvider for FakeProvider {
        async fn fetch_transcript(
            &self,
            _video_id: &str,
            lang: Option<&str>,
        ) -> std::result::Result<Transcript, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(ProviderError::Malformed("boom".to_string()));
            }
            let segments = if self.empty {
                vec![]
            } else {
                vec![SubtitleSegment {
                    text: "hello".to_string(),
                    start: 0.0,
                    duration: 1.0,
                }]
            };
            Ok(Transcript {
                language_code: lang.map(str::to_string),
                segments,
            })
        }
    }

    fn service(provider: Arc<FakeProvider>) -> (TranscriptService, ManualClock) {
        let clock = ManualClock::new(0);
        let cache = CacheStore::with_clock(10, Duration::from_secs(60), Arc::new(clock.clone()));
        let service = TranscriptService::new(Arc::new(RwLock::new(cache)), provider);
        (service, clock)
    }

    fn request(lang: Option<&str>) -> TranscriptRequest {
        TranscriptRequest {
            video_id: "dQw4w9WgXcQ".to_string(),
            lang: lang.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider.clone());

        let first = service.subtitles(&request(None)).await.unwrap();
        let second = service.subtitles(&request(None)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let provider = Arc::new(FakeProvider::default());
        let (service, clock) = service(provider.clone());

        service.subtitles(&request(None)).await.unwrap();
        clock.advance(61_000);
        service.subtitles(&request(None)).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_namespaces_and_languages_are_cached_separately() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider.clone());

        let tracks = service.caption_tracks(&request(Some("ko"))).await.unwrap();
        service.subtitles(&request(Some("ko"))).await.unwrap();
        service.subtitles(&request(Some("en"))).await.unwrap();

        assert_eq!(tracks[0].language_code, "ko");
        assert_eq!(tracks[0].base_url, "dQw4w9WgXcQ");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

        let cache = service.cache().read().await;
        assert_eq!(cache.len(Namespace::TrackList), 1);
        assert_eq!(cache.len(Namespace::SubtitleBody), 2);
    }

    #[tokio::test]
    async fn test_track_language_defaults_to_en() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider);

        let tracks = service.caption_tracks(&request(None)).await.unwrap();
        assert_eq!(tracks[0].language_code, "en");
        assert_eq!(tracks[0].name, "en");
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider.clone());

        let lookups = (0..8).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.subtitles(&request(None)).await })
        });
        for handle in lookups.collect::<Vec<_>>() {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(lock_flights(&service.in_flight).is_empty());

        // Each lookup is counted once, as either a hit or a miss.
        let stats = service.cache().read().await.stats();
        assert_eq!(stats.hits + stats.misses, 8);
        assert!(stats.misses >= 1);
    }

    #[tokio::test]
    async fn test_cached_lookup_counts_one_miss_and_one_hit() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider);

        service.subtitles(&request(None)).await.unwrap();
        service.subtitles(&request(None)).await.unwrap();

        let stats = service.cache().read().await.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_lookups_leave_no_flights() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider.clone());

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let service = service.clone();
                let req = TranscriptRequest {
                    video_id: format!("video{:06}", i),
                    lang: None,
                };
                tokio::spawn(async move { service.subtitles(&req).await })
            })
            .collect();

        // The provider answers after 20ms; cancel every lookup mid-fetch.
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
        for handle in handles {
            handle.abort();
            assert!(handle.await.unwrap_err().is_cancelled());
        }

        assert!(lock_flights(&service.in_flight).is_empty());
        assert!(service.cache().read().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_waiter_keeps_flight_for_fetcher() {
        let provider = Arc::new(FakeProvider::default());
        let (service, _) = service(provider.clone());

        let fetcher = {
            let service = service.clone();
            tokio::spawn(async move { service.subtitles(&request(None)).await })
        };
        let waiter = {
            let service = service.clone();
            tokio::spawn(async move { service.subtitles(&request(None)).await })
        };

        tokio::time::sleep(Duration::from_millis(5)).await;
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());
        assert_eq!(lock_flights(&service.in_flight).len(), 1);

        assert!(fetcher.await.unwrap().is_ok());
        assert!(lock_flights(&service.in_flight).is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_not_cached() {
        let provider = Arc::new(FakeProvider {
            empty: true,
            ..Default::default()
        });
        let (service, _) = service(provider.clone());

        let err = service.caption_tracks(&request(None)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(service.cache().read().await.is_empty());

        service.caption_tracks(&request(None)).await.unwrap_err();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_cached() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..Default::default()
        });
        let (service, _) = service(provider);

        let err = service.subtitles(&request(None)).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
        assert!(service.cache().read().await.is_empty());
    }

    #[test]
    fn test_provider_error_mapping() {
        let ns = Namespace::SubtitleBody;
        assert!(matches!(
            provider_error(ns, "id", ProviderError::TranscriptsDisabled("id".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            provider_error(ns, "id", ProviderError::TooManyRequests),
            ApiError::Upstream(_)
        ));
        match provider_error(
            ns,
            "id",
            ProviderError::LanguageNotAvailable {
                lang: "de".into(),
                available: "en".into(),
            },
        ) {
            ApiError::NotFound(msg) => assert!(msg.contains("'de'")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
