//! Two-tier metadata lookup: `AniList` first, Kitsu as the degraded source.
//!
//! Kitsu payloads are normalized into the canonical (AniList-shaped) record
//! before they leave this module, so callers only ever see one shape.

use crate::clients::{KITSU, MetadataProvider, ProviderError};
use crate::domain::{MediaParams, MediaQuery, QueryError, Source};
use crate::models::anime::{Anime, KitsuAnime};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// One upstream that failed while resolving a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub service: String,
    pub message: String,
}

impl From<&ProviderError> for ProviderFailure {
    fn from(err: &ProviderError) -> Self {
        Self {
            service: err.service().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidRequest(#[from] QueryError),

    #[error("{0}")]
    NotFound(String),

    #[error("{} API unavailable: {}", .0.service, .0.message)]
    Unavailable(ProviderFailure),

    #[error("{} API unavailable and fallback is disabled", .0.service)]
    FallbackDisabled(ProviderFailure),

    #[error("All metadata providers are unavailable")]
    AllProvidersFailed(Vec<ProviderFailure>),
}

impl CatalogError {
    fn from_provider(err: &ProviderError) -> Self {
        if err.is_unavailable() {
            Self::Unavailable(err.into())
        } else {
            Self::NotFound(err.to_string())
        }
    }
}

/// A validated aggregation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub query: MediaQuery,
    pub source: Option<Source>,
    /// Explicit fallback preference; `None` defers to the service default.
    pub fallback: Option<bool>,
}

impl CatalogRequest {
    pub fn from_params(
        params: &MediaParams<'_>,
        source: Option<&str>,
        fallback: Option<&str>,
    ) -> Result<Self, QueryError> {
        let query = MediaQuery::from_params(params)?;

        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()?;

        let fallback = fallback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| matches!(f.to_ascii_lowercase().as_str(), "true" | "1" | "yes"));

        Ok(Self {
            query,
            source,
            fallback,
        })
    }
}

/// Maps a Kitsu `data` member (array or single resource) to canonical records.
pub fn normalize_kitsu_payload(payload: Value) -> Result<Value, ProviderError> {
    let decode = |e: serde_json::Error| ProviderError::decode(KITSU, e.to_string());

    let normalized = if payload.is_array() {
        let records: Vec<KitsuAnime> = serde_json::from_value(payload).map_err(decode)?;
        let canonical: Vec<Anime> = records.into_iter().map(Anime::from).collect();
        serde_json::to_value(canonical)
    } else {
        let record: KitsuAnime = serde_json::from_value(payload).map_err(decode)?;
        serde_json::to_value(Anime::from(record))
    };

    normalized.map_err(decode)
}

pub struct CatalogService {
    primary: Arc<dyn MetadataProvider>,
    secondary: Arc<dyn MetadataProvider>,
    fallback_by_default: bool,
}

impl CatalogService {
    /// `primary` answers in the canonical shape; `secondary` is expected to
    /// speak Kitsu's JSON:API and is normalized on the way out.
    #[must_use]
    pub fn new(
        primary: Arc<dyn MetadataProvider>,
        secondary: Arc<dyn MetadataProvider>,
        fallback_by_default: bool,
    ) -> Self {
        Self {
            primary,
            secondary,
            fallback_by_default,
        }
    }

    pub async fn resolve(&self, request: &CatalogRequest) -> Result<Value, CatalogError> {
        // An explicit Kitsu request reports its failure as is, no retry.
        if request.source == Some(Source::Kitsu) {
            return self
                .fetch_secondary(&request.query, false)
                .await
                .map_err(|e| CatalogError::from_provider(&e));
        }

        let primary_err = match self.fetch_from(&*self.primary, &request.query, true).await {
            Ok(payload) => return Ok(payload),
            Err(e) if !e.is_unavailable() => return Err(CatalogError::NotFound(e.to_string())),
            Err(e) => e,
        };

        let fallback = request.fallback.unwrap_or(self.fallback_by_default);
        if !fallback || request.source == Some(Source::Anilist) {
            warn!(error = %primary_err, query = %request.query, "Primary provider failed, fallback disabled");
            return Err(CatalogError::FallbackDisabled((&primary_err).into()));
        }

        warn!(
            error = %primary_err,
            query = %request.query,
            fallback = self.secondary.name(),
            "Primary provider failed, falling back"
        );
        metrics::counter!("provider_fallbacks_total").increment(1);

        match self.fetch_secondary(&request.query, true).await {
            Ok(payload) => {
                info!(query = %request.query, "Served from fallback provider");
                Ok(payload)
            }
            Err(secondary_err) => {
                warn!(error = %secondary_err, query = %request.query, "Fallback provider failed");
                Err(CatalogError::AllProvidersFailed(vec![
                    (&primary_err).into(),
                    (&secondary_err).into(),
                ]))
            }
        }
    }

    async fn fetch_secondary(
        &self,
        query: &MediaQuery,
        retry: bool,
    ) -> Result<Value, ProviderError> {
        let payload = self.fetch_from(&*self.secondary, query, retry).await?;
        normalize_kitsu_payload(payload)
    }

    async fn fetch_from(
        &self,
        provider: &dyn MetadataProvider,
        query: &MediaQuery,
        retry: bool,
    ) -> Result<Value, ProviderError> {
        let result = if retry {
            provider.fetch(query).await
        } else {
            provider.fetch_once(query).await
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_unavailable() => "unavailable",
            Err(_) => "not_found",
        };
        metrics::counter!(
            "provider_requests_total",
            "provider" => provider.name(),
            "kind" => query.kind().as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ANILIST;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Respond(Value),
        FailStatus(u16),
        Missing,
    }

    struct FakeProvider {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
        single_attempt_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
                single_attempt_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn single_attempt_calls(&self) -> usize {
            self.single_attempt_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl MetadataProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Respond(value) => Ok(value.clone()),
                Behavior::FailStatus(status) => Err(ProviderError::Status {
                    service: self.name,
                    status: *status,
                }),
                Behavior::Missing => Err(ProviderError::NotFound {
                    service: self.name,
                    id: match query {
                        MediaQuery::Detail { id } => *id,
                        _ => 0,
                    },
                }),
            }
        }

        async fn fetch_once(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
            self.single_attempt_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch(query).await
        }
    }

    fn kitsu_list() -> Value {
        json!([{
            "id": "1",
            "type": "anime",
            "attributes": {
                "canonicalTitle": "Cowboy Bebop",
                "titles": { "en": "Cowboy Bebop", "en_jp": "Cowboy Bebop", "ja_jp": "カウボーイビバップ" },
                "synopsis": "In the year 2071...",
                "posterImage": { "large": "https://media.kitsu.io/anime/poster_images/1/large.jpg" },
                "episodeCount": 26,
                "status": "finished",
                "averageRating": "8.5"
            }
        }])
    }

    fn request(query: MediaQuery) -> CatalogRequest {
        CatalogRequest {
            query,
            source: None,
            fallback: None,
        }
    }

    #[tokio::test]
    async fn test_primary_success_is_returned_verbatim() {
        let anilist_payload = json!([{ "id": 21, "title": { "romaji": "One Piece" } }]);
        let anilist = FakeProvider::new(ANILIST, Behavior::Respond(anilist_payload.clone()));
        let kitsu = FakeProvider::new(KITSU, Behavior::Respond(kitsu_list()));
        let service = CatalogService::new(anilist.clone(), kitsu.clone(), true);

        let result = service.resolve(&request(MediaQuery::Trending)).await.unwrap();

        assert_eq!(result, anilist_payload);
        assert_eq!(kitsu.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_and_normalizes() {
        let anilist = FakeProvider::new(ANILIST, Behavior::FailStatus(500));
        let kitsu = FakeProvider::new(KITSU, Behavior::Respond(kitsu_list()));
        let service = CatalogService::new(anilist.clone(), kitsu.clone(), true);

        let result = service.resolve(&request(MediaQuery::Popular)).await.unwrap();

        assert_eq!(anilist.calls(), 1);
        assert_eq!(kitsu.calls(), 1);
        assert_eq!(kitsu.single_attempt_calls(), 0);
        let first = &result[0];
        assert_eq!(first["title"]["romaji"], "Cowboy Bebop");
        assert_eq!(first["coverImage"]["large"], "https://media.kitsu.io/anime/poster_images/1/large.jpg");
        assert_eq!(first["episodes"], 26);
        assert_eq!(first["status"], "finished");
        assert_eq!(first["averageScore"], 85.0);
        assert!(first["studios"].is_null());
        assert_eq!(first["kitsuId"], "1");
    }

    #[tokio::test]
    async fn test_explicit_kitsu_never_calls_anilist() {
        let anilist = FakeProvider::new(ANILIST, Behavior::Respond(json!([])));
        let kitsu = FakeProvider::new(KITSU, Behavior::Respond(kitsu_list()));
        let service = CatalogService::new(anilist.clone(), kitsu.clone(), true);

        let req = CatalogRequest {
            source: Some(Source::Kitsu),
            ..request(MediaQuery::Trending)
        };
        let result = service.resolve(&req).await.unwrap();

        assert_eq!(anilist.calls(), 0);
        assert_eq!(result[0]["title"]["english"], "Cowboy Bebop");
    }

    #[tokio::test]
    async fn test_explicit_kitsu_failure_is_terminal() {
        let anilist = FakeProvider::new(ANILIST, Behavior::Respond(json!([])));
        let kitsu = FakeProvider::new(KITSU, Behavior::FailStatus(503));
        let service = CatalogService::new(anilist.clone(), kitsu.clone(), true);

        let req = CatalogRequest {
            source: Some(Source::Kitsu),
            ..request(MediaQuery::Trending)
        };
        let err = service.resolve(&req).await.unwrap_err();

        assert!(matches!(err, CatalogError::Unavailable(ref f) if f.service == "Kitsu"));
        assert_eq!(anilist.calls(), 0);
        assert_eq!(kitsu.calls(), 1);
        assert_eq!(kitsu.single_attempt_calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failing_names_both_causes() {
        let anilist = FakeProvider::new(ANILIST, Behavior::FailStatus(502));
        let kitsu = FakeProvider::new(KITSU, Behavior::FailStatus(500));
        let service = CatalogService::new(anilist, kitsu, true);

        let err = service
            .resolve(&request(MediaQuery::Search {
                search: "one piece".to_string(),
            }))
            .await
            .unwrap_err();

        let CatalogError::AllProvidersFailed(failures) = err else {
            panic!("expected AllProvidersFailed");
        };
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].service, "AniList");
        assert_eq!(failures[0].message, "AniList API error: 502");
        assert_eq!(failures[1].service, "Kitsu");
        assert_eq!(failures[1].message, "Kitsu API error: 500");
    }

    #[tokio::test]
    async fn test_fallback_can_be_disabled_per_request() {
        let anilist = FakeProvider::new(ANILIST, Behavior::FailStatus(500));
        let kitsu = FakeProvider::new(KITSU, Behavior::Respond(kitsu_list()));
        let service = CatalogService::new(anilist, kitsu.clone(), true);

        let req = CatalogRequest {
            fallback: Some(false),
            ..request(MediaQuery::Trending)
        };
        let err = service.resolve(&req).await.unwrap_err();

        assert!(matches!(err, CatalogError::FallbackDisabled(_)));
        assert_eq!(kitsu.calls(), 0);
    }

    #[tokio::test]
    async fn test_not_found_does_not_fall_back() {
        let anilist = FakeProvider::new(ANILIST, Behavior::Missing);
        let kitsu = FakeProvider::new(KITSU, Behavior::Respond(kitsu_list()));
        let service = CatalogService::new(anilist, kitsu.clone(), true);

        let err = service
            .resolve(&request(MediaQuery::Detail { id: 999_999_999 }))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::NotFound(_)));
        assert_eq!(kitsu.calls(), 0);
    }

    #[test]
    fn test_request_parsing() {
        let params = MediaParams {
            kind: Some("trending"),
            ..Default::default()
        };

        let req = CatalogRequest::from_params(&params, Some("kitsu"), Some("false")).unwrap();
        assert_eq!(req.source, Some(Source::Kitsu));
        assert_eq!(req.fallback, Some(false));

        let req = CatalogRequest::from_params(&params, None, Some("true")).unwrap();
        assert_eq!(req.fallback, Some(true));

        let req = CatalogRequest::from_params(&params, Some(""), None).unwrap();
        assert_eq!(req.source, None);
        assert_eq!(req.fallback, None);

        assert!(CatalogRequest::from_params(&params, Some("mal"), None).is_err());
    }

    #[test]
    fn test_normalize_single_record() {
        let record = kitsu_list()[0].clone();
        let normalized = normalize_kitsu_payload(record).unwrap();
        assert!(normalized.is_object());
        assert_eq!(normalized["id"], "1");
        assert_eq!(normalized["description"], "In the year 2071...");

        assert!(normalize_kitsu_payload(json!("nonsense")).is_err());
    }
}
