use super::{KITSU, MetadataProvider, ProviderError, ResponseCache};
use crate::domain::MediaQuery;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const KITSU_API: &str = "https://kitsu.io/api/edge";
const JSON_API: &str = "application/vnd.api+json";

#[derive(Debug, Deserialize)]
struct KitsuDocument {
    data: Value,
    #[serde(default)]
    included: Vec<KitsuIncluded>,
}

#[derive(Debug, Deserialize)]
struct KitsuIncluded {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Value,
}

#[derive(Clone)]
pub struct KitsuClient {
    client: Client,
    base_url: String,
    cache: ResponseCache,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Default for KitsuClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KitsuClient {
    pub fn new() -> Self {
        Self::with_shared_client(Client::new(), KITSU_API, ResponseCache::disabled())
    }

    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache,
            max_attempts: 2,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Sets the attempt budget and the fixed wait between attempts.
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Runs a media query and returns Kitsu's JSON:API `data` member.
    /// Transient failures are retried up to the configured attempt budget.
    pub async fn fetch_anime(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        self.fetch_with_attempts(query, self.max_attempts).await
    }

    /// Same as [`Self::fetch_anime`] but with a single attempt per request.
    pub async fn fetch_anime_once(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        self.fetch_with_attempts(query, 1).await
    }

    async fn fetch_with_attempts(
        &self,
        query: &MediaQuery,
        attempts: u32,
    ) -> Result<Value, ProviderError> {
        match query {
            MediaQuery::Trending => {
                self.list(&[("sort", "-user_count"), ("page[limit]", "12")], attempts)
                    .await
            }
            MediaQuery::Seasonal { season, year } => {
                let year = year.to_string();
                self.list(
                    &[
                        ("filter[season]", season.as_kitsu()),
                        ("filter[seasonYear]", year.as_str()),
                        ("sort", "-user_count"),
                        ("page[limit]", "12"),
                    ],
                    attempts,
                )
                .await
            }
            MediaQuery::Popular => {
                self.list(&[("sort", "-average_rating"), ("page[limit]", "12")], attempts)
                    .await
            }
            MediaQuery::Search { search } => {
                self.list(
                    &[("filter[text]", search.as_str()), ("page[limit]", "20")],
                    attempts,
                )
                .await
            }
            MediaQuery::Detail { id } => self.detail(*id, attempts).await,
        }
    }

    async fn list(&self, params: &[(&str, &str)], attempts: u32) -> Result<Value, ProviderError> {
        let document = self.get_document("anime", params, attempts).await?;
        if document.data.is_array() {
            Ok(document.data)
        } else {
            Err(ProviderError::decode(KITSU, "expected an array of anime"))
        }
    }

    /// Fetches one anime, then merges genre names from a second
    /// `include=genres` call into `attributes.genres`. The enrichment is
    /// best effort: on failure the plain record is returned.
    async fn detail(&self, id: i64, attempts: u32) -> Result<Value, ProviderError> {
        let path = format!("anime/{id}");
        let document = self
            .get_document(&path, &[], attempts)
            .await
            .map_err(|err| match err {
                ProviderError::Status { status: 404, .. } => {
                    ProviderError::NotFound { service: KITSU, id }
                }
                other => other,
            })?;

        let mut record = document.data;
        if !record.is_object() {
            return Err(ProviderError::NotFound { service: KITSU, id });
        }

        match self.genres_for(&path, attempts).await {
            Ok(genres) => {
                if let Some(attributes) = record
                    .get_mut("attributes")
                    .and_then(Value::as_object_mut)
                {
                    attributes.insert("genres".to_string(), json!(genres));
                }
            }
            Err(e) => warn!(anime_id = id, error = %e, "Kitsu genre enrichment failed"),
        }

        Ok(record)
    }

    async fn genres_for(&self, path: &str, attempts: u32) -> Result<Vec<String>, ProviderError> {
        let document = self
            .get_document(path, &[("include", "genres")], attempts)
            .await?;
        Ok(document
            .included
            .into_iter()
            .filter(|item| item.kind == "genres")
            .filter_map(|item| {
                item.attributes
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect())
    }

    /// GETs a JSON:API document, retrying transient failures after a fixed
    /// delay until `attempts` requests have been made.
    async fn get_document(
        &self,
        path: &str,
        params: &[(&str, &str)],
        attempts: u32,
    ) -> Result<KitsuDocument, ProviderError> {
        let url = self.build_url(path, params)?;
        let cache_key = url.to_string();

        let raw = if let Some(hit) = self.cache.get(&cache_key).await {
            debug!(url = %cache_key, "Kitsu cache hit");
            hit
        } else {
            let mut attempt = 1;
            let raw = loop {
                match self.request(url.clone()).await {
                    Ok(raw) => break raw,
                    Err(e) if e.is_retryable() && attempt < attempts => {
                        warn!(
                            attempt,
                            max_attempts = attempts,
                            error = %e,
                            "Kitsu request failed, retrying"
                        );
                        tokio::time::sleep(self.retry_delay).await;
                        attempt += 1;
                    }
                    Err(e) => return Err(e),
                }
            };
            self.cache.insert(cache_key, raw.clone()).await;
            raw
        };

        serde_json::from_value(raw).map_err(|e| ProviderError::decode(KITSU, e.to_string()))
    }

    async fn request(&self, url: url::Url) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, JSON_API)
            .header(reqwest::header::CONTENT_TYPE, JSON_API)
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                service: KITSU,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                service: KITSU,
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::decode(KITSU, e.to_string()))
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<url::Url, ProviderError> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut url = url::Url::parse(&raw)
            .map_err(|e| ProviderError::decode(KITSU, format!("invalid URL {raw}: {e}")))?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for KitsuClient {
    fn name(&self) -> &'static str {
        KITSU
    }

    async fn fetch(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        self.fetch_anime(query).await
    }

    async fn fetch_once(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        self.fetch_anime_once(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_filters() {
        let client = KitsuClient::with_shared_client(
            Client::new(),
            "https://kitsu.io/api/edge/",
            ResponseCache::disabled(),
        );

        let url = client
            .build_url("anime", &[("filter[text]", "one piece"), ("page[limit]", "20")])
            .unwrap();

        assert_eq!(url.path(), "/api/edge/anime");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("filter[text]".to_string(), "one piece".to_string()),
                ("page[limit]".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_retry_budget_never_below_one() {
        let client = KitsuClient::new().with_retry(0, Duration::ZERO);
        assert_eq!(client.max_attempts, 1);
    }
}
