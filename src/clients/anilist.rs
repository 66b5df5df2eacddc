use super::{ANILIST, MetadataProvider, ProviderError, ResponseCache};
use crate::domain::MediaQuery;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

const ANILIST_API: &str = "https://graphql.anilist.co";

const TRENDING_QUERY: &str = r#"
    query {
        Page(page: 1, perPage: 12) {
            media(sort: TRENDING_DESC, type: ANIME) {
                id
                title { english romaji native }
                coverImage { large }
                bannerImage
                description
                episodes
                status
                genres
                averageScore
                studios { nodes { name } }
                season
                seasonYear
            }
        }
    }
"#;

const SEASONAL_QUERY: &str = r#"
    query ($season: MediaSeason!, $year: Int!) {
        Page(page: 1, perPage: 12) {
            media(season: $season, seasonYear: $year, sort: POPULARITY_DESC, type: ANIME) {
                id
                title { english romaji native }
                coverImage { large }
                bannerImage
                description
                episodes
                status
                genres
                averageScore
                studios { nodes { name } }
                season
                seasonYear
            }
        }
    }
"#;

const POPULAR_QUERY: &str = r#"
    query {
        Page(page: 1, perPage: 12) {
            media(sort: POPULARITY_DESC, type: ANIME) {
                id
                title { english romaji native }
                coverImage { large }
                bannerImage
                description
                episodes
                status
                genres
                averageScore
                studios { nodes { name } }
            }
        }
    }
"#;

const SEARCH_QUERY: &str = r#"
    query ($search: String!) {
        Page(page: 1, perPage: 20) {
            media(search: $search, type: ANIME) {
                id
                title { english romaji native }
                coverImage { large }
                bannerImage
                description
                episodes
                status
                genres
                averageScore
                studios { nodes { name } }
            }
        }
    }
"#;

const DETAIL_QUERY: &str = r#"
    query ($id: Int!) {
        Media(id: $id, type: ANIME) {
            id
            title { english romaji native }
            coverImage { large }
            bannerImage
            description
            episodes
            status
            genres
            averageScore
            studios { nodes { name } }
            season
            seasonYear
            startDate { year month day }
            endDate { year month day }
            duration
            source
        }
    }
"#;

const GENRES_QUERY: &str = r#"
    query {
        GenreCollection
    }
"#;

const ANIME_BY_GENRE_QUERY: &str = r#"
    query ($genre: String!, $page: Int) {
        Page(page: $page, perPage: 20) {
            pageInfo { hasNextPage }
            media(genre_in: [$genre], sort: POPULARITY_DESC, type: ANIME) {
                id
                title { english romaji native }
                coverImage { large }
                bannerImage
                description
                episodes
                status
                genres
                averageScore
                studios { nodes { name } }
                season
                seasonYear
                startDate { year month day }
                endDate { year month day }
                duration
                source
            }
        }
    }
"#;

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Deserialize)]
struct GraphQLError {
    message: String,
}

/// A page of anime for one genre, with `AniList`'s paging info.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenrePage {
    pub anime: Value,
    pub page_info: Value,
}

#[derive(Clone)]
pub struct AnilistClient {
    client: Client,
    endpoint: String,
    cache: ResponseCache,
}

impl Default for AnilistClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnilistClient {
    pub fn new() -> Self {
        Self::with_shared_client(Client::new(), ANILIST_API, ResponseCache::disabled())
    }

    pub fn with_shared_client(
        client: Client,
        endpoint: impl Into<String>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            cache,
        }
    }

    /// Runs a media query and returns `AniList`'s payload untouched: the
    /// `Page.media` array for list kinds, the `Media` object for detail.
    pub async fn fetch_media(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        match query {
            MediaQuery::Trending => self.page_media("trending", TRENDING_QUERY, json!({})).await,
            MediaQuery::Seasonal { season, year } => {
                self.page_media(
                    "seasonal",
                    SEASONAL_QUERY,
                    json!({ "season": season.as_anilist(), "year": year }),
                )
                .await
            }
            MediaQuery::Popular => self.page_media("popular", POPULAR_QUERY, json!({})).await,
            MediaQuery::Search { search } => {
                self.page_media("search", SEARCH_QUERY, json!({ "search": search }))
                    .await
            }
            MediaQuery::Detail { id } => {
                let data = self
                    .execute("detail", DETAIL_QUERY, &json!({ "id": id }))
                    .await
                    .map_err(|err| match err {
                        ProviderError::Status { status: 404, .. } => ProviderError::NotFound {
                            service: ANILIST,
                            id: *id,
                        },
                        other => other,
                    })?;

                match data.get("Media") {
                    Some(media) if !media.is_null() => Ok(media.clone()),
                    _ => Err(ProviderError::NotFound {
                        service: ANILIST,
                        id: *id,
                    }),
                }
            }
        }
    }

    /// Every genre name `AniList` knows.
    pub async fn genres(&self) -> Result<Value, ProviderError> {
        let data = self.execute("genres", GENRES_QUERY, &json!({})).await?;
        data.get("GenreCollection")
            .filter(|genres| genres.is_array())
            .cloned()
            .ok_or_else(|| ProviderError::decode(ANILIST, "missing GenreCollection"))
    }

    /// Popular anime tagged with `genre`, 20 per page.
    pub async fn anime_by_genre(&self, genre: &str, page: u32) -> Result<GenrePage, ProviderError> {
        let data = self
            .execute(
                "genre",
                ANIME_BY_GENRE_QUERY,
                &json!({ "genre": genre, "page": page.max(1) }),
            )
            .await?;

        let page = data
            .get("Page")
            .ok_or_else(|| ProviderError::decode(ANILIST, "missing Page"))?;

        Ok(GenrePage {
            anime: page.get("media").cloned().unwrap_or_else(|| json!([])),
            page_info: page
                .get("pageInfo")
                .cloned()
                .unwrap_or_else(|| json!({ "hasNextPage": false })),
        })
    }

    async fn page_media(
        &self,
        name: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value, ProviderError> {
        let data = self.execute(name, query, &variables).await?;
        data.pointer("/Page/media")
            .filter(|media| media.is_array())
            .cloned()
            .ok_or_else(|| ProviderError::decode(ANILIST, "missing Page.media"))
    }

    /// POSTs one GraphQL document and returns its `data` member.
    async fn execute(
        &self,
        name: &str,
        query: &str,
        variables: &Value,
    ) -> Result<Value, ProviderError> {
        let cache_key = format!("{name}:{variables}");
        if let Some(hit) = self.cache.get(&cache_key).await {
            debug!(query = name, "AniList cache hit");
            return Ok(hit);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GraphQLRequest { query, variables })
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                service: ANILIST,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                service: ANILIST,
                status: status.as_u16(),
            });
        }

        let body: GraphQLResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(ANILIST, e.to_string()))?;

        let data = match body.data {
            Some(data) if !data.is_null() => data,
            _ if !body.errors.is_empty() => {
                let message = body
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(ProviderError::GraphQl {
                    service: ANILIST,
                    message,
                });
            }
            _ => return Err(ProviderError::decode(ANILIST, "response has no data")),
        };

        self.cache.insert(cache_key, data.clone()).await;
        Ok(data)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for AnilistClient {
    fn name(&self) -> &'static str {
        ANILIST
    }

    async fn fetch(&self, query: &MediaQuery) -> Result<Value, ProviderError> {
        self.fetch_media(query).await
    }
}
