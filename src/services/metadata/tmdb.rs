//! TMDb metadata provider
//!
//! All reads go through `fetch`, which authenticates, applies the response
//! cache and reports non-success statuses as `AppError::ExternalApi`. The
//! trait methods only pick an endpoint and project the JSON onto catalog
//! records.

use crate::{
    cache::{Cache, CacheKey},
    cached,
    config::Config,
    error::{AppError, AppResult},
    models::{
        tmdb::{
            TmdbCountry, TmdbCredits, TmdbGenreList, TmdbKeyword, TmdbListResponse, TmdbMovie,
            TmdbMultiResult, TmdbSeasonDetails, TmdbSeries,
        },
        CastMember, CatalogItem, CatalogPage, Country, Genre, MediaKind, Params, SearchHit,
        SeasonDetails,
    },
    services::metadata::MetadataProvider,
};
use reqwest::{header::ACCEPT, Client as HttpClient};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// How requests authenticate against TMDb
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// v3 key, sent as the `api_key` query parameter
    ApiKey(String),
    /// v4 read access token, sent as `Authorization: Bearer`
    BearerToken(String),
}

impl Credential {
    /// Picks the bearer token when present, then the API key. Blank values are ignored.
    pub fn from_config(config: &Config) -> Option<Self> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        present(&config.tmdb_access_token)
            .map(Credential::BearerToken)
            .or_else(|| present(&config.tmdb_api_key).map(Credential::ApiKey))
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credential::ApiKey(key) => request.query(&[("api_key", key.as_str())]),
            Credential::BearerToken(token) => request.bearer_auth(token),
        }
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_url: String,
    credential: Option<Credential>,
    cache: Cache,
    cache_ttl: u64,
}

impl TmdbClient {
    pub fn new(
        cache: Cache,
        credential: Option<Credential>,
        api_url: impl Into<String>,
        cache_ttl: u64,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credential,
            cache,
            cache_ttl,
        }
    }

    pub fn from_config(config: &Config, cache: Cache) -> Self {
        Self::new(
            cache,
            Credential::from_config(config),
            config.tmdb_api_url.clone(),
            config.cache_ttl_secs,
        )
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Authenticated, cached GET returning the raw JSON body
    async fn fetch(&self, endpoint: &str, params: &Params) -> AppResult<Value> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            AppError::Configuration(
                "TMDb credential is missing; set TMDB_ACCESS_TOKEN or TMDB_API_KEY".to_string(),
            )
        })?;

        let key = CacheKey::request(endpoint, params.pairs());

        cached!(self.cache, key, self.cache_ttl, async move {
            let url = format!("{}/{}", self.api_url, endpoint.trim_start_matches('/'));
            let request = self
                .http_client
                .get(&url)
                .header(ACCEPT, "application/json")
                .query(params.pairs());

            let response = credential.apply(request).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    endpoint = %endpoint,
                    status = %status,
                    body = %body,
                    "TMDb request failed"
                );
                return Err(AppError::ExternalApi(format!(
                    "TMDb returned status {} for {}",
                    status, endpoint
                )));
            }

            let body: Value = response.json().await?;
            tracing::debug!(endpoint = %endpoint, "TMDb request completed");
            Ok(body)
        })
    }

    async fn fetch_as<T: DeserializeOwned>(&self, endpoint: &str, params: &Params) -> AppResult<T> {
        let body = self.fetch(endpoint, params).await?;
        serde_json::from_value(body).map_err(|e| {
            AppError::ExternalApi(format!("Unexpected TMDb response for {}: {}", endpoint, e))
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    async fn list(
        &self,
        kind: MediaKind,
        endpoint: &str,
        params: Params,
    ) -> AppResult<CatalogPage> {
        let page = match kind {
            MediaKind::Movie => {
                let data: TmdbListResponse<TmdbMovie> = self.fetch_as(endpoint, &params).await?;
                CatalogPage::new(
                    data.results.into_iter().map(CatalogItem::from).collect(),
                    data.total_pages,
                )
            }
            MediaKind::Series => {
                let data: TmdbListResponse<TmdbSeries> = self.fetch_as(endpoint, &params).await?;
                CatalogPage::new(
                    data.results.into_iter().map(CatalogItem::from).collect(),
                    data.total_pages,
                )
            }
        };

        tracing::info!(
            endpoint = %endpoint,
            results = page.items.len(),
            total_pages = page.total_pages,
            provider = "tmdb",
            "Catalog list fetched"
        );

        Ok(page)
    }

    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogItem> {
        let endpoint = format!("{}/{}", kind.path_segment(), id);
        let item = match kind {
            MediaKind::Movie => self
                .fetch_as::<TmdbMovie>(&endpoint, &Params::new())
                .await?
                .into(),
            MediaKind::Series => self
                .fetch_as::<TmdbSeries>(&endpoint, &Params::new())
                .await?
                .into(),
        };
        Ok(item)
    }

    async fn genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>> {
        let endpoint = format!("genre/{}/list", kind.path_segment());
        let list: TmdbGenreList = self.fetch_as(&endpoint, &Params::new()).await?;
        Ok(list.genres)
    }

    async fn search_multi(&self, query: &str, page: u32) -> AppResult<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let params = Params::new()
            .with("query", query)
            .with("page", page.max(1))
            .with("include_adult", false);
        let data: TmdbListResponse<TmdbMultiResult> =
            self.fetch_as("search/multi", &params).await?;

        let hits: Vec<SearchHit> = data
            .results
            .into_iter()
            .filter_map(TmdbMultiResult::into_hit)
            .collect();

        tracing::info!(
            query = %query,
            results = hits.len(),
            provider = "tmdb",
            "Multi-search completed"
        );

        Ok(hits)
    }

    async fn keyword_id(&self, keyword: &str) -> AppResult<Option<u64>> {
        let params = Params::new().with("query", keyword.trim());
        let data: TmdbListResponse<TmdbKeyword> = self.fetch_as("search/keyword", &params).await?;
        Ok(data.results.first().map(|k| k.id))
    }

    async fn credits(&self, kind: MediaKind, id: u64) -> AppResult<Vec<CastMember>> {
        let endpoint = format!("{}/{}/credits", kind.path_segment(), id);
        let credits: TmdbCredits = self.fetch_as(&endpoint, &Params::new()).await?;
        Ok(credits.cast.into_iter().map(CastMember::from).collect())
    }

    async fn season(&self, series_id: u64, season_number: u32) -> AppResult<SeasonDetails> {
        let endpoint = format!("tv/{}/season/{}", series_id, season_number);
        let season: TmdbSeasonDetails = self.fetch_as(&endpoint, &Params::new()).await?;
        Ok(season.into())
    }

    async fn countries(&self) -> AppResult<Vec<Country>> {
        let countries: Vec<TmdbCountry> = self
            .fetch_as("configuration/countries", &Params::new())
            .await?;
        Ok(countries.into_iter().map(Country::from).collect())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    // Nothing listens here, so any test that reaches the network fails loudly.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn config(pairs: &[(&str, &str)]) -> Config {
        Config::from_vars(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()))).unwrap()
    }

    #[test]
    fn test_credential_prefers_bearer_token() {
        let cfg = config(&[("TMDB_API_KEY", "key"), ("TMDB_ACCESS_TOKEN", "token")]);
        assert_eq!(
            Credential::from_config(&cfg),
            Some(Credential::BearerToken("token".to_string()))
        );
    }

    #[test]
    fn test_credential_falls_back_to_api_key() {
        let cfg = config(&[("TMDB_API_KEY", " key "), ("TMDB_ACCESS_TOKEN", "")]);
        assert_eq!(
            Credential::from_config(&cfg),
            Some(Credential::ApiKey("key".to_string()))
        );
        assert_eq!(Credential::from_config(&config(&[])), None);
    }

    #[tokio::test]
    async fn test_missing_credential_is_a_configuration_error() {
        let (cache, _handle) = Cache::in_memory();
        let client = TmdbClient::new(cache, None, UNREACHABLE, 3600);

        let result = client
            .list(MediaKind::Movie, "movie/popular", Params::new())
            .await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_list_is_served_from_cache_and_capped() {
        let (cache, _handle) = Cache::in_memory();
        let params = Params::new().with("page", 1);
        cache.set_in_background(
            &CacheKey::request("movie/popular", params.pairs()),
            &json!({
                "page": 1,
                "total_pages": 41_000,
                "results": [
                    {"id": 603, "title": "The Matrix", "poster_path": "/m.jpg"},
                    {"id": 604, "title": "The Matrix Reloaded"}
                ]
            }),
            60,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = TmdbClient::new(
            cache,
            Some(Credential::ApiKey("key".to_string())),
            UNREACHABLE,
            3600,
        );
        let page = client
            .list(MediaKind::Movie, "movie/popular", params)
            .await
            .unwrap();

        assert_eq!(page.total_pages, 500);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title(), "The Matrix");
        assert!(!page.items[1].has_poster());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let (cache, _handle) = Cache::in_memory();
        let client = TmdbClient::new(
            cache,
            Some(Credential::ApiKey("key".to_string())),
            UNREACHABLE,
            3600,
        );

        let result = client.genres(MediaKind::Series).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_blank_search_skips_upstream() {
        let (cache, _handle) = Cache::in_memory();
        let client = TmdbClient::new(cache, None, UNREACHABLE, 3600);

        let hits = client.search_multi("   ", 1).await.unwrap();
        assert!(hits.is_empty());
    }
}
