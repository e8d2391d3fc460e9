//! Catalog metadata abstraction
//!
//! Everything the catalog layer needs from an upstream metadata source, already
//! normalized into catalog records. `TmdbClient` is the production
//! implementation; tests substitute mocks.

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{
        CastMember, CatalogItem, CatalogPage, Country, Genre, MediaKind, Params, SearchHit,
        SeasonDetails,
    },
};

pub mod tmdb;

pub use tmdb::{Credential, TmdbClient};

/// Trait for metadata providers
///
/// Implementations report failures (missing credential, upstream status,
/// decoding) as errors. Deciding whether a failure degrades to empty data is
/// the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches one page from any list endpoint (`movie/popular`, `discover/tv`, ...)
    async fn list(&self, kind: MediaKind, endpoint: &str, params: Params) -> AppResult<CatalogPage>;

    /// Fetches a single record with detail-only fields (runtime, seasons)
    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogItem>;

    /// Genre list for one media kind
    async fn genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>>;

    /// Mixed movie/series search. Hits carry bare genre ids only.
    async fn search_multi(&self, query: &str, page: u32) -> AppResult<Vec<SearchHit>>;

    /// Resolves a thematic keyword name to its upstream id
    async fn keyword_id(&self, keyword: &str) -> AppResult<Option<u64>>;

    async fn credits(&self, kind: MediaKind, id: u64) -> AppResult<Vec<CastMember>>;

    async fn season(&self, series_id: u64, season_number: u32) -> AppResult<SeasonDetails>;

    async fn countries(&self) -> AppResult<Vec<Country>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches one record per `(kind, id)` pair concurrently, preserving input order.
/// Failed lookups come back as `None` in their slot.
#[instrument(skip(provider, ids), fields(provider = provider.name(), count = ids.len()))]
pub async fn details_batch(
    provider: &dyn MetadataProvider,
    ids: &[(MediaKind, u64)],
) -> Vec<Option<CatalogItem>> {
    let lookups = ids.iter().map(|(kind, id)| async move {
        match provider.details(*kind, *id).await {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, kind = %kind, id, "Detail lookup failed");
                None
            }
        }
    });

    futures::future::join_all(lookups).await
}
