//! Process-wide genre id → name lookup.
//!
//! Multi-search hits only carry bare genre ids. The resolver builds one map
//! from the movie and tv genre lists the first time it is needed and keeps it
//! for the lifetime of the process. A failed build is not stored, so the next
//! caller retries.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::OnceCell;

use crate::{
    error::AppResult,
    models::{Genre, MediaKind},
    services::metadata::MetadataProvider,
};

/// Genre names keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreMap(HashMap<u64, String>);

impl GenreMap {
    /// Merges lists in order; the first name seen for an id wins
    pub fn from_lists<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = Vec<Genre>>,
    {
        let mut map = HashMap::new();
        for genre in lists.into_iter().flatten() {
            map.entry(genre.id).or_insert(genre.name);
        }
        Self(map)
    }

    pub fn name(&self, id: u64) -> Option<&str> {
        self.0
            .get(&id)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// Resolved genres for `ids`, unknown and unnamed ids dropped
    pub fn resolve(&self, ids: &[u64]) -> Vec<Genre> {
        ids.iter()
            .filter_map(|&id| {
                self.name(id).map(|name| Genre {
                    id,
                    name: name.to_string(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct GenreResolver {
    provider: Arc<dyn MetadataProvider>,
    map: OnceCell<GenreMap>,
}

impl GenreResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            map: OnceCell::new(),
        }
    }

    /// The memoized map, building it on first use
    pub async fn resolve(&self) -> AppResult<&GenreMap> {
        self.map.get_or_try_init(|| self.build()).await
    }

    async fn build(&self) -> AppResult<GenreMap> {
        let (movie, tv) = tokio::join!(
            self.provider.genres(MediaKind::Movie),
            self.provider.genres(MediaKind::Series)
        );
        let map = GenreMap::from_lists([movie?, tv?]);

        tracing::info!(
            genres = map.len(),
            provider = self.provider.name(),
            "Genre map built"
        );

        Ok(map)
    }

    /// Names for `ids`. An unavailable map yields no genres rather than an error.
    pub async fn attach(&self, ids: &[u64]) -> Vec<Genre> {
        if ids.is_empty() {
            return Vec::new();
        }

        match self.resolve().await {
            Ok(map) => map.resolve(ids),
            Err(e) => {
                tracing::warn!(error = %e, "Genre map unavailable, leaving genres empty");
                Vec::new()
            }
        }
    }

    pub fn is_built(&self) -> bool {
        self.map.initialized()
    }
}
