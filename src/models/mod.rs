use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod catalog;
pub mod query;
pub mod recommendation;
pub mod streaming_service;
pub mod tmdb;
pub mod view;
pub mod watch_progress;

pub use catalog::{
    CastMember, CatalogItem, Country, Episode, Movie, SearchHit, SeasonDetails, SeasonSummary,
    Series,
};
pub use query::Params;
pub use recommendation::{RecommendationRequest, RecommendationResult, TitleSuggestion};
pub use streaming_service::StreamingService;
pub use view::{CatalogCard, ImageConfig, ListingView, PageLink, Pagination, Shelf};
pub use watch_progress::WatchProgress;

/// Upper bound on any page count handed to the UI
pub const MAX_PAGES: u32 = 500;

/// Media kind, serialized with TMDb's path segment names
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaKind {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv")]
    Series,
}

impl MediaKind {
    /// Path segment used by TMDb endpoints (`movie/popular`, `tv/123`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }

    /// Plural used in listing URLs and page copy (`/country/JP/movies`)
    pub fn plural(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Series => "tv",
        }
    }

    /// Parses the plural listing form
    pub fn from_plural(segment: &str) -> Option<Self> {
        match segment {
            "movies" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Series),
            _ => None,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Series),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}

/// Classification tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

impl Genre {
    /// URL slug: lowercase, whitespace runs replaced by `-`
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// One page of normalized results
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total_pages: u32,
}

impl CatalogPage {
    /// Builds a page, capping the upstream page count at [`MAX_PAGES`]
    pub fn new(items: Vec<CatalogItem>, upstream_total_pages: u32) -> Self {
        Self {
            items,
            total_pages: upstream_total_pages.min(MAX_PAGES),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_serde_uses_tmdb_names() {
        assert_eq!(
            serde_json::to_string(&MediaKind::Movie).unwrap(),
            "\"movie\"",
        );
        assert_eq!(serde_json::to_string(&MediaKind::Series).unwrap(), "\"tv\"");

        let kind: MediaKind = serde_json::from_str("\"tv\"").unwrap();
        assert_eq!(kind, MediaKind::Series);
    }

    #[test]
    fn test_media_kind_plural_round_trip() {
        assert_eq!(MediaKind::from_plural("movies"), Some(MediaKind::Movie));
        assert_eq!(MediaKind::from_plural("tv"), Some(MediaKind::Series));
        assert_eq!(MediaKind::from_plural("anime"), None);
        assert_eq!("movie".parse::<MediaKind>(), Ok(MediaKind::Movie));
        assert!("person".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_page_count_is_capped() {
        assert_eq!(CatalogPage::new(vec![], 38_211).total_pages, 500);
        assert_eq!(CatalogPage::new(vec![], 500).total_pages, 500);
        assert_eq!(CatalogPage::new(vec![], 12).total_pages, 12);
        assert_eq!(CatalogPage::new(vec![], 0).total_pages, 0);
    }

    #[test]
    fn test_genre_slug() {
        let genre = Genre {
            id: 878,
            name: "Science  Fiction".to_string(),
        };
        assert_eq!(genre.slug(), "science-fiction");
    }
}
