use serde::{Deserialize, Serialize};

use super::{Genre, MediaKind};

/// A movie record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: String,
    /// ISO date (`YYYY-MM-DD`), `None` when upstream leaves it blank
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub genres: Vec<Genre>,
    /// Minutes; only present on detail lookups
    pub runtime: Option<u32>,
}

/// A TV series record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub id: u64,
    pub name: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: String,
    pub first_air_date: Option<String>,
    pub vote_average: f64,
    pub genres: Vec<Genre>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub seasons: Vec<SeasonSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: String,
    pub episode_count: u32,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
}

/// Normalized catalog record. The variant is fixed when the record is built
/// from an upstream shape and is serialized as `media_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "media_type")]
pub enum CatalogItem {
    #[serde(rename = "movie")]
    Movie(Movie),
    #[serde(rename = "tv")]
    Series(Series),
}

impl CatalogItem {
    pub fn id(&self) -> u64 {
        match self {
            CatalogItem::Movie(m) => m.id,
            CatalogItem::Series(s) => s.id,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            CatalogItem::Movie(_) => MediaKind::Movie,
            CatalogItem::Series(_) => MediaKind::Series,
        }
    }

    /// Movie title or series name
    pub fn title(&self) -> &str {
        match self {
            CatalogItem::Movie(m) => &m.title,
            CatalogItem::Series(s) => &s.name,
        }
    }

    pub fn poster_path(&self) -> Option<&str> {
        match self {
            CatalogItem::Movie(m) => m.poster_path.as_deref(),
            CatalogItem::Series(s) => s.poster_path.as_deref(),
        }
    }

    pub fn backdrop_path(&self) -> Option<&str> {
        match self {
            CatalogItem::Movie(m) => m.backdrop_path.as_deref(),
            CatalogItem::Series(s) => s.backdrop_path.as_deref(),
        }
    }

    pub fn has_poster(&self) -> bool {
        self.poster_path().is_some()
    }

    /// True when the record has at least one usable image
    pub fn has_artwork(&self) -> bool {
        self.poster_path().is_some() || self.backdrop_path().is_some()
    }

    pub fn overview(&self) -> &str {
        match self {
            CatalogItem::Movie(m) => &m.overview,
            CatalogItem::Series(s) => &s.overview,
        }
    }

    /// Release date for movies, first air date for series
    pub fn release_date(&self) -> Option<&str> {
        match self {
            CatalogItem::Movie(m) => m.release_date.as_deref(),
            CatalogItem::Series(s) => s.first_air_date.as_deref(),
        }
    }

    pub fn vote_average(&self) -> f64 {
        match self {
            CatalogItem::Movie(m) => m.vote_average,
            CatalogItem::Series(s) => s.vote_average,
        }
    }

    pub fn genres(&self) -> &[Genre] {
        match self {
            CatalogItem::Movie(m) => &m.genres,
            CatalogItem::Series(s) => &s.genres,
        }
    }

    pub fn set_genres(&mut self, genres: Vec<Genre>) {
        match self {
            CatalogItem::Movie(m) => m.genres = genres,
            CatalogItem::Series(s) => s.genres = genres,
        }
    }
}

/// Multi-search hit: the record plus the bare genre ids upstream returned for it
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item: CatalogItem,
    pub genre_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub episode_number: u32,
    pub name: String,
    pub overview: String,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonDetails {
    pub season_number: u32,
    pub name: String,
    pub episodes: Vec<Episode>,
}

/// Production country as listed by TMDb's configuration endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub iso_3166_1: String,
    pub english_name: String,
    pub native_name: String,
}

impl Country {
    /// Case-insensitive match on either the English or the native name
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.english_name.to_lowercase().contains(&term)
            || self.native_name.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn movie(id: u64, title: &str, poster: Option<&str>) -> CatalogItem {
        CatalogItem::Movie(Movie {
            id,
            title: title.to_string(),
            poster_path: poster.map(str::to_string),
            backdrop_path: None,
            overview: format!("{} overview", title),
            release_date: Some("2017-10-06".to_string()),
            vote_average: 7.5,
            genres: vec![],
            runtime: None,
        })
    }

    pub fn series(id: u64, name: &str, poster: Option<&str>) -> CatalogItem {
        CatalogItem::Series(Series {
            id,
            name: name.to_string(),
            poster_path: poster.map(str::to_string),
            backdrop_path: None,
            overview: String::new(),
            first_air_date: Some("2019-11-12".to_string()),
            vote_average: 8.1,
            genres: vec![],
            number_of_seasons: None,
            number_of_episodes: None,
            seasons: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_catalog_item_serializes_discriminant() {
        let item = movie(335984, "Blade Runner 2049", Some("/poster.jpg"));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["media_type"], "movie");
        assert_eq!(json["title"], "Blade Runner 2049");

        let back: CatalogItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_series_accessors_use_name_and_air_date() {
        let item = series(82856, "The Mandalorian", None);

        assert_eq!(item.kind(), MediaKind::Series);
        assert_eq!(item.title(), "The Mandalorian");
        assert_eq!(item.release_date(), Some("2019-11-12"));
        assert!(!item.has_poster());
        assert!(!item.has_artwork());
    }

    #[test]
    fn test_country_matches_either_name() {
        let country = Country {
            iso_3166_1: "JP".to_string(),
            english_name: "Japan".to_string(),
            native_name: "日本".to_string(),
        };

        assert!(country.matches("jap"));
        assert!(country.matches("日本"));
        assert!(!country.matches("korea"));
    }
}
