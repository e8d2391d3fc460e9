//! Raw TMDb response shapes and their projection onto catalog records.
//!
//! Every optional upstream field is read as `Option`/`default` so a sparse
//! payload still deserializes; the `From` impls settle the normalized form
//! (blank strings become `None`, missing lists become empty).

use serde::{Deserialize, Serialize};

use super::{
    CastMember, CatalogItem, Country, Episode, Genre, Movie, SearchHit, SeasonDetails,
    SeasonSummary, Series,
};

/// Paginated list envelope used by popular/top_rated/discover/search endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbListResponse<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbSeries {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub seasons: Vec<TmdbSeason>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbSeason {
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// `search/multi` mixes media types; people and anything else fall into `Other`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "media_type")]
pub enum TmdbMultiResult {
    #[serde(rename = "movie")]
    Movie(TmdbMovie),
    #[serde(rename = "tv")]
    Tv(TmdbSeries),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbKeyword {
    pub id: u64,
    #[allow(dead_code)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeasonDetails {
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEpisode {
    pub episode_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCountry {
    pub iso_3166_1: String,
    pub english_name: String,
    #[serde(default)]
    pub native_name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<TmdbMovie> for Movie {
    fn from(raw: TmdbMovie) -> Self {
        Movie {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            poster_path: non_blank(raw.poster_path),
            backdrop_path: non_blank(raw.backdrop_path),
            overview: raw.overview.unwrap_or_default(),
            release_date: non_blank(raw.release_date),
            vote_average: raw.vote_average.unwrap_or_default(),
            genres: raw.genres,
            runtime: raw.runtime.filter(|minutes| *minutes > 0),
        }
    }
}

impl From<TmdbSeason> for SeasonSummary {
    fn from(raw: TmdbSeason) -> Self {
        SeasonSummary {
            season_number: raw.season_number,
            name: raw
                .name
                .unwrap_or_else(|| format!("Season {}", raw.season_number)),
            episode_count: raw.episode_count.unwrap_or_default(),
            air_date: non_blank(raw.air_date),
            poster_path: non_blank(raw.poster_path),
        }
    }
}

impl From<TmdbSeries> for Series {
    fn from(raw: TmdbSeries) -> Self {
        Series {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            poster_path: non_blank(raw.poster_path),
            backdrop_path: non_blank(raw.backdrop_path),
            overview: raw.overview.unwrap_or_default(),
            first_air_date: non_blank(raw.first_air_date),
            vote_average: raw.vote_average.unwrap_or_default(),
            genres: raw.genres,
            number_of_seasons: raw.number_of_seasons,
            number_of_episodes: raw.number_of_episodes,
            seasons: raw.seasons.into_iter().map(SeasonSummary::from).collect(),
        }
    }
}

impl From<TmdbMovie> for CatalogItem {
    fn from(raw: TmdbMovie) -> Self {
        CatalogItem::Movie(raw.into())
    }
}

impl From<TmdbSeries> for CatalogItem {
    fn from(raw: TmdbSeries) -> Self {
        CatalogItem::Series(raw.into())
    }
}

impl TmdbMultiResult {
    /// Converts a movie/tv hit, keeping its bare genre ids for later resolution
    pub fn into_hit(self) -> Option<SearchHit> {
        match self {
            TmdbMultiResult::Movie(mut movie) => {
                let genre_ids = std::mem::take(&mut movie.genre_ids);
                Some(SearchHit {
                    item: movie.into(),
                    genre_ids,
                })
            }
            TmdbMultiResult::Tv(mut series) => {
                let genre_ids = std::mem::take(&mut series.genre_ids);
                Some(SearchHit {
                    item: series.into(),
                    genre_ids,
                })
            }
            TmdbMultiResult::Other => None,
        }
    }
}

impl From<TmdbCastMember> for CastMember {
    fn from(raw: TmdbCastMember) -> Self {
        CastMember {
            id: raw.id,
            name: raw.name,
            character: raw.character.unwrap_or_default(),
            profile_path: non_blank(raw.profile_path),
        }
    }
}

impl From<TmdbEpisode> for Episode {
    fn from(raw: TmdbEpisode) -> Self {
        Episode {
            episode_number: raw.episode_number,
            name: raw
                .name
                .unwrap_or_else(|| format!("Episode {}", raw.episode_number)),
            overview: raw.overview.unwrap_or_default(),
            air_date: non_blank(raw.air_date),
            still_path: non_blank(raw.still_path),
            runtime: raw.runtime,
        }
    }
}

impl From<TmdbSeasonDetails> for SeasonDetails {
    fn from(raw: TmdbSeasonDetails) -> Self {
        SeasonDetails {
            season_number: raw.season_number,
            name: raw
                .name
                .unwrap_or_else(|| format!("Season {}", raw.season_number)),
            episodes: raw.episodes.into_iter().map(Episode::from).collect(),
        }
    }
}

impl From<TmdbCountry> for Country {
    fn from(raw: TmdbCountry) -> Self {
        let native_name = raw.native_name.unwrap_or_else(|| raw.english_name.clone());
        Country {
            iso_3166_1: raw.iso_3166_1,
            english_name: raw.english_name,
            native_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use serde_json::json;

    #[test]
    fn test_movie_list_projection_defaults_missing_fields() {
        let raw: TmdbListResponse<TmdbMovie> = serde_json::from_value(json!({
            "page": 1,
            "total_pages": 42,
            "results": [{
                "id": 603,
                "title": "The Matrix",
                "poster_path": "/matrix.jpg",
                "release_date": "",
                "genre_ids": [28, 878]
            }]
        }))
        .unwrap();

        let movie: Movie = raw.results.into_iter().next().unwrap().into();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.poster_path.as_deref(), Some("/matrix.jpg"));
        assert_eq!(movie.backdrop_path, None);
        assert_eq!(movie.release_date, None);
        assert_eq!(movie.overview, "");
        assert!(movie.genres.is_empty());
        assert_eq!(movie.runtime, None);
    }

    #[test]
    fn test_series_details_projection() {
        let raw: TmdbSeries = serde_json::from_value(json!({
            "id": 1399,
            "name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "vote_average": 8.4,
            "genres": [{"id": 18, "name": "Drama"}],
            "number_of_seasons": 8,
            "number_of_episodes": 73,
            "seasons": [
                {"season_number": 0, "name": "Specials", "episode_count": 14},
                {"season_number": 1, "episode_count": 10, "air_date": "2011-04-17"}
            ]
        }))
        .unwrap();

        let item: CatalogItem = raw.into();
        let CatalogItem::Series(series) = item else {
            panic!("expected a series");
        };
        assert_eq!(series.name, "Game of Thrones");
        assert_eq!(series.genres[0].name, "Drama");
        assert_eq!(series.number_of_seasons, Some(8));
        assert_eq!(series.seasons.len(), 2);
        assert_eq!(series.seasons[1].name, "Season 1");
    }

    #[test]
    fn test_multi_search_keeps_movies_and_series_only() {
        let raw: TmdbListResponse<TmdbMultiResult> = serde_json::from_value(json!({
            "results": [
                {"media_type": "movie", "id": 335984, "title": "Blade Runner 2049", "genre_ids": [878]},
                {"media_type": "person", "id": 30614, "name": "Ryan Gosling"},
                {"media_type": "tv", "id": 1396, "name": "Breaking Bad", "genre_ids": [18, 80]}
            ],
            "total_pages": 1
        }))
        .unwrap();

        let hits: Vec<SearchHit> = raw
            .results
            .into_iter()
            .filter_map(|r| r.into_hit())
            .collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.kind(), MediaKind::Movie);
        assert_eq!(hits[0].genre_ids, vec![878]);
        assert_eq!(hits[1].item.kind(), MediaKind::Series);
        assert_eq!(hits[1].item.title(), "Breaking Bad");
    }

    #[test]
    fn test_zero_runtime_is_treated_as_unknown() {
        let raw: TmdbMovie = serde_json::from_value(json!({"id": 1, "runtime": 0})).unwrap();
        let movie: Movie = raw.into();
        assert_eq!(movie.runtime, None);
    }
}
