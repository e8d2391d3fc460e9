use serde::Serialize;

use crate::models::{view::details_href, CatalogItem, MediaKind, SeasonDetails};

pub const DEFAULT_SEASON: u32 = 1;
pub const DEFAULT_EPISODE: u32 = 1;

/// Embed URLs for the third-party player
#[derive(Debug, Clone)]
pub struct PlayerUrls {
    base_url: String,
}

impl PlayerUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn movie(&self, id: u64) -> String {
        format!("{}/embed/movie/{}", self.base_url, id)
    }

    pub fn episode(&self, id: u64, season: u32, episode: u32) -> String {
        format!("{}/embed/tv/{}/{}/{}", self.base_url, id, season, episode)
    }
}

/// Everything the watch page needs
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerView {
    pub title: String,
    pub media_type: MediaKind,
    pub embed_url: String,
    pub back_href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    pub seasons: Vec<SeasonDetails>,
}

impl PlayerView {
    /// `season`/`episode` are ignored for movies and default to 1 for series
    pub fn new(
        urls: &PlayerUrls,
        item: &CatalogItem,
        season: Option<u32>,
        episode: Option<u32>,
        seasons: Vec<SeasonDetails>,
    ) -> Self {
        let id = item.id();
        match item.kind() {
            MediaKind::Movie => Self {
                title: item.title().to_string(),
                media_type: MediaKind::Movie,
                embed_url: urls.movie(id),
                back_href: details_href(MediaKind::Movie, id),
                season: None,
                episode: None,
                seasons: Vec::new(),
            },
            MediaKind::Series => {
                let season = season.filter(|s| *s > 0).unwrap_or(DEFAULT_SEASON);
                let episode = episode.filter(|e| *e > 0).unwrap_or(DEFAULT_EPISODE);
                Self {
                    title: format!("{} - S{} E{}", item.title(), season, episode),
                    media_type: MediaKind::Series,
                    embed_url: urls.episode(id, season, episode),
                    back_href: details_href(MediaKind::Series, id),
                    season: Some(season),
                    episode: Some(episode),
                    seasons,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::fixtures::{movie, series};

    fn urls() -> PlayerUrls {
        PlayerUrls::new("https://www.vidking.net/")
    }

    #[test]
    fn test_movie_embed() {
        let view = PlayerView::new(
            &urls(),
            &movie(603, "The Matrix", None),
            Some(2),
            None,
            vec![],
        );

        assert_eq!(view.embed_url, "https://www.vidking.net/embed/movie/603");
        assert_eq!(view.title, "The Matrix");
        assert_eq!(view.back_href, "/movie/603");
        assert_eq!(view.season, None);
    }

    #[test]
    fn test_series_defaults_to_first_episode() {
        let view = PlayerView::new(
            &urls(),
            &series(1396, "Breaking Bad", None),
            None,
            Some(0),
            vec![],
        );

        assert_eq!(view.embed_url, "https://www.vidking.net/embed/tv/1396/1/1");
        assert_eq!(view.title, "Breaking Bad - S1 E1");
        assert_eq!(view.back_href, "/tv-show/1396");
    }

    #[test]
    fn test_series_episode_selection() {
        let view = PlayerView::new(
            &urls(),
            &series(1396, "Breaking Bad", None),
            Some(5),
            Some(14),
            vec![],
        );

        assert_eq!(view.embed_url, "https://www.vidking.net/embed/tv/1396/5/14");
        assert_eq!(view.title, "Breaking Bad - S5 E14");
    }
}
