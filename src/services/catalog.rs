//! Catalog queries and page compositions.
//!
//! Every read here absorbs upstream failures: the error is logged and the
//! caller gets an empty page, an empty list or `None`. Listing pages render an
//! empty state instead of failing.

use std::{str::FromStr, sync::Arc};

use chrono::{Datelike, Utc};
use futures::future::join_all;
use tracing::instrument;

use crate::{
    models::{
        watch_progress, CastMember, CatalogItem, CatalogPage, Country, Genre, MediaKind, Params,
        SeasonDetails, Series, StreamingService, WatchProgress, MAX_PAGES,
    },
    services::{
        genres::GenreResolver,
        metadata::{details_batch, MetadataProvider},
    },
};

/// Items per shelf on the home page
pub const HOME_SHELF_LEN: usize = 12;
/// Items on the trending page
pub const TRENDING_LEN: usize = 20;
/// Records in the home page hero carousel
pub const HERO_LEN: usize = 10;
/// Shortest query sent to multi-search
pub const MIN_QUERY_CHARS: usize = 2;

const ANIMATION_GENRE_ID: u32 = 16;
const ANIME_KEYWORD_ID: u32 = 210024;

/// Curated movie collections reachable from `/browse/:category`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseCategory {
    Bollywood,
    Hollywood,
    Anime,
}

impl BrowseCategory {
    pub const ALL: [BrowseCategory; 3] = [
        BrowseCategory::Bollywood,
        BrowseCategory::Hollywood,
        BrowseCategory::Anime,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            BrowseCategory::Bollywood => "bollywood",
            BrowseCategory::Hollywood => "hollywood",
            BrowseCategory::Anime => "anime",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BrowseCategory::Bollywood => "Bollywood Movies",
            BrowseCategory::Hollywood => "Hollywood Movies",
            BrowseCategory::Anime => "Anime Movies",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BrowseCategory::Bollywood => "Popular Hindi-language films from India.",
            BrowseCategory::Hollywood => "Popular films produced in the United States.",
            BrowseCategory::Anime => "Animated feature films from Japan.",
        }
    }

    /// Discover filters for the collection
    pub fn params(&self) -> Params {
        match self {
            BrowseCategory::Bollywood => Params::new()
                .with("with_original_language", "hi")
                .with("region", "IN"),
            BrowseCategory::Hollywood => Params::new().with("with_origin_country", "US"),
            BrowseCategory::Anime => Params::new()
                .with("with_genres", ANIMATION_GENRE_ID)
                .with("with_keywords", ANIME_KEYWORD_ID)
                .with("with_origin_country", "JP"),
        }
    }
}

impl FromStr for BrowseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Japanese animated series listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimeCategory {
    Trending,
    Upcoming,
    TopRated,
}

impl AnimeCategory {
    pub const ALL: [AnimeCategory; 3] = [
        AnimeCategory::Trending,
        AnimeCategory::Upcoming,
        AnimeCategory::TopRated,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AnimeCategory::Trending => "trending",
            AnimeCategory::Upcoming => "upcoming",
            AnimeCategory::TopRated => "top-rated",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnimeCategory::Trending => "Trending Anime",
            AnimeCategory::Upcoming => "Upcoming Anime",
            AnimeCategory::TopRated => "Top Rated Anime",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnimeCategory::Trending => "Catch the latest buzz in the anime world.",
            AnimeCategory::Upcoming => "Get a sneak peek at future hits.",
            AnimeCategory::TopRated => "Discover the all-time fan favorites.",
        }
    }

    pub fn href(&self) -> String {
        format!("/anime/{}", self.slug())
    }

    /// Discover filters; `today` bounds the upcoming listing
    pub fn params(&self, today: &str) -> Params {
        let base = Params::new()
            .with("with_genres", ANIMATION_GENRE_ID)
            .with("with_original_language", "ja");

        match self {
            AnimeCategory::Trending => base.with("sort_by", "popularity.desc"),
            AnimeCategory::Upcoming => base
                .with("first_air_date.gte", today)
                .with("sort_by", "first_air_date.asc"),
            AnimeCategory::TopRated => base
                .with("sort_by", "vote_average.desc")
                .with("vote_count.gte", 200),
        }
    }
}

impl FromStr for AnimeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == s)
            .ok_or_else(|| format!("unknown anime category '{}'", s))
    }
}

/// Titled group of records on a browse page
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub href: Option<String>,
    pub items: Vec<CatalogItem>,
}

impl Section {
    fn new(title: impl Into<String>, href: Option<String>, items: Vec<CatalogItem>) -> Self {
        Self {
            title: title.into(),
            href,
            items,
        }
    }
}

/// Everything the home page shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeFeed {
    pub hero: Vec<CatalogItem>,
    pub popular_movies: Vec<CatalogItem>,
    pub upcoming_movies: Vec<CatalogItem>,
    pub top_rated_movies: Vec<CatalogItem>,
    pub tv_this_year: Vec<CatalogItem>,
}

pub struct Catalog {
    provider: Arc<dyn MetadataProvider>,
    genres: Arc<GenreResolver>,
    watch_region: String,
}

impl Catalog {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        genres: Arc<GenreResolver>,
        watch_region: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            genres,
            watch_region: watch_region.into(),
        }
    }

    async fn fetch_list(&self, kind: MediaKind, endpoint: &str, params: Params) -> CatalogPage {
        match self.provider.list(kind, endpoint, params).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Listing degraded to empty");
                CatalogPage::empty()
            }
        }
    }

    fn page_param(page: u32) -> Params {
        Params::new().with("page", page.clamp(1, MAX_PAGES))
    }

    pub async fn popular(&self, kind: MediaKind, page: u32) -> CatalogPage {
        let endpoint = format!("{}/popular", kind.path_segment());
        self.fetch_list(kind, &endpoint, Self::page_param(page))
            .await
    }

    pub async fn top_rated(&self, kind: MediaKind, page: u32) -> CatalogPage {
        let endpoint = format!("{}/top_rated", kind.path_segment());
        self.fetch_list(kind, &endpoint, Self::page_param(page))
            .await
    }

    pub async fn upcoming_movies(&self, page: u32) -> CatalogPage {
        self.fetch_list(MediaKind::Movie, "movie/upcoming", Self::page_param(page))
            .await
    }

    /// Discover query sorted by popularity unless `params` says otherwise
    pub async fn discover(&self, kind: MediaKind, params: Params, page: u32) -> CatalogPage {
        let mut params = params.merge(&Self::page_param(page));
        params.set_default("sort_by", "popularity.desc");

        let endpoint = format!("discover/{}", kind.path_segment());
        self.fetch_list(kind, &endpoint, params).await
    }

    pub async fn by_genre(&self, genre_id: u64, page: u32) -> CatalogPage {
        self.discover(
            MediaKind::Movie,
            Params::new().with("with_genres", genre_id),
            page,
        )
        .await
    }

    /// Movies by watch provider in the configured region, series by network
    pub async fn by_service(
        &self,
        service: StreamingService,
        kind: MediaKind,
        page: u32,
    ) -> CatalogPage {
        let params = match kind {
            MediaKind::Movie => Params::new()
                .with("with_watch_providers", service.movie_provider_id())
                .with("watch_region", &self.watch_region),
            MediaKind::Series => Params::new().with("with_networks", service.tv_network_id()),
        };
        self.discover(kind, params, page).await
    }

    pub async fn by_country(&self, code: &str, kind: MediaKind, page: u32) -> CatalogPage {
        let params = Params::new().with("with_origin_country", code.trim().to_uppercase());
        self.discover(kind, params, page).await
    }

    /// Comma separated keyword names, each resolved to its id. Names without
    /// an id are skipped; with no ids at all the result is empty.
    #[instrument(skip(self))]
    pub async fn by_keywords(&self, names: &str, kind: MediaKind, page: u32) -> CatalogPage {
        let ids = self.keyword_ids(names).await;
        if ids.is_empty() {
            tracing::info!("No keyword ids resolved");
            return CatalogPage::empty();
        }

        let joined = ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
        self.discover(kind, Params::new().with("with_keywords", joined), page)
            .await
    }

    async fn keyword_ids(&self, names: &str) -> Vec<u64> {
        let names: Vec<&str> = names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        let lookups = names.iter().map(|name| async move {
            match self.provider.keyword_id(name).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(keyword = %name, error = %e, "Keyword lookup failed");
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    pub async fn by_category(&self, category: BrowseCategory, page: u32) -> CatalogPage {
        self.discover(MediaKind::Movie, category.params(), page)
            .await
    }

    pub async fn anime(&self, category: AnimeCategory, page: u32) -> CatalogPage {
        self.discover(MediaKind::Series, category.params(&today()), page)
            .await
    }

    /// Multi-search with genre names attached; records with no artwork are dropped
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, page: u32) -> Vec<CatalogItem> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let mut items = self.multi_search(query, page).await;
        items.retain(CatalogItem::has_artwork);
        items
    }

    /// Every multi-search match for a title, artwork or not
    pub async fn lookup_title(&self, title: &str) -> Vec<CatalogItem> {
        self.multi_search(title.trim(), 1).await
    }

    async fn multi_search(&self, query: &str, page: u32) -> Vec<CatalogItem> {
        let hits = match self.provider.search_multi(query, page.max(1)).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Search degraded to empty");
                return Vec::new();
            }
        };

        let mut items = Vec::with_capacity(hits.len());
        for hit in hits {
            let mut item = hit.item;
            item.set_genres(self.genres.attach(&hit.genre_ids).await);
            items.push(item);
        }
        items
    }

    pub async fn details(&self, kind: MediaKind, id: u64) -> Option<CatalogItem> {
        match self.provider.details(kind, id).await {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(kind = %kind, id, error = %e, "Details lookup failed");
                None
            }
        }
    }

    pub async fn credits(&self, kind: MediaKind, id: u64) -> Vec<CastMember> {
        self.provider.credits(kind, id).await.unwrap_or_else(|e| {
            tracing::warn!(kind = %kind, id, error = %e, "Credits lookup failed");
            Vec::new()
        })
    }

    pub async fn similar(&self, kind: MediaKind, id: u64, page: u32) -> CatalogPage {
        let endpoint = format!("{}/{}/similar", kind.path_segment(), id);
        self.fetch_list(kind, &endpoint, Self::page_param(page))
            .await
    }

    pub async fn season(&self, series_id: u64, season_number: u32) -> Option<SeasonDetails> {
        match self.provider.season(series_id, season_number).await {
            Ok(season) => Some(season),
            Err(e) => {
                tracing::warn!(series_id, season_number, error = %e, "Season lookup failed");
                None
            }
        }
    }

    /// Episode lists for every regular season (specials excluded), in season order
    pub async fn seasons_for(&self, series: &Series) -> Vec<SeasonDetails> {
        let mut numbers: Vec<u32> = series
            .seasons
            .iter()
            .map(|season| season.season_number)
            .filter(|&number| number > 0)
            .collect();

        if numbers.is_empty() {
            numbers = (1..=series.number_of_seasons.unwrap_or(0)).collect();
        }

        let lookups = numbers
            .into_iter()
            .map(|number| self.season(series.id, number));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    pub async fn movie_genres(&self) -> Vec<Genre> {
        self.provider
            .genres(MediaKind::Movie)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Genre list unavailable");
                Vec::new()
            })
    }

    pub async fn genre_by_slug(&self, slug: &str) -> Option<Genre> {
        self.movie_genres()
            .await
            .into_iter()
            .find(|genre| genre.slug() == slug)
    }

    /// Countries sorted by English name, optionally narrowed by a search term
    pub async fn countries(&self, filter: Option<&str>) -> Vec<Country> {
        let mut countries = self.provider.countries().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Country list unavailable");
            Vec::new()
        });

        if let Some(term) = filter.map(str::trim).filter(|term| !term.is_empty()) {
            countries.retain(|country| country.matches(term));
        }
        countries.sort_by_cached_key(|country| country.english_name.clone());
        countries
    }

    /// Resolves the in-progress part of a watch history, newest first.
    /// Entries whose record cannot be fetched are dropped.
    pub async fn items_for_progress(
        &self,
        history: Vec<WatchProgress>,
    ) -> Vec<(CatalogItem, f32)> {
        let entries = watch_progress::in_progress(history);
        let ids: Vec<(MediaKind, u64)> = entries.iter().map(|e| (e.media_type, e.id)).collect();

        details_batch(self.provider.as_ref(), &ids)
            .await
            .into_iter()
            .zip(entries)
            .filter_map(|(item, entry)| item.map(|item| (item, entry.progress)))
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn home(&self) -> HomeFeed {
        let year = Utc::now().year();
        let (popular, upcoming, top_rated, tv) = tokio::join!(
            self.popular(MediaKind::Movie, 1),
            self.upcoming_movies(1),
            self.top_rated(MediaKind::Movie, 1),
            self.discover(
                MediaKind::Series,
                Params::new().with("first_air_date_year", year),
                1
            ),
        );

        let hero = interleave(&popular.items, &tv.items)
            .into_iter()
            .filter(|item| item.backdrop_path().is_some())
            .take(HERO_LEN)
            .collect();

        HomeFeed {
            hero,
            popular_movies: take(popular, HOME_SHELF_LEN),
            upcoming_movies: take(upcoming, HOME_SHELF_LEN),
            top_rated_movies: take(top_rated, HOME_SHELF_LEN),
            tv_this_year: take(tv, HOME_SHELF_LEN),
        }
    }

    pub async fn trending(&self) -> Vec<CatalogItem> {
        take(self.popular(MediaKind::Movie, 1).await, TRENDING_LEN)
    }

    /// Popular and top rated movies followed by one shelf per streaming service
    pub async fn movie_shelves(&self) -> Vec<Section> {
        self.shelves(MediaKind::Movie).await
    }

    pub async fn tv_shelves(&self) -> Vec<Section> {
        self.shelves(MediaKind::Series).await
    }

    async fn shelves(&self, kind: MediaKind) -> Vec<Section> {
        let noun = match kind {
            MediaKind::Movie => "Movies",
            MediaKind::Series => "TV Shows",
        };

        let ((popular, top_rated), services) = tokio::join!(
            async { tokio::join!(self.popular(kind, 1), self.top_rated(kind, 1)) },
            join_all(StreamingService::ALL.into_iter().map(|service| async move {
                (service, self.by_service(service, kind, 1).await)
            })),
        );

        let mut sections = vec![
            Section::new(format!("Popular {}", noun), None, popular.items),
            Section::new(format!("Top Rated {}", noun), None, top_rated.items),
        ];
        sections.extend(services.into_iter().map(|(service, page)| {
            Section::new(
                format!("{} {}", service.display_name(), noun),
                Some(service.href(kind)),
                page.items,
            )
        }));
        sections
    }

    pub async fn anime_overview(&self) -> Vec<Section> {
        let pages = join_all(
            AnimeCategory::ALL
                .into_iter()
                .map(|category| async move { (category, self.anime(category, 1).await) }),
        )
        .await;

        pages
            .into_iter()
            .map(|(category, page)| {
                Section::new(category.title(), Some(category.href()), page.items)
            })
            .collect()
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn take(page: CatalogPage, n: usize) -> Vec<CatalogItem> {
    page.items.into_iter().take(n).collect()
}

/// Alternates records from `a` and `b`, then appends whatever is left
fn interleave(a: &[CatalogItem], b: &[CatalogItem]) -> Vec<CatalogItem> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    for i in 0..a.len().max(b.len()) {
        out.extend(a.get(i).cloned());
        out.extend(b.get(i).cloned());
    }
    out
}
