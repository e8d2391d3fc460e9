use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        CatalogCard, CatalogItem, CatalogPage, ListingView, MediaKind, Pagination, Shelf,
        StreamingService,
    },
    routes::{clamp_page, AppState, PageQuery},
    services::{AnimeCategory, BrowseCategory, Section},
};

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub hero: Vec<CatalogCard>,
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Serialize)]
pub struct ShelvesView {
    pub title: String,
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Serialize)]
pub struct GenreLink {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct CountryLink {
    pub code: String,
    pub english_name: String,
    pub native_name: String,
    pub movies_href: String,
    pub tv_href: String,
}

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keywords: String,
    pub kind: Option<MediaKind>,
    pub page: Option<u32>,
}

fn cards(state: &AppState, items: &[CatalogItem]) -> Vec<CatalogCard> {
    CatalogCard::from_items(items, &state.images)
}

fn shelves(state: &AppState, sections: Vec<Section>) -> Vec<Shelf> {
    sections
        .into_iter()
        .map(|section| Shelf::new(section.title, section.href, cards(state, &section.items)))
        .collect()
}

fn listing(
    state: &AppState,
    title: impl Into<String>,
    description: impl Into<String>,
    page: u32,
    base_path: impl Into<String>,
    results: &CatalogPage,
    empty_message: impl Into<String>,
) -> ListingView {
    ListingView::new(
        title,
        description,
        results,
        Pagination::new(page, results.total_pages, base_path),
        empty_message,
        &state.images,
    )
}

fn parse_kind(segment: &str) -> AppResult<MediaKind> {
    MediaKind::from_plural(segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown listing type '{}'", segment)))
}

/// Handler for the home page
pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> Json<HomeView> {
    let feed = state.catalog.home().await;

    tracing::info!(
        request_id = %request_id,
        hero = feed.hero.len(),
        "Home page assembled"
    );

    Json(HomeView {
        hero: cards(&state, &feed.hero),
        shelves: vec![
            Shelf::new(
                "Popular Movies",
                Some("/movies".to_string()),
                cards(&state, &feed.popular_movies),
            ),
            Shelf::new(
                "Upcoming Movies",
                None,
                cards(&state, &feed.upcoming_movies),
            ),
            Shelf::new(
                "Top Rated Movies",
                Some("/movies/top-rated".to_string()),
                cards(&state, &feed.top_rated_movies),
            ),
            Shelf::new(
                "TV Shows This Year",
                Some("/tv".to_string()),
                cards(&state, &feed.tv_this_year),
            ),
        ],
    })
}

pub async fn trending(State(state): State<Arc<AppState>>) -> Json<Shelf> {
    let items = state.catalog.trending().await;
    Json(Shelf::new("Trending Now", None, cards(&state, &items)))
}

pub async fn movies(State(state): State<Arc<AppState>>) -> Json<ShelvesView> {
    let sections = state.catalog.movie_shelves().await;
    Json(ShelvesView {
        title: "Movies".to_string(),
        shelves: shelves(&state, sections),
    })
}

pub async fn top_rated_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Json<ListingView> {
    let page = query.page();
    let results = state.catalog.top_rated(MediaKind::Movie, page).await;

    Json(listing(
        &state,
        "Top Rated Movies",
        "The highest rated movies of all time.",
        page,
        "/movies/top-rated",
        &results,
        "No movies found. Check back soon!",
    ))
}

pub async fn tv(State(state): State<Arc<AppState>>) -> Json<ShelvesView> {
    let sections = state.catalog.tv_shelves().await;
    Json(ShelvesView {
        title: "TV Shows".to_string(),
        shelves: shelves(&state, sections),
    })
}

pub async fn genres(State(state): State<Arc<AppState>>) -> Json<Vec<GenreLink>> {
    let links = state
        .catalog
        .movie_genres()
        .await
        .into_iter()
        .map(|genre| {
            let slug = genre.slug();
            GenreLink {
                id: genre.id,
                href: format!("/genre/{}", slug),
                name: genre.name,
                slug,
            }
        })
        .collect();
    Json(links)
}

/// Handler for a single genre's movie listing
pub async fn genre(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListingView>> {
    let genre = state
        .catalog
        .genre_by_slug(&slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Unknown genre '{}'", slug)))?;

    let page = query.page();
    let results = state.catalog.by_genre(genre.id, page).await;

    tracing::info!(
        request_id = %request_id,
        genre = %genre.name,
        page,
        results = results.items.len(),
        "Genre listing"
    );

    Ok(Json(listing(
        &state,
        format!("{} Movies", genre.name),
        format!("Popular {} movies.", genre.name.to_lowercase()),
        page,
        format!("/genre/{}", slug),
        &results,
        "No movies found for this genre.",
    )))
}

pub async fn browse_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListingView>> {
    let category: BrowseCategory = category.parse().map_err(AppError::NotFound)?;
    let page = query.page();
    let results = state.catalog.by_category(category, page).await;

    Ok(Json(listing(
        &state,
        category.title(),
        category.description(),
        page,
        format!("/browse/{}", category.slug()),
        &results,
        "No movies found in this category.",
    )))
}

pub async fn anime(State(state): State<Arc<AppState>>) -> Json<ShelvesView> {
    let sections = state.catalog.anime_overview().await;
    Json(ShelvesView {
        title: "Anime".to_string(),
        shelves: shelves(&state, sections),
    })
}

pub async fn anime_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListingView>> {
    let category: AnimeCategory = category.parse().map_err(AppError::NotFound)?;
    let page = query.page();
    let results = state.catalog.anime(category, page).await;

    Ok(Json(listing(
        &state,
        category.title(),
        category.description(),
        page,
        category.href(),
        &results,
        "No anime found. Check back soon!",
    )))
}

pub async fn countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Json<Vec<CountryLink>> {
    let links = state
        .catalog
        .countries(query.q.as_deref())
        .await
        .into_iter()
        .map(|country| CountryLink {
            movies_href: format!("/country/{}/movies", country.iso_3166_1),
            tv_href: format!("/country/{}/tv", country.iso_3166_1),
            code: country.iso_3166_1,
            english_name: country.english_name,
            native_name: country.native_name,
        })
        .collect();
    Json(links)
}

/// Handler for movies or series produced in one country
///
/// A code missing from a non-empty country list is a 404. When the list
/// itself is unavailable the code is trusted and used as the display name.
pub async fn country(
    State(state): State<Arc<AppState>>,
    Path((code, kind)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListingView>> {
    let kind = parse_kind(&kind)?;
    let code = code.trim().to_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::NotFound(format!("Unknown country '{}'", code)));
    }

    let known = state.catalog.countries(None).await;
    let name = match known.iter().find(|c| c.iso_3166_1 == code) {
        Some(country) => country.english_name.clone(),
        None if known.is_empty() => code.clone(),
        None => return Err(AppError::NotFound(format!("Unknown country '{}'", code))),
    };

    let page = query.page();
    let results = state.catalog.by_country(&code, kind, page).await;
    let noun = match kind {
        MediaKind::Movie => "Movies",
        MediaKind::Series => "TV Shows",
    };

    Ok(Json(listing(
        &state,
        format!("{} from {}", noun, name),
        format!("Popular {} produced in {}.", noun.to_lowercase(), name),
        page,
        format!("/country/{}/{}", code, kind.plural()),
        &results,
        format!("No {} found for {}.", noun.to_lowercase(), name),
    )))
}

pub async fn service(
    State(state): State<Arc<AppState>>,
    Path((service, kind)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListingView>> {
    let service: StreamingService = service.parse().map_err(AppError::NotFound)?;
    let kind = parse_kind(&kind)?;
    let page = query.page();
    let results = state.catalog.by_service(service, kind, page).await;
    let noun = match kind {
        MediaKind::Movie => "Movies",
        MediaKind::Series => "TV Shows",
    };

    Ok(Json(listing(
        &state,
        format!("{} {}", service.display_name(), noun),
        format!("{} streaming on {}.", noun, service.display_name()),
        page,
        service.href(kind),
        &results,
        format!(
            "No {} found for {}. Check back soon!",
            noun.to_lowercase(),
            service.display_name()
        ),
    )))
}

pub async fn keywords(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<KeywordQuery>,
) -> Json<ListingView> {
    let kind = query.kind.unwrap_or(MediaKind::Movie);
    let page = clamp_page(query.page);
    let keywords = query.keywords.trim();
    let results = state.catalog.by_keywords(keywords, kind, page).await;

    tracing::info!(
        request_id = %request_id,
        keywords = %keywords,
        results = results.items.len(),
        "Keyword discovery"
    );

    let pagination = Pagination::new(page, results.total_pages, "/discover/keywords")
        .with_query(&[("keywords", keywords), ("kind", kind.path_segment())]);

    Json(ListingView::new(
        format!("Results for \"{}\"", keywords),
        "",
        &results,
        pagination,
        "No titles match these keywords.",
        &state.images,
    ))
}
