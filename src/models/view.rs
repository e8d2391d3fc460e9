//! View models handed to the front-end.

use serde::Serialize;

use super::{CatalogItem, CatalogPage, Genre, MediaKind};

/// Shown when a record has no poster
pub const PLACEHOLDER_POSTER: &str = "https://placehold.co/400x600.png";

/// Image URL construction against the TMDb CDN
#[derive(Debug, Clone)]
pub struct ImageConfig {
    base_url: String,
}

impl ImageConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute paths pass through untouched; relative ones get the size prefix
    fn resolve(&self, size: &str, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}{}", self.base_url, size, path)
        }
    }

    /// Poster at w500, or the placeholder when there is none
    pub fn poster_url(&self, path: Option<&str>) -> String {
        path.map(|p| self.resolve("w500", p))
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string())
    }

    pub fn backdrop_url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.resolve("original", p))
    }

    pub fn profile_url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.resolve("w185", p))
    }
}

/// Card rendered in grids, shelves and the recommendation panel
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogCard {
    pub id: u64,
    pub media_type: MediaKind,
    pub title: String,
    pub poster_url: String,
    pub backdrop_url: Option<String>,
    pub overview: String,
    pub release_date: Option<String>,
    pub rating: f64,
    pub genres: Vec<String>,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
}

impl CatalogCard {
    pub fn from_item(item: &CatalogItem, images: &ImageConfig) -> Self {
        Self {
            id: item.id(),
            media_type: item.kind(),
            title: item.title().to_string(),
            poster_url: images.poster_url(item.poster_path()),
            backdrop_url: images.backdrop_url(item.backdrop_path()),
            overview: item.overview().to_string(),
            release_date: item.release_date().map(str::to_string),
            rating: (item.vote_average() * 10.0).round() / 10.0,
            genres: item
                .genres()
                .iter()
                .map(|g: &Genre| g.name.clone())
                .collect(),
            href: details_href(item.kind(), item.id()),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn from_items(items: &[CatalogItem], images: &ImageConfig) -> Vec<Self> {
        items
            .iter()
            .map(|item| Self::from_item(item, images))
            .collect()
    }
}

/// Details page path for a record
pub fn details_href(kind: MediaKind, id: u64) -> String {
    match kind {
        MediaKind::Movie => format!("/movie/{}", id),
        MediaKind::Series => format!("/tv-show/{}", id),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "page", rename_all = "lowercase")]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

/// Page links for a listing. A page's URL is `base_path?query&page=N`, or
/// `base_path?page=N` when the listing carries no filter query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub links: Vec<PageLink>,
}

impl Pagination {
    /// First, last and the neighbours of the current page, with gaps collapsed
    /// into ellipses. No links at all for a single page.
    pub fn new(current_page: u32, total_pages: u32, base_path: impl Into<String>) -> Self {
        Self {
            current_page,
            total_pages,
            base_path: base_path.into(),
            query: None,
            links: page_links(current_page, total_pages),
        }
    }

    /// Carries filter parameters that every page link must repeat
    pub fn with_query(mut self, pairs: &[(&str, &str)]) -> Self {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    pub fn href(&self, page: u32) -> String {
        match &self.query {
            Some(query) => format!("{}?{}&page={}", self.base_path, query, page),
            None => format!("{}?page={}", self.base_path, page),
        }
    }
}

pub fn page_links(current: u32, total: u32) -> Vec<PageLink> {
    if total <= 1 {
        return Vec::new();
    }

    let mut pages = vec![1, total];
    for page in current.saturating_sub(1)..=current.saturating_add(1) {
        if page > 1 && page < total {
            pages.push(page);
        }
    }
    pages.sort_unstable();
    pages.dedup();

    let mut links = Vec::with_capacity(pages.len() + 2);
    let mut last = 0;
    for page in pages {
        if last != 0 && page > last + 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page(page));
        last = page;
    }
    links
}

/// Grid page with pagination and an empty-state message
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingView {
    pub title: String,
    pub description: String,
    pub items: Vec<CatalogCard>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl ListingView {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        page: &CatalogPage,
        pagination: Pagination,
        empty_message: impl Into<String>,
        images: &ImageConfig,
    ) -> Self {
        let items = CatalogCard::from_items(&page.items, images);
        let empty_message = items.is_empty().then(|| empty_message.into());
        Self {
            title: title.into(),
            description: description.into(),
            items,
            pagination,
            empty_message,
        }
    }
}

/// Horizontal section on a browse page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Shelf {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub items: Vec<CatalogCard>,
}

impl Shelf {
    pub fn new(title: impl Into<String>, href: Option<String>, items: Vec<CatalogCard>) -> Self {
        Self {
            title: title.into(),
            href,
            items,
        }
    }
}
