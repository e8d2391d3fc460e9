use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::MAX_PAGES,
};

pub mod browse;
pub mod continue_watching;
pub mod details;
pub mod player;
pub mod recommendations;
pub mod search;
mod state;

pub use state::AppState;

/// `?page=` on listing routes; missing or zero means the first page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        clamp_page(self.page)
    }
}

/// Requested page within `1..=MAX_PAGES`, matching what is fetched upstream
pub fn clamp_page(page: Option<u32>) -> u32 {
    page.unwrap_or(1).clamp(1, MAX_PAGES)
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/home", get(browse::home))
        .route("/trending", get(browse::trending))
        .route("/movies", get(browse::movies))
        .route("/movies/top-rated", get(browse::top_rated_movies))
        .route("/tv", get(browse::tv))
        .route("/genres", get(browse::genres))
        .route("/genre/:slug", get(browse::genre))
        .route("/browse/:category", get(browse::browse_category))
        .route("/anime", get(browse::anime))
        .route("/anime/:category", get(browse::anime_category))
        .route("/countries", get(browse::countries))
        .route("/country/:code/:kind", get(browse::country))
        .route("/service/:service/:kind", get(browse::service))
        .route("/discover/keywords", get(browse::keywords))
        .route("/search", get(search::search))
        .route("/movie/:id", get(details::movie))
        .route("/tv/:id", get(details::tv))
        .route("/tv/:id/season/:season", get(details::season))
        .route("/player/:kind/:id", get(player::player))
        .route("/recommendations", post(recommendations::recommend))
        .route(
            "/continue-watching",
            post(continue_watching::continue_watching),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        assert_eq!(PageQuery::default().page(), 1);
        assert_eq!(PageQuery { page: Some(0) }.page(), 1);
        assert_eq!(PageQuery { page: Some(7) }.page(), 7);
    }

    #[test]
    fn test_page_query_caps_at_last_servable_page() {
        assert_eq!(PageQuery { page: Some(9999) }.page(), MAX_PAGES);
        assert_eq!(clamp_page(Some(500)), 500);
    }
}
