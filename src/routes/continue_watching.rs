use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    models::{CatalogCard, Shelf, WatchProgress},
    routes::AppState,
};

/// Handler for the "continue watching" shelf
///
/// The browser posts its stored progress list; the shelf holds the titles
/// still in progress, newest first, each card carrying its percentage.
pub async fn continue_watching(
    State(state): State<Arc<AppState>>,
    Json(history): Json<Vec<WatchProgress>>,
) -> Json<Shelf> {
    let cards = state
        .catalog
        .items_for_progress(history)
        .await
        .into_iter()
        .map(|(item, progress)| {
            CatalogCard::from_item(&item, &state.images)
                .with_progress(progress)
        })
        .collect();

    Json(Shelf::new("Continue Watching", None, cards))
}
