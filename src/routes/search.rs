use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{middleware::request_id::RequestId, models::CatalogCard, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub query: String,
    pub results: Vec<CatalogCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

/// Handler for multi-search
///
/// Queries shorter than two characters return no results and no message,
/// so typeahead callers can fire on every keystroke.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchView> {
    let query = params.q.trim().to_string();
    let items = state.catalog.search(&query, params.page.unwrap_or(1)).await;

    tracing::info!(
        request_id = %request_id,
        query = %query,
        results = items.len(),
        "Search completed"
    );

    let searched = query.chars().count() >= crate::services::catalog::MIN_QUERY_CHARS;
    let empty_message =
        (searched && items.is_empty()).then(|| format!("No results found for \"{}\".", query));

    Json(SearchView {
        results: CatalogCard::from_items(&items, &state.images),
        query,
        empty_message,
    })
}
