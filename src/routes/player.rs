use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CatalogItem, MediaKind},
    routes::AppState,
    services::PlayerView,
};

#[derive(Debug, Deserialize)]
pub struct EpisodeQuery {
    season: Option<u32>,
    episode: Option<u32>,
}

/// Handler for the watch page
pub async fn player(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((kind, id)): Path<(String, u64)>,
    Query(query): Query<EpisodeQuery>,
) -> AppResult<Json<PlayerView>> {
    let kind: MediaKind = kind.parse().map_err(AppError::NotFound)?;
    let item = state
        .catalog
        .details(kind, id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind, id)))?;

    let seasons = match &item {
        CatalogItem::Series(series) => state.catalog.seasons_for(series).await,
        CatalogItem::Movie(_) => Vec::new(),
    };

    let view = PlayerView::new(&state.player, &item, query.season, query.episode, seasons);

    tracing::info!(
        request_id = %request_id,
        kind = %kind,
        id,
        embed_url = %view.embed_url,
        "Player view"
    );

    Ok(Json(view))
}
