use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CatalogCard, CatalogItem, MediaKind, SeasonDetails},
    routes::AppState,
};

/// Cast shown on a details page
const CAST_LEN: usize = 12;

#[derive(Debug, Serialize)]
pub struct CastCard {
    pub id: u64,
    pub name: String,
    pub character: String,
    pub profile_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetailsView {
    pub card: CatalogCard,
    pub item: CatalogItem,
    pub cast: Vec<CastCard>,
    pub similar: Vec<CatalogCard>,
    pub watch_href: String,
}

async fn details_view(state: &AppState, kind: MediaKind, id: u64) -> AppResult<DetailsView> {
    let (item, cast, similar) = tokio::join!(
        state.catalog.details(kind, id),
        state.catalog.credits(kind, id),
        state.catalog.similar(kind, id, 1),
    );

    let item = item.ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind, id)))?;

    let cast = cast
        .into_iter()
        .take(CAST_LEN)
        .map(|member| CastCard {
            profile_url: state.images.profile_url(member.profile_path.as_deref()),
            id: member.id,
            name: member.name,
            character: member.character,
        })
        .collect();

    Ok(DetailsView {
        card: CatalogCard::from_item(&item, &state.images),
        cast,
        similar: CatalogCard::from_items(&similar.items, &state.images),
        watch_href: format!("/player/{}/{}", kind, id),
        item,
    })
}

/// Handler for movie details
pub async fn movie(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> AppResult<Json<DetailsView>> {
    tracing::info!(request_id = %request_id, id, "Fetching movie details");
    Ok(Json(details_view(&state, MediaKind::Movie, id).await?))
}

/// Handler for series details
pub async fn tv(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> AppResult<Json<DetailsView>> {
    tracing::info!(request_id = %request_id, id, "Fetching series details");
    Ok(Json(details_view(&state, MediaKind::Series, id).await?))
}

pub async fn season(
    State(state): State<Arc<AppState>>,
    Path((id, season_number)): Path<(u64, u32)>,
) -> AppResult<Json<SeasonDetails>> {
    state
        .catalog
        .season(id, season_number)
        .await
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("Season {} of tv {} not found", season_number, id))
        })
}
