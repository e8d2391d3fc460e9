use axum::{extract::State, Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CatalogCard, RecommendationRequest},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    pub recommendation: Option<CatalogCard>,
    pub reason: String,
    pub fallback_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationView>> {
    tracing::info!(
        request_id = %request_id,
        history_len = request.viewing_history.len(),
        "Processing recommendation request"
    );

    let result = state
        .recommendations
        .recommend(&request.viewing_history)
        .await?;

    tracing::info!(
        request_id = %request_id,
        title = %result.fallback_title,
        matched = result.recommendation.is_some(),
        "Recommendation completed"
    );

    let message = result
        .recommendation
        .is_none()
        .then(|| format!("No poster found for: {}", result.fallback_title));

    Ok(Json(RecommendationView {
        recommendation: result
            .recommendation
            .as_ref()
            .map(|item| CatalogCard::from_item(item, &state.images)),
        reason: result.reason,
        fallback_title: result.fallback_title,
        message,
    }))
}
