use std::sync::Arc;

use crate::{
    config::Config,
    models::ImageConfig,
    services::{
        Catalog, GenreResolver, MetadataProvider, PlayerUrls, RecommendationModel,
        RecommendationService,
    },
};

/// Shared application state
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub recommendations: RecommendationService,
    pub images: ImageConfig,
    pub player: PlayerUrls,
}

impl AppState {
    /// Wires the services around a metadata provider and a recommendation model
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        model: Arc<dyn RecommendationModel>,
        config: &Config,
    ) -> Self {
        let genres = Arc::new(GenreResolver::new(provider.clone()));
        let catalog = Arc::new(Catalog::new(provider, genres, config.watch_region.clone()));

        Self {
            recommendations: RecommendationService::new(model, catalog.clone()),
            catalog,
            images: ImageConfig::new(config.tmdb_image_url.clone()),
            player: PlayerUrls::new(config.player_url.clone()),
        }
    }
}
