use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{recommendation::MIN_HISTORY_CHARS, CatalogItem, RecommendationResult},
    services::{catalog::Catalog, model::RecommendationModel},
};

/// Recommends a title from free-text viewing history
///
/// The model names a single title, which is then looked up with a multi-search.
/// A title with no catalog match is still a successful answer: the result
/// carries the suggested title and reason with no record attached.
pub struct RecommendationService {
    model: Arc<dyn RecommendationModel>,
    catalog: Arc<Catalog>,
}

impl RecommendationService {
    pub fn new(model: Arc<dyn RecommendationModel>, catalog: Arc<Catalog>) -> Self {
        Self { model, catalog }
    }

    #[instrument(skip(self, viewing_history), fields(model = self.model.name()))]
    pub async fn recommend(&self, viewing_history: &str) -> AppResult<RecommendationResult> {
        let history = viewing_history.trim();
        if history.chars().count() < MIN_HISTORY_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Viewing history must be at least {} characters",
                MIN_HISTORY_CHARS
            )));
        }

        let suggestion = self.model.suggest(history).await.map_err(|e| {
            tracing::error!(error = %e, "Recommendation model failed");
            match e {
                AppError::RecommendationUnavailable(_) => e,
                other => AppError::RecommendationUnavailable(other.to_string()),
            }
        })?;

        let matches = self.catalog.lookup_title(&suggestion.title).await;
        let recommendation = select_match(matches);

        if recommendation.is_none() {
            tracing::info!(title = %suggestion.title, "No catalog match for suggested title");
        }

        Ok(RecommendationResult {
            recommendation,
            reason: suggestion.reason,
            fallback_title: suggestion.title,
        })
    }
}

/// First match with a poster, else the first match
pub fn select_match(matches: Vec<CatalogItem>) -> Option<CatalogItem> {
    let with_poster = matches.iter().position(CatalogItem::has_poster);
    matches.into_iter().nth(with_poster.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{catalog::fixtures::movie, SearchHit, TitleSuggestion},
        services::{
            genres::GenreResolver,
            metadata::{MetadataProvider, MockMetadataProvider},
            model::MockRecommendationModel,
        },
    };

    fn service(
        model: MockRecommendationModel,
        provider: MockMetadataProvider,
    ) -> RecommendationService {
        let mut model = model;
        model.expect_name().return_const("mock");
        let provider: Arc<dyn MetadataProvider> = Arc::new(provider);
        let catalog = Catalog::new(
            provider.clone(),
            Arc::new(GenreResolver::new(provider)),
            "US",
        );
        RecommendationService::new(Arc::new(model), Arc::new(catalog))
    }

    fn suggests(title: &'static str) -> MockRecommendationModel {
        let mut model = MockRecommendationModel::new();
        model.expect_suggest().times(1).returning(move |_| {
            Ok(TitleSuggestion {
                title: title.to_string(),
                reason: "Same director, same world.".to_string(),
            })
        });
        model
    }

    fn hits(items: Vec<CatalogItem>) -> Vec<SearchHit> {
        items
            .into_iter()
            .map(|item| SearchHit {
                item,
                genre_ids: vec![],
            })
            .collect()
    }

    #[test]
    fn test_select_prefers_first_with_poster() {
        let picked = select_match(vec![
            movie(1, "no poster", None),
            movie(2, "poster", Some("/a.jpg")),
            movie(3, "poster too", Some("/b.jpg")),
        ]);
        assert_eq!(picked.map(|m| m.id()), Some(2));
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let picked = select_match(vec![movie(1, "a", None), movie(2, "b", None)]);
        assert_eq!(picked.map(|m| m.id()), Some(1));
        assert_eq!(select_match(vec![]), None);
    }

    #[tokio::test]
    async fn test_recommends_searched_title() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_multi()
            .withf(|query, page| query.starts_with("Blade Runner 2049") && *page == 1)
            .times(1)
            .returning(|_, _| {
                Ok(hits(vec![
                    movie(335984, "Blade Runner 2049", Some("/br2049.jpg")),
                    movie(1, "Blade Runner 2049: Making Of", Some("/x.jpg")),
                ]))
            });

        let result = service(suggests("Blade Runner 2049"), provider)
            .recommend("I loved The Matrix and Blade Runner")
            .await
            .unwrap();

        assert_eq!(result.recommendation.map(|r| r.id()), Some(335984));
        assert_eq!(result.fallback_title, "Blade Runner 2049");
        assert_eq!(result.reason, "Same director, same world.");
    }

    #[tokio::test]
    async fn test_no_match_keeps_fallback_title() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_search_multi().returning(|_, _| Ok(vec![]));

        let result = service(suggests("An Unfindable Film"), provider)
            .recommend("I watch a lot of obscure cinema")
            .await
            .unwrap();

        assert!(result.recommendation.is_none());
        assert_eq!(result.fallback_title, "An Unfindable Film");
    }

    #[tokio::test]
    async fn test_search_failure_is_a_miss_not_an_error() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_multi()
            .returning(|_, _| Err(AppError::Configuration("no credential".into())));

        let result = service(suggests("Arrival"), provider)
            .recommend("Slow, cerebral science fiction")
            .await
            .unwrap();

        assert!(result.recommendation.is_none());
        assert_eq!(result.fallback_title, "Arrival");
    }

    #[tokio::test]
    async fn test_short_history_is_rejected() {
        let mut model = MockRecommendationModel::new();
        model.expect_suggest().never();
        let mut provider = MockMetadataProvider::new();
        provider.expect_search_multi().never();

        let result = service(model, provider).recommend("  Matrix  ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_model_failure_is_unavailable() {
        let mut model = MockRecommendationModel::new();
        model
            .expect_suggest()
            .returning(|_| Err(AppError::Internal("connection reset".into())));
        let mut provider = MockMetadataProvider::new();
        provider.expect_search_multi().never();

        let result = service(model, provider)
            .recommend("I loved The Matrix and Blade Runner")
            .await;
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }
}
