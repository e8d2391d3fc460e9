use serde::{Deserialize, Serialize};

use super::CatalogItem;

/// Minimum length of the free-text viewing history, after trimming
pub const MIN_HISTORY_CHARS: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub viewing_history: String,
}

/// Structured output expected from the generative step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleSuggestion {
    #[serde(alias = "movieRecommendation", alias = "movie_recommendation")]
    pub title: String,
    pub reason: String,
}

impl TitleSuggestion {
    /// A suggestion is usable only when it names something
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Outcome of a recommendation. `recommendation` is `None` when the suggested
/// title had no catalog match; `fallback_title` still carries what was suggested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub recommendation: Option<CatalogItem>,
    pub reason: String,
    pub fallback_title: String,
}
