//! Generative step of the recommendation flow.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::TitleSuggestion,
};

/// Turns a free-text viewing history into one suggested title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationModel: Send + Sync {
    async fn suggest(&self, viewing_history: &str) -> AppResult<TitleSuggestion>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    seed: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'static str,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Model served by an Ollama-compatible `/api/generate` endpoint
pub struct OllamaModel {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaModel {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            &config.llm_url,
            &config.llm_model,
            Duration::from_secs(config.llm_timeout_secs),
        )
    }
}

pub fn build_prompt(viewing_history: &str) -> String {
    format!(
        "You are a movie expert. Based on the viewing history below, recommend one movie \
         the viewer has not mentioned and explain why.\n\n\
         Viewing history: {}\n\n\
         Answer with a JSON object of the form \
         {{\"title\": \"<movie title>\", \"reason\": \"<one or two sentences>\"}}.",
        viewing_history.trim()
    )
}

/// Reads the model's JSON answer, rejecting anything without a title
pub fn parse_suggestion(raw: &str) -> AppResult<TitleSuggestion> {
    let suggestion: TitleSuggestion = serde_json::from_str(raw.trim()).map_err(|e| {
        AppError::RecommendationUnavailable(format!("model returned malformed output: {}", e))
    })?;

    if !suggestion.is_valid() {
        return Err(AppError::RecommendationUnavailable(
            "model returned an empty title".to_string(),
        ));
    }

    Ok(TitleSuggestion {
        title: suggestion.title.trim().to_string(),
        reason: suggestion.reason.trim().to_string(),
    })
}

#[async_trait::async_trait]
impl RecommendationModel for OllamaModel {
    async fn suggest(&self, viewing_history: &str) -> AppResult<TitleSuggestion> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(viewing_history),
            stream: false,
            format: "json",
            options: GenerateOptions {
                temperature: 0.0,
                seed: 42,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RecommendationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, model = %self.model, "Model request failed");
            return Err(AppError::RecommendationUnavailable(format!(
                "model returned status {}",
                status
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::RecommendationUnavailable(e.to_string()))?;

        let suggestion = parse_suggestion(&body.response)?;
        tracing::info!(
            model = %self.model,
            title = %suggestion.title,
            "Model suggested a title"
        );
        Ok(suggestion)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggestion() {
        let suggestion = parse_suggestion(
            r#" {"title": " Blade Runner 2049 ", "reason": "A sequel to a film you loved."} "#,
        )
        .unwrap();

        assert_eq!(suggestion.title, "Blade Runner 2049");
        assert_eq!(suggestion.reason, "A sequel to a film you loved.");
    }

    #[test]
    fn test_parse_rejects_unstructured_output() {
        let result = parse_suggestion("I think you would enjoy Arrival.");
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }

    #[test]
    fn test_parse_rejects_empty_title() {
        let result = parse_suggestion(r#"{"title": "", "reason": "none"}"#);
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }

    #[test]
    fn test_prompt_carries_history() {
        let prompt = build_prompt("  I loved The Matrix and Blade Runner ");
        assert!(prompt.contains("Viewing history: I loved The Matrix and Blade Runner\n"));
        assert!(prompt.contains("\"title\""));
    }

    #[tokio::test]
    async fn test_unreachable_model_is_unavailable() {
        let model = OllamaModel::new(
            "http://127.0.0.1:9",
            "llama3.1",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = model.suggest("I loved The Matrix").await;
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }

    #[tokio::test]
    async fn test_stalled_model_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let model = OllamaModel::new(
            &format!("http://{}", addr),
            "llama3.1",
            Duration::from_millis(200),
        )
        .unwrap();

        let call = model.suggest("I loved The Matrix");
        let result = tokio::time::timeout(Duration::from_secs(5), call)
            .await
            .expect("generation call should give up on its own");
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }
}
