use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDb v3 API key, sent as the `api_key` query parameter
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb v4 read access token, sent as a bearer token. Wins over the API key.
    #[serde(default)]
    pub tmdb_access_token: Option<String>,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDb image CDN base URL (size segment is appended per image)
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Region used for watch-provider discovery
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Redis connection URL. Falls back to an in-process cache when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Upstream response cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Base URL of the Ollama-compatible generation API
    #[serde(default = "default_llm_url")]
    pub llm_url: String,

    /// Model used for recommendations
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Timeout for a single generation call
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,

    /// Embedded player base URL
    #[serde(default = "default_player_url")]
    pub player_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_watch_region() -> String {
    "US".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_llm_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.1".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_player_url() -> String {
    "https://www.vidking.net".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// True when either TMDb credential form is present and non-blank
    pub fn has_tmdb_credential(&self) -> bool {
        [&self.tmdb_access_token, &self.tmdb_api_key]
            .iter()
            .any(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_credentials() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.port, 3000);
        assert!(config.redis_url.is_none());
        assert!(!config.has_tmdb_credential());
    }

    #[test]
    fn test_reads_credentials_and_overrides() {
        let config = Config::from_vars(vars(&[
            ("TMDB_API_KEY", "abc123"),
            ("PORT", "8080"),
            ("WATCH_REGION", "GB"),
        ]))
        .unwrap();

        assert_eq!(config.tmdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.watch_region, "GB");
        assert!(config.has_tmdb_credential());
    }

    #[test]
    fn test_blank_credential_does_not_count() {
        let config = Config::from_vars(vars(&[("TMDB_ACCESS_TOKEN", "   ")])).unwrap();
        assert!(!config.has_tmdb_credential());
    }

    #[test]
    fn test_invalid_port_fails() {
        let result = Config::from_vars(vars(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }
}
