use std::sync::Arc;

use moviebase::{
    cache::{create_redis_client, Cache},
    create_router,
    services::{MetadataProvider, OllamaModel, RecommendationModel, TmdbClient},
    AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moviebase=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    if !config.has_tmdb_credential() {
        tracing::warn!(
            "Neither TMDB_ACCESS_TOKEN nor TMDB_API_KEY is set; catalog pages will be empty"
        );
    }

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => Cache::redis(create_redis_client(url)?),
        None => Cache::in_memory(),
    };
    tracing::info!(backend = cache.backend_name(), "Response cache ready");

    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbClient::from_config(&config, cache));
    let model: Arc<dyn RecommendationModel> = Arc::new(OllamaModel::from_config(&config)?);

    let state = Arc::new(AppState::new(provider, model, &config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, model = %config.llm_model, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Flushing pending cache writes");
    cache_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
