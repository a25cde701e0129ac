use std::sync::Arc;

use course_recommendations::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgCatalog},
    render::Renderer,
    services::{
        providers::{CachedProvider, RecommendationProvider, WebServiceProvider},
        BlockService,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_recommendations=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let settings = config.block_settings();

    let pool = create_pool(&config.database_url).await?;
    let catalog = Arc::new(PgCatalog::new(
        pool,
        config.table_prefix.clone(),
        config.profile_field_shortname.clone(),
        &settings,
    ));

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::connect(redis_client).await?;

    let web_service: Arc<dyn RecommendationProvider> = Arc::new(WebServiceProvider::new(
        config.recommendation_service_url.clone(),
        config.recommendation_service_token.clone(),
        config.recommendation_service_function.clone(),
        config.provider_timeout(),
    )?);
    let provider = Arc::new(CachedProvider::new(
        web_service,
        cache,
        config.recommendation_cache_ttl_secs,
    ));

    let block = BlockService::new(
        provider,
        catalog.clone(),
        catalog,
        config.recommendation_source,
        settings,
    );
    let app = create_router(AppState::new(block, Renderer::new()?));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        source = ?config.recommendation_source,
        "Course recommendations service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
