use std::sync::Arc;
use tracing::info;

use repo_proxy::{config::Config, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    info!("Starting repo-proxy");
    info!("GitHub API: {}", config.api_base);
    info!("GitHub web: {}", config.web_base);
    info!(
        "Search cache: ttl {:?}, capacity {}",
        config.cache_ttl, config.cache_max_capacity
    );
    if config.token.is_none() {
        info!("GITHUB_TOKEN not set, using unauthenticated rate limits");
    }

    let state = Arc::new(AppState::new(&config)?);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("repo-proxy listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
