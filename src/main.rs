use tracing_subscriber::EnvFilter;

use what_to_build::api;
use what_to_build::config::Config;
use what_to_build::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("GitHub API: {}", config.github.api_url);
    if config.github.token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set: low rate limits and no contribution counts");
    }
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.chat_model);

    let state = AppState::new(config.clone())?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
