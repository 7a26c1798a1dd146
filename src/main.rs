use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use onda_backend::config::Config;
use onda_backend::routes;
use onda_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("onda_backend=debug,tower_http=debug")),
        )
        .init();

    let config = Config::discover()?;

    // Initialize app state; agents decide live or mock mode here
    let app_state = AppState::new(config.clone())?;
    let mode = if app_state.agents.is_live() { "live" } else { "mock" };
    info!("Agents initialized in {} mode", mode);

    let app = routes::app(app_state);

    // Start server
    let system_config = &config.system_config;
    let listener =
        tokio::net::TcpListener::bind((system_config.host.as_str(), system_config.port)).await?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
