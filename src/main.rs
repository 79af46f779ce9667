use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zeyu_folio::{
    config::Config,
    api::routes::create_router,
    llm::GeminiClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;

    let gemini = GeminiClient::from_config(&config)?;
    if gemini.is_configured() {
        info!(model = %config.gemini_model, "Gemini client ready");
    } else {
        warn!("GEMINI_API_KEY is not set, AI features will answer with a configuration hint");
    }

    let app_state = AppState::new(config, Arc::new(gemini));
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
