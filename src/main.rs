use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use verse_explain::adapters::{build_router, ExplainAppState, OpenAIConfig, OpenAIProvider};
use verse_explain::application::GenerationSettings;
use verse_explain::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let provider = OpenAIProvider::new(OpenAIConfig::from_app_config(&config.ai))?;
    let formatter = config.narrative.formatter()?;
    let state = ExplainAppState::new(Arc::new(provider), Arc::new(formatter)).with_settings(
        GenerationSettings {
            temperature: config.ai.temperature,
            max_tokens: config.ai.max_tokens,
        },
    );

    let app = build_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        model = %config.ai.model,
        length_limit = config.narrative.length_limit,
        "verse-explain listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured directive. JSON lines in production.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
