//! Main Entrypoint for the Avatar Tutor API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the LLM and HeyGen clients and the tutor.
//! 3. Constructing the Axum router.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tutor_api::{config::Config, router::create_router, state::AppState};
use tutor_core::{
    llm_client::OpenAICompatibleClient,
    reply::DEFAULT_SYSTEM_PROMPT,
    tutor::Tutor,
    video::{HeyGenClient, VideoProvider},
};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Reads the system prompt override, falling back to the embedded template.
fn load_prompt(config: &Config) -> anyhow::Result<String> {
    match &config.prompt_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display())),
        None => Ok(DEFAULT_SYSTEM_PROMPT.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let api_key = config
        .llm_api_key()
        .context("LLM API key is missing for the selected provider")?;
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.llm_api_base());
    let llm_client = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
    ));

    let heygen = HeyGenClient::new(config.heygen());
    if heygen.config().generation_enabled() {
        info!("HeyGen video generation enabled.");
    } else {
        info!("HeyGen avatar/voice/key not fully configured; replies will carry no video.");
    }
    let video: Arc<dyn VideoProvider> = Arc::new(heygen);

    let tutor = Tutor::new(llm_client, video.clone(), load_prompt(&config)?)
        .with_strict_replies(config.strict_reply_schema);

    let app_state = Arc::new(AppState {
        tutor: Arc::new(tutor),
        video,
    });

    // --- 4. Create Router ---
    let app = create_router(app_state);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        strict_replies = config.strict_reply_schema,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
