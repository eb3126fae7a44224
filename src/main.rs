//! Ollama Chat API
//!
//! HTTP front for a local Ollama runtime. Keeps an in-memory transcript per
//! conversation id and replays it to the model on every message.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use config::Config;
use core::{ChatEngine, ConversationStore};
use providers::OllamaProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_engine: Arc<ChatEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ollama_chat_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let store = Arc::new(ConversationStore::with_max_turns(config.max_history_turns));
    let provider = Arc::new(OllamaProvider::new(config.ollama_url.clone()));

    tracing::info!(
        "Using Ollama at {} (timeout {}s, history cap {})",
        config.ollama_url,
        config.inference_timeout_secs,
        config.max_history_turns
    );

    let chat_engine = Arc::new(
        ChatEngine::new(store, provider)
            .with_timeout(Duration::from_secs(config.inference_timeout_secs)),
    );

    let state = AppState { chat_engine };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Chat API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
