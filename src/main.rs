// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use quizroom::config::{Config, StoreBackend};
use quizroom::routes;
use quizroom::state::AppState;
use quizroom::store::{KvStore, MemoryStore, SqliteStore};
use quizroom::utils::manifest;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "quizroom.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: Arc<dyn KvStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Sqlite => {
            let Some(url) = config.database_url.as_deref() else {
                tracing::error!("STORE_BACKEND=sqlite requires DATABASE_URL");
                std::process::exit(1);
            };
            match SqliteStore::connect(url).await {
                Ok(store) => {
                    tracing::info!("Database connected...");
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::error!("Failed to open database: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    // Refresh the lecture manifest so /lectures/index.json matches the directory.
    let lectures_dir = config.lectures_dir.clone();
    match tokio::task::spawn_blocking(move || manifest::write_manifest(&lectures_dir)).await {
        Ok(Ok(m)) => tracing::info!("Lecture manifest lists {} files", m.files.len()),
        Ok(Err(e)) => tracing::warn!("Skipping lecture manifest: {}", e),
        Err(e) => tracing::warn!("Manifest task failed: {}", e),
    }

    let state = AppState {
        store,
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = config.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
