// ABOUTME: Server binary: loads configuration, opens the database, and serves the HTTP API
// ABOUTME: Tracing is initialized from RUST_LOG with an info default
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stryde_server::auth::{AuthManager, AuthService, SessionStore};
use stryde_server::config::ServerConfig;
use stryde_server::database::{ChatManager, Database, FeedManager, FriendManager, TaskManager};
use stryde_server::errors::{AppError, AppResult};
use stryde_server::external::{
    ExerciseClient, ExerciseClientConfig, NewsClient, NewsClientConfig, RecipeClient,
    RecipeClientConfig,
};
use stryde_server::routes::{self, AppState};
use stryde_server::storage::MediaStore;
use stryde_server::sync::ListenerHub;

#[derive(Parser)]
#[command(name = "stryde-server", about = "Stryde fitness and social backend")]
struct Args {
    /// Override the HTTP port from the environment
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }

    let db = Database::new(&config.database_url).await?;
    let hub = Arc::new(ListenerHub::new());
    let media = MediaStore::new(config.blob_dir.clone(), config.max_blob_bytes).await?;

    let auth = AuthService::new(
        db.clone(),
        AuthManager::new(config.jwt_secret.clone()),
        SessionStore::new(config.session_file.clone()),
    );

    let pool = db.pool().clone();
    let state = Arc::new(AppState {
        friends: FriendManager::new(pool.clone(), Arc::clone(&hub)),
        feed: FeedManager::new(pool.clone(), Arc::clone(&hub)),
        chat: ChatManager::new(pool.clone(), Arc::clone(&hub)),
        tasks: TaskManager::new(pool, Arc::clone(&hub)),
        exercises: config.exercise_api_key.clone().map(|api_key| {
            ExerciseClient::new(ExerciseClientConfig {
                api_key,
                ..ExerciseClientConfig::default()
            })
        }),
        news: config.news_api_key.clone().map(|api_key| {
            NewsClient::new(NewsClientConfig {
                api_key,
                ..NewsClientConfig::default()
            })
        }),
        recipes: config.recipe_app_id.clone().zip(config.recipe_app_key.clone()).map(
            |(app_id, app_key)| {
                RecipeClient::new(RecipeClientConfig {
                    app_id,
                    app_key,
                    ..RecipeClientConfig::default()
                })
            },
        ),
        db,
        hub,
        auth,
        media,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Stryde server listening");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    // Both Ok and Err mean we should stop waiting and shut down
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
