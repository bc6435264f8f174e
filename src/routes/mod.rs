// ABOUTME: Route module organization for the Stryde HTTP API
// ABOUTME: Assembles per-domain routers around the shared application state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

//! Route modules, one per domain. Handlers stay thin: extract, authenticate,
//! delegate to a manager or service, serialize.

/// Authentication and account lifecycle routes
pub mod auth;
/// Direct messaging routes
pub mod chat;
/// Third-party content pass-through routes
pub mod content;
/// Media feed routes
pub mod feed;
/// Friend relationship routes
pub mod friends;
/// Health check route
pub mod health;
/// Blob retrieval routes
pub mod media;
/// Schedule routes
pub mod tasks;
/// Profile and onboarding routes
pub mod users;

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthService;
use crate::database::{ChatManager, Database, FeedManager, FriendManager, TaskManager};
use crate::errors::{AppError, AppResult};
use crate::external::{ExerciseClient, NewsClient, RecipeClient};
use crate::models::User;
use crate::storage::MediaStore;
use crate::sync::ListenerHub;

/// Shared application state handed to every handler
pub struct AppState {
    /// Database handle
    pub db: Database,
    /// Listener hub shared by all managers
    pub hub: Arc<ListenerHub>,
    /// Authentication service
    pub auth: AuthService,
    /// Friend relationship manager
    pub friends: FriendManager,
    /// Feed manager
    pub feed: FeedManager,
    /// Chat manager
    pub chat: ChatManager,
    /// Task manager
    pub tasks: TaskManager,
    /// Blob store for uploaded media
    pub media: MediaStore,
    /// Exercise lookup client, present when configured
    pub exercises: Option<ExerciseClient>,
    /// News search client, present when configured
    pub news: Option<NewsClient>,
    /// Recipe search client, present when configured
    pub recipes: Option<RecipeClient>,
}

/// Assemble the full application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(users::routes())
        .merge(friends::routes())
        .merge(feed::routes())
        .merge(chat::routes())
        .merge(tasks::routes())
        .merge(content::routes())
        .merge(media::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolve the authenticated user from the bearer token
///
/// # Errors
///
/// Returns `AuthRequired` when no token is presented and `AuthInvalid` when
/// the token does not resolve to an account.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> AppResult<User> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::auth_required("Missing bearer token"))?;

    state
        .auth
        .current_user(token)
        .await?
        .ok_or_else(|| AppError::auth_invalid("Invalid or expired session token"))
}
