// ABOUTME: Media feed route handlers
// ABOUTME: Posts, like toggles, comments, and one-level replies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{require_user, AppState};
use crate::database::LikeOutcome;
use crate::errors::{AppError, AppResult};
use crate::models::{Comment, CommentThread, MediaPost, Reply};

/// Default feed page size
const DEFAULT_FEED_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
struct FeedQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreatePostRequest {
    media_url: String,
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionRequest {
    caption: String,
}

#[derive(Debug, Deserialize)]
struct CommentRequest {
    body: String,
}

#[derive(Debug, Serialize)]
struct ChangedResponse {
    changed: bool,
}

/// Feed routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed", get(list_feed))
        .route("/api/posts", post(create_post))
        .route("/api/posts/:id", get(get_post).delete(delete_post))
        .route("/api/posts/:id/caption", put(update_caption))
        .route("/api/posts/:id/like", post(toggle_like))
        .route("/api/posts/:id/comments", get(list_comments).post(add_comment))
        .route("/api/comments/:id/replies", post(add_reply))
        .route("/api/comments/:id/like", post(toggle_comment_like))
        .route("/api/replies/:id/like", post(toggle_reply_like))
}

async fn list_feed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<MediaPost>>> {
    let user = require_user(&state, &headers).await?;
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    Ok(Json(state.feed.list_feed(user.id, limit).await?))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> AppResult<Json<MediaPost>> {
    let user = require_user(&state, &headers).await?;
    let post = state
        .feed
        .create_post(user.id, &request.media_url, request.caption.as_deref())
        .await?;
    Ok(Json(post))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<MediaPost>> {
    require_user(&state, &headers).await?;
    state
        .feed
        .get_post(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Post"))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state.feed.delete_post(&id, user.id).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn update_caption(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CaptionRequest>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state
        .feed
        .update_caption(&id, user.id, &request.caption)
        .await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<LikeOutcome>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.feed.toggle_like(&id, user.id).await?))
}

async fn list_comments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CommentThread>>> {
    require_user(&state, &headers).await?;
    Ok(Json(state.feed.comment_threads(&id).await?))
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> AppResult<Json<Comment>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(
        state.feed.add_comment(&id, user.id, &request.body).await?,
    ))
}

async fn add_reply(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> AppResult<Json<Reply>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(
        state.feed.add_reply(&id, user.id, &request.body).await?,
    ))
}

async fn toggle_comment_like(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<LikeOutcome>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.feed.toggle_comment_like(&id, user.id).await?))
}

async fn toggle_reply_like(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<LikeOutcome>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.feed.toggle_reply_like(&id, user.id).await?))
}
