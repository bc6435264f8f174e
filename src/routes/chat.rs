// ABOUTME: Direct messaging route handlers
// ABOUTME: Channel id is derived from the two participants, never supplied by the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::{require_user, AppState};
use crate::database::channel_id;
use crate::errors::AppResult;
use crate::models::ChatMessage;

/// Default message page size
const DEFAULT_MESSAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
struct MessagesQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    body: Option<String>,
    media_url: Option<String>,
}

/// Chat routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/chats/:peer/messages",
        get(list_messages).post(send_message),
    )
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(peer): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let user = require_user(&state, &headers).await?;
    let channel = channel_id(user.id, peer);
    let limit = query.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
    Ok(Json(state.chat.messages(&channel, limit).await?))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(peer): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> AppResult<Json<ChatMessage>> {
    let user = require_user(&state, &headers).await?;
    let message = state
        .chat
        .send_message(
            user.id,
            peer,
            request.body.as_deref(),
            request.media_url.as_deref(),
        )
        .await?;
    Ok(Json(message))
}
