// ABOUTME: Friend relationship route handlers
// ABOUTME: Sending, accepting, rejecting, and withdrawing requests plus the explore candidates list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_user, AppState};
use crate::errors::AppResult;
use crate::models::{FriendshipState, PublicProfile};

#[derive(Debug, Deserialize)]
struct SendRequestBody {
    to: Uuid,
}

#[derive(Debug, Serialize)]
struct RelationshipResponse {
    state: FriendshipState,
}

#[derive(Debug, Serialize)]
struct ChangedResponse {
    changed: bool,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

/// Friend relationship routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/friends", get(list_friends))
        .route("/api/friends/requests", get(list_incoming).post(send_request))
        .route("/api/friends/requests/:other/accept", post(accept_request))
        .route("/api/friends/requests/:other/reject", post(reject_request))
        .route("/api/friends/requests/:other", delete(withdraw_request))
        .route("/api/friends/candidates", get(list_candidates))
        .route("/api/friends/relationship/:other", get(relationship))
}

async fn list_friends(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<PublicProfile>>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.friends.list_friends(user.id).await?))
}

async fn list_incoming(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<PublicProfile>>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.friends.list_incoming(user.id).await?))
}

async fn list_candidates(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<PublicProfile>>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.friends.list_candidates(user.id).await?))
}

async fn send_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SendRequestBody>,
) -> AppResult<Json<MessageResponse>> {
    let user = require_user(&state, &headers).await?;
    state.friends.send_request(user.id, body.to).await?;
    Ok(Json(MessageResponse {
        message: "Friend request sent".to_owned(),
    }))
}

async fn accept_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(other): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let user = require_user(&state, &headers).await?;
    state.friends.accept_request(user.id, other).await?;
    Ok(Json(MessageResponse {
        message: "Friend request accepted".to_owned(),
    }))
}

async fn reject_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(other): Path<Uuid>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state.friends.reject_request(user.id, other).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn withdraw_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(other): Path<Uuid>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state.friends.withdraw_request(user.id, other).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn relationship(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(other): Path<Uuid>,
) -> AppResult<Json<RelationshipResponse>> {
    let user = require_user(&state, &headers).await?;
    let state_between = state.friends.relationship(user.id, other).await?;
    Ok(Json(RelationshipResponse {
        state: state_between,
    }))
}
