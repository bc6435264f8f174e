// ABOUTME: Schedule route handlers
// ABOUTME: Task CRUD and completion toggling, scoped to the authenticated user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{require_user, AppState};
use crate::errors::AppResult;
use crate::models::TaskItem;

#[derive(Debug, Deserialize)]
struct TaskRequest {
    title: String,
    note: Option<String>,
    due_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChangedResponse {
    changed: bool,
}

/// Schedule routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", put(update_task).delete(delete_task))
        .route("/api/tasks/:id/toggle", post(toggle_task))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<TaskItem>>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(state.tasks.list_tasks(user.id).await?))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<TaskRequest>,
) -> AppResult<Json<TaskItem>> {
    let user = require_user(&state, &headers).await?;
    let task = state
        .tasks
        .create_task(
            user.id,
            &request.title,
            request.note.as_deref(),
            request.due_date.as_deref(),
        )
        .await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<TaskRequest>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state
        .tasks
        .update_task(
            &id,
            user.id,
            &request.title,
            request.note.as_deref(),
            request.due_date.as_deref(),
        )
        .await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn toggle_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state.tasks.toggle_completed(&id, user.id).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<ChangedResponse>> {
    let user = require_user(&state, &headers).await?;
    let changed = state.tasks.delete_task(&id, user.id).await?;
    Ok(Json(ChangedResponse { changed }))
}
