// ABOUTME: Blob retrieval and upload routes
// ABOUTME: Serves stored media by name and accepts raw uploads for feed and chat attachments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::{require_user, AppState};
use crate::errors::AppResult;

#[derive(Debug, Serialize)]
struct UploadResponse {
    media_url: String,
}

/// Media routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media/:name", get(serve_blob))
        .route("/api/media", post(upload_blob))
}

async fn serve_blob(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = state.media.load(&name).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    ))
}

async fn upload_blob(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<UploadResponse>> {
    require_user(&state, &headers).await?;
    let media_url = state.media.store(&body, None).await?;
    Ok(Json(UploadResponse { media_url }))
}
