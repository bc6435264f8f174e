// ABOUTME: Pass-through routes for third-party content APIs
// ABOUTME: Exercises, news articles, and recipes; unconfigured providers surface a config error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::{require_user, AppState};
use crate::errors::{AppError, AppResult};
use crate::external::{Article, Exercise, Recipe};

#[derive(Debug, Deserialize)]
struct ExerciseQuery {
    target: Option<String>,
    body_part: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: String,
}

/// Content routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/content/exercises", get(exercises))
        .route("/api/content/articles", get(articles))
        .route("/api/content/recipes", get(recipes))
}

async fn exercises(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ExerciseQuery>,
) -> AppResult<Json<Vec<Exercise>>> {
    require_user(&state, &headers).await?;

    let client = state
        .exercises
        .as_ref()
        .ok_or_else(|| AppError::config("Exercise API is not configured"))?;

    let results = match (query.target, query.body_part) {
        (Some(target), _) => client.by_target(&target).await?,
        (None, Some(body_part)) => client.by_body_part(&body_part).await?,
        (None, None) => {
            return Err(AppError::invalid_input(
                "Provide a target or body_part parameter",
            ))
        }
    };

    Ok(Json(results))
}

async fn articles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Article>>> {
    require_user(&state, &headers).await?;

    let client = state
        .news
        .as_ref()
        .ok_or_else(|| AppError::config("News API is not configured"))?;

    Ok(Json(client.search(&query.query).await?))
}

async fn recipes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Recipe>>> {
    require_user(&state, &headers).await?;

    let client = state
        .recipes
        .as_ref()
        .ok_or_else(|| AppError::config("Recipe API is not configured"))?;

    Ok(Json(client.search(&query.query).await?))
}
