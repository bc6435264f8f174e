// ABOUTME: Profile and onboarding route handlers
// ABOUTME: Display name, onboarding attributes, and profile image upload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{require_user, AppState};
use crate::database::users::OnboardingUpdate;
use crate::errors::AppResult;

#[derive(Debug, Deserialize)]
struct ProfileUpdateRequest {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct OnboardingRequest {
    age: Option<i64>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    goal: Option<String>,
    fitness_level: Option<String>,
    health_notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct AvatarResponse {
    avatar_url: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

/// Profile routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/me/profile", put(update_profile))
        .route("/api/users/me/onboarding", put(update_onboarding))
        .route("/api/users/me/avatar", post(upload_avatar))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ProfileUpdateRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = require_user(&state, &headers).await?;
    state
        .db
        .update_display_name(user.id, &request.display_name)
        .await?;
    Ok(Json(MessageResponse {
        message: "Profile updated".to_owned(),
    }))
}

async fn update_onboarding(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<OnboardingRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = require_user(&state, &headers).await?;
    let update = OnboardingUpdate {
        age: request.age,
        height_cm: request.height_cm,
        weight_kg: request.weight_kg,
        goal: request.goal,
        fitness_level: request.fitness_level,
        health_notes: request.health_notes,
    };
    state.db.update_onboarding(user.id, &update).await?;
    Ok(Json(MessageResponse {
        message: "Onboarding saved".to_owned(),
    }))
}

/// The blob upload runs first; only a successful store updates the account,
/// so a failed upload leaves the previous profile image in place.
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<AvatarResponse>> {
    let user = require_user(&state, &headers).await?;
    let avatar_url = state
        .auth
        .update_avatar(&state.media, user.id, &body, Some("jpg"))
        .await?;
    Ok(Json(AvatarResponse { avatar_url }))
}
