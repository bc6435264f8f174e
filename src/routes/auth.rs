// ABOUTME: Authentication route handlers for registration, login, and account lifecycle
// ABOUTME: Thin wrappers delegating to AuthService; classified errors pass through untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{require_user, AppState};
use crate::errors::AppResult;
use crate::models::User;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user_id: String,
    /// Raw verification token; the caller owns delivery to the account email
    verification_token: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct VerifyEmailRequest {
    token: String,
}

#[derive(Debug, Deserialize)]
struct PasswordResetRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct PasswordResetConfirm {
    token: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct DeleteAccountRequest {
    password: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

/// Authentication routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/signout", post(sign_out))
        .route("/api/auth/verify-email", post(verify_email))
        .route("/api/auth/resend-verification", post(resend_verification))
        .route("/api/auth/password-reset/request", post(request_reset))
        .route("/api/auth/password-reset/confirm", post(confirm_reset))
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/account", delete(delete_account))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let outcome = state
        .auth
        .register(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    Ok(Json(RegisterResponse {
        user_id: outcome.user_id.to_string(),
        verification_token: outcome.verification_token,
        message: "Account created. Verify your email to continue.".to_owned(),
    }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let outcome = state.auth.login(&request.email, &request.password).await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<User>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(user))
}

async fn sign_out(State(state): State<Arc<AppState>>) -> AppResult<Json<MessageResponse>> {
    state.auth.sign_out()?;
    Ok(Json(MessageResponse {
        message: "Signed out".to_owned(),
    }))
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.verify_email(&request.token).await?;
    Ok(Json(MessageResponse {
        message: "Email verified".to_owned(),
    }))
}

async fn resend_verification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<TokenResponse>> {
    let user = require_user(&state, &headers).await?;
    let token = state.auth.issue_verification_token(user.id).await?;
    Ok(Json(TokenResponse { token }))
}

async fn request_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth.request_password_reset(&request.email).await?;
    Ok(Json(TokenResponse { token }))
}

async fn confirm_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetConfirm>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password updated".to_owned(),
    }))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = require_user(&state, &headers).await?;
    state
        .auth
        .change_password(user.id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password updated".to_owned(),
    }))
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<DeleteAccountRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = require_user(&state, &headers).await?;
    state.auth.delete_account(user.id, &request.password).await?;
    Ok(Json(MessageResponse {
        message: "Account deleted".to_owned(),
    }))
}
