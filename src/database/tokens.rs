// ABOUTME: Database operations for email verification and password reset tokens
// ABOUTME: Tokens are stored hashed, expire on a TTL, and are consumed atomically exactly once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};

/// Duration before a password reset token expires (1 hour)
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Duration before an email verification token expires (24 hours)
const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

impl Database {
    /// Store an email verification token
    ///
    /// The `token_hash` is a SHA-256 hash of the raw token; the raw token is
    /// handed to the delivery path and never stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn store_email_verification_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> AppResult<Uuid> {
        self.store_token(
            "email_verification_tokens",
            user_id,
            token_hash,
            VERIFICATION_TOKEN_TTL_HOURS,
        )
        .await
    }

    /// Consume an email verification token by its hash
    ///
    /// Returns the `user_id` if the token exists, is not expired, and was not
    /// yet used. Marks the token as used atomically to prevent replay.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the token is invalid, expired, or
    /// already used.
    pub async fn consume_email_verification_token(&self, token_hash: &str) -> AppResult<Uuid> {
        self.consume_token("email_verification_tokens", token_hash)
            .await
    }

    /// Store a password reset token
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn store_password_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> AppResult<Uuid> {
        self.store_token(
            "password_reset_tokens",
            user_id,
            token_hash,
            RESET_TOKEN_TTL_HOURS,
        )
        .await
    }

    /// Consume a password reset token by its hash
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the token is invalid, expired, or
    /// already used.
    pub async fn consume_password_reset_token(&self, token_hash: &str) -> AppResult<Uuid> {
        self.consume_token("password_reset_tokens", token_hash).await
    }

    /// Invalidate all unused reset tokens for a user
    ///
    /// Called after a successful password change so older tokens cannot be
    /// replayed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn invalidate_user_reset_tokens(&self, user_id: Uuid) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r"
            UPDATE password_reset_tokens
            SET used_at = $1
            WHERE user_id = $2
              AND used_at IS NULL
            ",
        )
        .bind(&now)
        .bind(user_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to invalidate reset tokens: {e}")))?;

        Ok(())
    }

    async fn store_token(
        &self,
        table: &str,
        user_id: Uuid,
        token_hash: &str,
        ttl_hours: i64,
    ) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(ttl_hours);

        sqlx::query(&format!(
            r"
            INSERT INTO {table} (id, user_id, token_hash, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, NULL, $5)
            "
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(token_hash)
        .bind(expires_at.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to store token: {e}")))?;

        Ok(id)
    }

    async fn consume_token(&self, table: &str, token_hash: &str) -> AppResult<Uuid> {
        let now = Utc::now().to_rfc3339();

        // Atomically find and mark the token as used
        let row = sqlx::query(&format!(
            r"
            UPDATE {table}
            SET used_at = $1
            WHERE token_hash = $2
              AND used_at IS NULL
              AND expires_at > $1
            RETURNING user_id
            "
        ))
        .bind(&now)
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to consume token: {e}")))?;

        row.map_or_else(
            || {
                Err(AppError::not_found(
                    "Token is invalid, expired, or already used",
                ))
            },
            |row| {
                let user_id_str: String = row.get("user_id");
                Uuid::parse_str(&user_id_str)
                    .map_err(|e| AppError::internal(format!("Invalid user_id in token: {e}")))
            },
        )
    }
}
