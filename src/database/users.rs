// ABOUTME: User account database operations
// ABOUTME: Handles account creation, lookup, profile and onboarding updates, and cascade deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// Onboarding attributes collected across the sign-up flow
#[derive(Debug, Clone, Default)]
pub struct OnboardingUpdate {
    /// Age in years
    pub age: Option<i64>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Stated training goal
    pub goal: Option<String>,
    /// Self-reported fitness level
    pub fitness_level: Option<String>,
    /// Free-form health notes
    pub health_notes: Option<String>,
}

impl Database {
    /// Create a user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already in use by another account
    /// - Database operation fails
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        if let Some(existing) = self.get_user_by_email(&user.email).await? {
            if existing.id != user.id {
                return Err(AppError::email_in_use(
                    "Email already in use by another account",
                ));
            }
        }

        sqlx::query(
            r"
            INSERT INTO users (
                id, email, display_name, password_hash, avatar_url,
                age, height_cm, weight_kg, goal, fitness_level, health_notes,
                email_verified, onboarding_complete, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT(id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                password_hash = EXCLUDED.password_hash,
                last_active = EXCLUDED.last_active
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(user.age)
        .bind(user.height_cm)
        .bind(user.weight_kg)
        .bind(&user.goal)
        .bind(&user.fitness_level)
        .bind(&user.health_notes)
        .bind(user.email_verified)
        .bind(user.onboarding_complete)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.get_user_by_field("id", &user_id.to_string()).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_user_by_field("email", email).await
    }

    /// Get a user by email, classifying a miss as user-not-found
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or no account exists for
    /// the email.
    pub async fn get_user_by_email_required(&self, email: &str) -> AppResult<User> {
        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::user_not_found(format!("No account for email: {email}")))
    }

    async fn get_user_by_field(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let query = format!(
            r"
            SELECT id, email, display_name, password_hash, avatar_url,
                   age, height_cm, weight_kg, goal, fitness_level, health_notes,
                   email_verified, onboarding_complete, created_at, last_active
            FROM users WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by {field}: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Convert a database row to a [`User`]
    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        let id: String = row.get("id");

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Failed to parse user id UUID: {e}")))?,
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            avatar_url: row.get("avatar_url"),
            age: row.get("age"),
            height_cm: row.get("height_cm"),
            weight_kg: row.get("weight_kg"),
            goal: row.get("goal"),
            fitness_level: row.get("fitness_level"),
            health_notes: row.get("health_notes"),
            email_verified: row.get("email_verified"),
            onboarding_complete: row.get("onboarding_complete"),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }

    /// Update the user's last active timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(chrono::Utc::now())
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;
        Ok(())
    }

    /// Update the display name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET display_name = $1 WHERE id = $2")
            .bind(display_name)
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update display name: {e}")))?;
        Ok(())
    }

    /// Replace the profile image URI
    ///
    /// Only called after the blob upload has succeeded, so a failed upload
    /// never clobbers the previous image.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn set_avatar_url(&self, user_id: Uuid, avatar_url: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET avatar_url = $1 WHERE id = $2")
            .bind(avatar_url)
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to set avatar: {e}")))?;
        Ok(())
    }

    /// Store onboarding attributes and mark onboarding complete
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_onboarding(
        &self,
        user_id: Uuid,
        update: &OnboardingUpdate,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE users SET
                age = $1,
                height_cm = $2,
                weight_kg = $3,
                goal = $4,
                fitness_level = $5,
                health_notes = $6,
                onboarding_complete = 1
            WHERE id = $7
            ",
        )
        .bind(update.age)
        .bind(update.height_cm)
        .bind(update.weight_kg)
        .bind(&update.goal)
        .bind(&update.fitness_level)
        .bind(&update.health_notes)
        .bind(user_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update onboarding: {e}")))?;
        Ok(())
    }

    /// Mark the account email as verified
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_email_verified(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET email_verified = 1 WHERE id = $1")
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to mark email verified: {e}")))?;
        Ok(())
    }

    /// Replace the stored password hash
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update password: {e}")))?;
        Ok(())
    }

    /// Delete an account and its related documents
    ///
    /// The deletes run sequentially without a wrapping transaction; a
    /// mid-sequence failure leaves earlier deletes applied and surfaces the
    /// error. Owned posts are removed with their full comment/vote subtree;
    /// messages, tasks, relationship rows, and auth tokens go with the
    /// account. The user's own interactions on other people's content are
    /// left in place.
    ///
    /// # Errors
    ///
    /// Returns an error as soon as one delete fails
    pub async fn delete_user_cascade(&self, user_id: Uuid) -> AppResult<()> {
        let uid = user_id.to_string();

        let statements: &[&str] = &[
            r"DELETE FROM reply_likes WHERE reply_id IN (
                SELECT r.id FROM replies r
                JOIN comments c ON r.comment_id = c.id
                JOIN media_posts p ON c.post_id = p.id
                WHERE p.owner_id = $1
            )",
            r"DELETE FROM replies WHERE comment_id IN (
                SELECT c.id FROM comments c
                JOIN media_posts p ON c.post_id = p.id
                WHERE p.owner_id = $1
            )",
            r"DELETE FROM comment_likes WHERE comment_id IN (
                SELECT c.id FROM comments c
                JOIN media_posts p ON c.post_id = p.id
                WHERE p.owner_id = $1
            )",
            "DELETE FROM comments WHERE post_id IN (SELECT id FROM media_posts WHERE owner_id = $1)",
            "DELETE FROM media_likes WHERE post_id IN (SELECT id FROM media_posts WHERE owner_id = $1)",
            "DELETE FROM media_posts WHERE owner_id = $1",
            "DELETE FROM chat_messages WHERE sender_id = $1 OR recipient_id = $1",
            "DELETE FROM tasks WHERE user_id = $1",
            "DELETE FROM friend_requests WHERE from_user = $1 OR to_user = $1",
            "DELETE FROM friendships WHERE user_id = $1 OR friend_id = $1",
            "DELETE FROM email_verification_tokens WHERE user_id = $1",
            "DELETE FROM password_reset_tokens WHERE user_id = $1",
            "DELETE FROM users WHERE id = $1",
        ];

        for statement in statements {
            sqlx::query(statement)
                .bind(&uid)
                .execute(self.pool())
                .await
                .map_err(|e| AppError::database(format!("Account deletion failed: {e}")))?;
        }

        Ok(())
    }
}
