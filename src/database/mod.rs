// ABOUTME: Core database management with embedded migrations for SQLite
// ABOUTME: Exposes the shared pool and the per-domain managers for accounts, feed, chat, and tasks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

/// Direct message channels and messages
pub mod chat;
/// Media posts, likes, comments, and replies
pub mod feed;
/// Friend request and friendship state transitions
pub mod friends;
/// Per-user schedule entries
pub mod tasks;
/// Email verification and password reset tokens
pub mod tokens;
/// User account rows and onboarding attributes
pub mod users;

pub use chat::{channel_id, ChatManager};
pub use feed::{FeedManager, LikeOutcome};
pub use friends::FriendManager;
pub use tasks::TaskManager;

use sqlx::SqlitePool;
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database connection and run pending migrations
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database URL is invalid or malformed
    /// - Database connection fails
    /// - `SQLite` file creation fails
    /// - Migration process fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Wrap an existing pool without running migrations
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run all database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any migration fails or the connection is lost.
    pub async fn migrate(&self) -> AppResult<()> {
        info!("Running database migrations...");

        // Migrations are embedded at compile time from ./migrations, so they
        // are available regardless of working directory.
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
