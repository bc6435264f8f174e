// ABOUTME: Environment-only server configuration
// ABOUTME: Loads ports, database URL, storage paths, and external API credentials from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

/// Default HTTP port when `STRYDE_HTTP_PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default SQLite database URL
const DEFAULT_DATABASE_URL: &str = "sqlite:data/stryde.db";

/// Maximum accepted blob size when `STRYDE_MAX_BLOB_BYTES` is unset (10 MiB)
const DEFAULT_MAX_BLOB_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration assembled from environment variables
///
/// Configuration is environment-only: there is no config file. Secrets
/// (JWT signing key, third-party API keys) are never defaulted.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite database URL
    pub database_url: String,
    /// Secret used to sign session JWTs
    pub jwt_secret: String,
    /// Directory holding uploaded media blobs
    pub blob_dir: PathBuf,
    /// Maximum accepted blob upload size in bytes
    pub max_blob_bytes: usize,
    /// File persisting the local session (last authenticated user, flags)
    pub session_file: PathBuf,
    /// ExerciseDB API key, if exercise browsing is enabled
    pub exercise_api_key: Option<String>,
    /// News search API key, if article browsing is enabled
    pub news_api_key: Option<String>,
    /// Recipe search application id
    pub recipe_app_id: Option<String>,
    /// Recipe search application key
    pub recipe_app_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if `STRYDE_JWT_SECRET` is missing or if a numeric
    /// variable fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("STRYDE_HTTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::config(format!("Invalid STRYDE_HTTP_PORT: {e}")))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let jwt_secret = env::var("STRYDE_JWT_SECRET")
            .map_err(|_| AppError::config("STRYDE_JWT_SECRET must be set"))?;

        let max_blob_bytes = match env::var("STRYDE_MAX_BLOB_BYTES") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| AppError::config(format!("Invalid STRYDE_MAX_BLOB_BYTES: {e}")))?,
            Err(_) => DEFAULT_MAX_BLOB_BYTES,
        };

        let data_dir = Self::data_dir();
        let blob_dir =
            env::var("STRYDE_BLOB_DIR").map_or_else(|_| data_dir.join("blobs"), PathBuf::from);
        let session_file = env::var("STRYDE_SESSION_FILE")
            .map_or_else(|_| data_dir.join("session.json"), PathBuf::from);

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            blob_dir,
            max_blob_bytes,
            session_file,
            exercise_api_key: env::var("STRYDE_EXERCISE_API_KEY").ok(),
            news_api_key: env::var("STRYDE_NEWS_API_KEY").ok(),
            recipe_app_id: env::var("STRYDE_RECIPE_APP_ID").ok(),
            recipe_app_key: env::var("STRYDE_RECIPE_APP_KEY").ok(),
        })
    }

    /// Platform data directory for server-owned files
    fn data_dir() -> PathBuf {
        dirs::data_dir().map_or_else(|| PathBuf::from("data"), |base| base.join("stryde"))
    }
}
