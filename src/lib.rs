// ABOUTME: Main library entry point for the Stryde fitness and social backend
// ABOUTME: Accounts, friend relationships, media feed, direct messaging, scheduling, content APIs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

#![deny(unsafe_code)]

//! # Stryde Server
//!
//! Backend for the Stryde fitness and social client: user accounts with
//! onboarding, a media feed with likes and comments, friend relationships,
//! direct messaging over deterministic two-party channels, a per-user
//! schedule, and thin clients for third-party exercise, news, and recipe
//! content.
//!
//! ## Architecture
//!
//! - **Database managers**: each domain owns a manager over the shared
//!   SQLite pool; counter updates ride the same transaction as the row
//!   change they mirror
//! - **Listener hub**: managers publish change events that live views
//!   subscribe to through scoped [`sync::Subscription`] handles
//! - **Auth**: bcrypt credentials, JWT sessions, hashed single-use
//!   verification and reset tokens
//! - **Routes**: thin axum handlers delegating to the managers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stryde_server::config::ServerConfig;
//! use stryde_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Stryde server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Environment-only configuration
pub mod config;

/// Database management and per-domain managers
pub mod database;

/// Unified error handling with classified error codes
pub mod errors;

/// External content API clients (exercises, news, recipes)
pub mod external;

/// Common data models
pub mod models;

/// HTTP routes
pub mod routes;

/// Blob storage for uploaded media
pub mod storage;

/// Document listener hub and subscriptions
pub mod sync;
