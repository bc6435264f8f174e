// ABOUTME: Clients for third-party content APIs: exercises, news articles, recipes
// ABOUTME: Simple keyed GET requests returning JSON collections, one classified error on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

//! External content API clients
//!
//! Each client issues a single keyed GET and decodes a JSON collection. No
//! pagination, retry, or rate-limit handling: a failure surfaces as one
//! classified error for the caller to show.

/// ExerciseDB lookups by target muscle or body part
pub mod exercise_client;
/// News article search
pub mod news_client;
/// Recipe search
pub mod recipe_client;

pub use exercise_client::{Exercise, ExerciseClient, ExerciseClientConfig};
pub use news_client::{Article, NewsClient, NewsClientConfig};
pub use recipe_client::{Recipe, RecipeClient, RecipeClientConfig};
