// ABOUTME: Recipe search API client for the meal planning surface
// ABOUTME: Single keyed search request returning labeled recipe hits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Recipe client configuration
#[derive(Debug, Clone)]
pub struct RecipeClientConfig {
    /// Application id issued by the recipe provider
    pub app_id: String,
    /// Application key issued by the recipe provider
    pub app_key: String,
    /// Search endpoint URL
    pub base_url: String,
}

impl Default for RecipeClientConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_key: String::new(),
            base_url: "https://api.edamam.com/api/recipes/v2".to_owned(),
        }
    }
}

/// One recipe as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name
    pub label: String,
    /// Hero image URL
    #[serde(default)]
    pub image: Option<String>,
    /// Canonical recipe URL
    #[serde(default)]
    pub url: Option<String>,
    /// Ingredient lines as displayed
    #[serde(rename = "ingredientLines", default)]
    pub ingredient_lines: Vec<String>,
    /// Total calories, when provided
    #[serde(default)]
    pub calories: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RecipeHit {
    recipe: Recipe,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<RecipeHit>,
}

/// Recipe search API client
#[derive(Debug, Clone)]
pub struct RecipeClient {
    config: RecipeClientConfig,
    client: Client,
}

impl RecipeClient {
    /// Create a client from configuration
    #[must_use]
    pub fn new(config: RecipeClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Search recipes matching a query
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded
    pub async fn search(&self, query: &str) -> AppResult<Vec<Recipe>> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("type", "public"),
                ("q", query),
                ("app_id", self.config.app_id.as_str()),
                ("app_key", self.config.app_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::external(format!("Recipe search failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "Recipe search returned {}",
                response.status()
            )));
        }

        let decoded: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::external(format!("Invalid recipe response: {e}")))?;

        Ok(decoded.hits.into_iter().map(|hit| hit.recipe).collect())
    }
}
