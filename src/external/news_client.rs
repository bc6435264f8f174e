// ABOUTME: News search API client for the articles surface
// ABOUTME: Single keyed search request returning a list of articles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// News client configuration
#[derive(Debug, Clone)]
pub struct NewsClientConfig {
    /// API key
    pub api_key: String,
    /// API host header value
    pub api_host: String,
    /// Search endpoint URL
    pub base_url: String,
    /// Result language
    pub language: String,
}

impl Default for NewsClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: "news-api14.p.rapidapi.com".to_owned(),
            base_url: "https://news-api14.p.rapidapi.com/v2/search/articles".to_owned(),
            language: "en".to_owned(),
        }
    }
}

/// One article as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Headline
    pub title: String,
    /// Canonical article URL
    pub url: String,
    /// Short excerpt, when provided
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Thumbnail image URL, when provided
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Publication date, when provided
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Article>,
}

/// News search API client
#[derive(Debug, Clone)]
pub struct NewsClient {
    config: NewsClientConfig,
    client: Client,
}

impl NewsClient {
    /// Create a client from configuration
    #[must_use]
    pub fn new(config: NewsClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Search articles matching a query
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded
    pub async fn search(&self, query: &str) -> AppResult<Vec<Article>> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("language", self.config.language.as_str()),
                ("query", query),
            ])
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await
            .map_err(|e| AppError::external(format!("Article search failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "Article search returned {}",
                response.status()
            )));
        }

        let decoded: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::external(format!("Invalid article response: {e}")))?;

        Ok(decoded.data)
    }
}
