// ABOUTME: ExerciseDB API client for exercise browsing
// ABOUTME: Looks up exercises by target muscle or body part
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// ExerciseDB client configuration
#[derive(Debug, Clone)]
pub struct ExerciseClientConfig {
    /// API key for the hosted ExerciseDB instance
    pub api_key: String,
    /// API host header value
    pub api_host: String,
    /// Base URL
    pub base_url: String,
}

impl Default for ExerciseClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: "exercisedb.p.rapidapi.com".to_owned(),
            base_url: "https://exercisedb.p.rapidapi.com".to_owned(),
        }
    }
}

/// One exercise as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise identifier
    pub id: String,
    /// Exercise name
    pub name: String,
    /// Targeted muscle (e.g. "biceps")
    pub target: String,
    /// Body part grouping (e.g. "upper arms")
    #[serde(rename = "bodyPart")]
    pub body_part: String,
    /// Required equipment
    pub equipment: String,
    /// Demonstration animation URL
    #[serde(rename = "gifUrl")]
    pub gif_url: String,
}

/// ExerciseDB API client
#[derive(Debug, Clone)]
pub struct ExerciseClient {
    config: ExerciseClientConfig,
    client: Client,
}

impl ExerciseClient {
    /// Create a client from configuration
    #[must_use]
    pub fn new(config: ExerciseClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Exercises working a target muscle
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded
    pub async fn by_target(&self, target: &str) -> AppResult<Vec<Exercise>> {
        self.get(&format!("{}/exercises/target/{target}", self.config.base_url))
            .await
    }

    /// Exercises grouped under a body part
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded
    pub async fn by_body_part(&self, body_part: &str) -> AppResult<Vec<Exercise>> {
        self.get(&format!(
            "{}/exercises/bodyPart/{body_part}",
            self.config.base_url
        ))
        .await
    }

    async fn get(&self, url: &str) -> AppResult<Vec<Exercise>> {
        let response = self
            .client
            .get(url)
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await
            .map_err(|e| AppError::external(format!("Exercise lookup failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "Exercise lookup returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::external(format!("Invalid exercise response: {e}")))
    }
}
