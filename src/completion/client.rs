// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! OpenAI-compatible chat completion client.

use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::errors::GenerationError;
use super::persona::COACH_PERSONA;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole};
use super::CompletionGateway;
use crate::config::Config;

/// Sends the coach persona plus a user prompt to `{base_url}/chat/completions`.
///
/// Built without checking the credential or connectivity; both surface as
/// [`GenerationError`]s on the first call so discovery keeps working when
/// generation is misconfigured.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionClient {
    /// Creates a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    /// (for example, no TLS backend is available).
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        let http = HttpClient::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| GenerationError::Network {
                endpoint: endpoint.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key().map(str::to_string),
            model: config.model.clone(),
        })
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether an API key is available.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, user_prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: COACH_PERSONA.to_string(),
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: user_prompt.to_string(),
                },
            ],
        }
    }
}

impl CompletionGateway for ChatCompletionClient {
    async fn generate(&self, user_prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        debug!(model = %self.model, "Requesting completion from {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(user_prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Network {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Completion request rejected");
            return Err(GenerationError::from_status(status.as_u16(), body));
        }

        let body: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        body.into_text()
            .ok_or_else(|| GenerationError::MalformedResponse {
                reason: "response contained no message content".to_string(),
            })
    }
}
