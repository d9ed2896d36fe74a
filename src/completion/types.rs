// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Wire types for the OpenAI-compatible chat completions API.

use serde::{Deserialize, Serialize};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Persona and rules.
    System,
    /// The learner's request.
    User,
    /// The model's reply.
    Assistant,
}

/// A single message in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
}

/// Response body of a non-streaming completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Candidate completions; only the first is used.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single candidate completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChoiceMessage,
}

/// Generated message inside a [`Choice`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text; some providers send `null` on refusals.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_serialize_request_roles_lowercase() -> Result<()> {
        let request = ChatCompletionRequest {
            model: "deepseek-v3".into(),
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: "persona".into(),
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: "hello".into(),
                },
            ],
        };
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["model"], "deepseek-v3");
        Ok(())
    }

    #[test]
    fn test_first_choice_text() -> Result<()> {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Sure!"}},
                {"index": 1, "message": {"role": "assistant", "content": "Other"}}
            ]
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(json)?;
        assert_eq!(response.into_text().as_deref(), Some("Sure!"));
        Ok(())
    }

    #[test]
    fn test_null_content_yields_none() -> Result<()> {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json)?;
        assert!(response.into_text().is_none());
        Ok(())
    }

    #[test]
    fn test_missing_choices_yields_none() -> Result<()> {
        let response: ChatCompletionResponse = serde_json::from_str("{}")?;
        assert!(response.into_text().is_none());
        Ok(())
    }
}
