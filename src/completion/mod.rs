// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Gateway to the external text generation service.

/// HTTP client for OpenAI-compatible endpoints.
mod client;
/// Typed generation failures.
mod errors;
/// The fixed coaching system prompt.
mod persona;
/// Chat completion wire types.
mod types;

use std::future::Future;

pub use client::ChatCompletionClient;
pub use errors::{ErrorCategory, GenerationError};
pub use persona::COACH_PERSONA;

/// Generates coaching replies for a user prompt.
///
/// Implementations always pair the prompt with [`COACH_PERSONA`] and must turn
/// every upstream failure into a [`GenerationError`].
pub trait CompletionGateway: Send + Sync {
    /// Produces a reply to `user_prompt`.
    fn generate(
        &self,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}
