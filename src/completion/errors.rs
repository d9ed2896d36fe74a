// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Completion service failures.
//!
//! These never escape as request failures. The dispatcher renders them as the
//! assistant's reply so the conversation shape is preserved.

use thiserror::Error;

/// Errors returned by a [`CompletionGateway`](super::CompletionGateway).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No API key was configured.
    #[error("no API key configured (set DASHSCOPE_API_KEY)")]
    MissingCredential,

    /// The service rejected the credential.
    #[error("authentication failed (HTTP {status}): {body}")]
    Auth {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Response body as returned by the service.
        body: String,
    },

    /// The service is throttling requests.
    #[error("rate limited: {body}")]
    RateLimited {
        /// Response body as returned by the service.
        body: String,
    },

    /// The request never produced an HTTP response.
    #[error("connection to {endpoint} failed: {reason}")]
    Network {
        /// URL that was being contacted.
        endpoint: String,
        /// Underlying transport error.
        reason: String,
    },

    /// Any other non-2xx response.
    #[error("HTTP {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the service.
        body: String,
    },

    /// A 2xx response without a usable completion.
    #[error("malformed completion response: {reason}")]
    MalformedResponse {
        /// What was wrong with the payload.
        reason: String,
    },
}

/// Coarse failure class, used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential missing or rejected.
    Auth,
    /// Transport failure.
    Network,
    /// Throttled by the service.
    RateLimit,
    /// Everything else.
    Unknown,
}

impl ErrorCategory {
    /// Lowercase label for structured logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::Unknown => "unknown",
        }
    }
}

impl GenerationError {
    /// Classifies the failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential | Self::Auth { .. } => ErrorCategory::Auth,
            Self::Network { .. } => ErrorCategory::Network,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Upstream { .. } | Self::MalformedResponse { .. } => ErrorCategory::Unknown,
        }
    }

    /// Maps a non-success HTTP status and its body to an error.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth { status, body },
            429 => Self::RateLimited { body },
            _ => Self::Upstream { status, body },
        }
    }
}
