// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Request failures raised back to the MCP client.

use thiserror::Error;

use crate::mcp::{INVALID_PARAMS, RESOURCE_NOT_FOUND};

/// A structural or validation failure for a single request.
///
/// None of these leave the note store modified; the next request is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No note exists under the requested name.
    #[error("Note not found: {0}")]
    NotFound(String),

    /// The resource URI does not use the `note` scheme.
    #[error("Unsupported URI scheme: {0}")]
    UnsupportedScheme(String),

    /// The resource URI could not be parsed at all.
    #[error("Invalid resource URI '{uri}': {reason}")]
    InvalidUri {
        /// The URI as received.
        uri: String,
        /// Why parsing failed.
        reason: String,
    },

    /// No prompt is registered under this name.
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    /// No tool is registered under this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool call carried no arguments.
    #[error("Missing arguments")]
    MissingArguments,

    /// A required argument was absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl DispatchError {
    /// JSON-RPC error code reported for this failure.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::NotFound(_) => RESOURCE_NOT_FOUND,
            Self::UnsupportedScheme(_)
            | Self::InvalidUri { .. }
            | Self::UnknownPrompt(_)
            | Self::UnknownTool(_)
            | Self::MissingArguments
            | Self::MissingField(_) => INVALID_PARAMS,
        }
    }
}
