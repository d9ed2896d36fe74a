// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! English Coach is a single-session MCP endpoint for practising English.
//!
//! It keeps short text notes as resources, exposes translation, grammar check and
//! translation verification prompts backed by an OpenAI-compatible completion
//! service, and offers an `add-note` tool that announces resource list changes.

/// Notes, the capability catalog and the request dispatcher.
pub mod coach;
/// OpenAI-compatible completion gateway.
pub mod completion;
/// Configuration for the completion service.
pub mod config;
/// Request-level error kinds.
pub mod error;
/// MCP server implementation and type definitions.
pub mod mcp;
