// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! English Coach MCP server.
//!
//! Serves notes, coaching prompts and the `add-note` tool to a single MCP
//! client over stdin/stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use english_coach_mcp::coach::{ChangeNotifier, CoachHandler, NoteStore};
use english_coach_mcp::completion::ChatCompletionClient;
use english_coach_mcp::config::Config;
use english_coach_mcp::mcp::McpServer;

/// Command-line arguments for English Coach.
#[derive(Parser, Debug)]
#[command(name = "english-coach")]
#[command(about = "MCP server for Chinese-to-English translation and grammar coaching")]
#[command(version = env!("ENGLISH_COACH_VERSION"))]
struct Args {
    /// Path to configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model to request from the completion service.
    /// Overrides the config file and environment if set.
    #[arg(long)]
    model: Option<String>,
}

/// Runs the MCP server until the client disconnects or a termination signal arrives.
///
/// # Errors
///
/// Returns an error if configuration fails to load or the server hits an I/O error.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Pick up DASHSCOPE_* (and RUST_LOG) from a .env file before anything reads them
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("english_coach_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {e}"),
    }

    let mut config = Config::load(args.config)?;

    // Override model if provided on CLI
    if let Some(model) = args.model {
        config.model = model;
    }

    let client =
        ChatCompletionClient::from_config(&config).context("Failed to set up completion client")?;
    if client.has_credential() {
        info!(
            "Using model {} at {}",
            config.model,
            client.endpoint()
        );
    } else {
        warn!("No API key configured (set DASHSCOPE_API_KEY); coaching prompts will report errors");
    }

    let (notifier, notifications) = ChangeNotifier::channel();
    let handler = CoachHandler::new(NoteStore::new(), client, notifier);
    let mut server = McpServer::new(handler, notifications);

    info!("Starting English Coach MCP server");

    // Wait for either the client to disconnect or a termination signal
    tokio::select! {
        res = server.run() => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            Ok(())
        }
    }
}
