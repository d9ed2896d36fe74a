/*
 * Copyright (C) 2026 Mark Wells Dev
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-v3";
/// Prefix of environment variables that override file settings.
const ENV_PREFIX: &str = "DASHSCOPE";

/// Completion service settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// API key for the completion service. Absent means every generation fails.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Total request timeout in seconds (default: 120)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

const fn default_request_timeout() -> u64 {
    120
}

const fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from standard paths or a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or a value has the wrong type.
    pub fn load(explicit_file: Option<PathBuf>) -> Result<Self> {
        Self::load_from(
            dirs::config_dir(),
            explicit_file,
            config::Environment::with_prefix(ENV_PREFIX),
        )
    }

    fn load_from(
        user_config_dir: Option<PathBuf>,
        explicit_file: Option<PathBuf>,
        environment: config::Environment,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        // 1. Start with defaults
        builder = builder
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("model", DEFAULT_MODEL)?
            .set_default("request_timeout", default_request_timeout())?
            .set_default("connect_timeout", default_connect_timeout())?;

        // 2. Load from user config directory (~/.config/english-coach/config.toml)
        if let Some(config_dir) = user_config_dir {
            let config_path = config_dir.join("english-coach").join("config.toml");
            if config_path.exists() {
                builder = builder.add_source(config::File::from(config_path));
            }
        }

        // 3. Load from explicit file if provided
        if let Some(path) = explicit_file {
            builder = builder.add_source(config::File::from(path));
        }

        // 4. Load from environment variables (DASHSCOPE_API_KEY, DASHSCOPE_BASE_URL, etc.)
        builder = builder.add_source(environment);

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// The API key, treating blank values as absent.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
