// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Integration tests for configuration loading.
//!
//! Verifies that the server picks up settings from an explicit config file
//! and that bad configuration fails at startup rather than mid-session.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

fn coach_command(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_english-coach"));
    // Isolate from user-level config, environment and any .env in the crate root
    cmd.current_dir(config_home)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("DASHSCOPE_API_KEY")
        .env_remove("DASHSCOPE_BASE_URL")
        .env_remove("DASHSCOPE_MODEL");
    cmd
}

#[test]
fn test_config_file_selects_endpoint() -> Result<()> {
    let config_home = tempfile::tempdir()?;
    let config_path = config_home.path().join("coach.toml");
    std::fs::write(
        &config_path,
        "api_key = \"sk-test\"\nbase_url = \"http://127.0.0.1:9/v1\"\nconnect_timeout = 2\nrequest_timeout = 5\n",
    )?;

    let mut child = coach_command(config_home.path())
        .arg("--config")
        .arg(&config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn english-coach")?;
    let mut stdin = child.stdin.take().context("Failed to get stdin")?;
    let mut stdout = BufReader::new(child.stdout.take().context("Failed to get stdout")?);

    let init_req = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        }
    })
    .to_string();
    writeln!(stdin, "{init_req}").context("Failed to write to stdin")?;

    let mut line = String::new();
    stdout
        .read_line(&mut line)
        .context("Failed to read from stdout")?;
    let response: Value = serde_json::from_str(&line).context("Failed to parse JSON response")?;
    assert!(response.get("result").is_some(), "Init failed: {response:?}");

    // Nothing listens on the discard port, so generation fails with the configured endpoint
    let translate_req = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "prompts/get",
        "params": {
            "name": "/translate",
            "arguments": {"text": "你好"}
        }
    })
    .to_string();
    writeln!(stdin, "{translate_req}").context("Failed to write to stdin")?;

    line.clear();
    stdout
        .read_line(&mut line)
        .context("Failed to read from stdout")?;
    let response: Value = serde_json::from_str(&line).context("Failed to parse JSON response")?;

    let reply = response["result"]["messages"][1]["content"]["text"]
        .as_str()
        .context("translate should return an assistant reply")?;
    assert!(
        reply.starts_with("Error calling completion service:"),
        "Unexpected reply: {reply}"
    );
    assert!(
        reply.contains("127.0.0.1:9"),
        "Reply should name the configured endpoint: {reply}"
    );

    drop(stdin);
    let _ = child.kill();
    let _ = child.wait();
    Ok(())
}

#[test]
fn test_dotenv_in_working_directory_supplies_credential() -> Result<()> {
    let work_dir = tempfile::tempdir()?;
    std::fs::write(
        work_dir.path().join(".env"),
        "DASHSCOPE_API_KEY=sk-from-dotenv\nDASHSCOPE_BASE_URL=http://127.0.0.1:9/v1\n",
    )?;

    let mut child = coach_command(work_dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn english-coach")?;
    let mut stdin = child.stdin.take().context("Failed to get stdin")?;
    let mut stdout = BufReader::new(child.stdout.take().context("Failed to get stdout")?);

    let check_req = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "prompts/get",
        "params": {
            "name": "/check",
            "arguments": {"text": "I has a pen."}
        }
    })
    .to_string();
    writeln!(stdin, "{check_req}").context("Failed to write to stdin")?;

    let mut line = String::new();
    stdout
        .read_line(&mut line)
        .context("Failed to read from stdout")?;
    let response: Value = serde_json::from_str(&line).context("Failed to parse JSON response")?;

    // The key came from .env, so the failure is the unreachable endpoint, not a missing key
    let reply = response["result"]["messages"][1]["content"]["text"]
        .as_str()
        .context("check should return an assistant reply")?;
    assert!(reply.contains("127.0.0.1:9"), "Unexpected reply: {reply}");
    assert!(!reply.contains("no API key"), "Unexpected reply: {reply}");

    drop(stdin);
    let _ = child.kill();
    let _ = child.wait();
    Ok(())
}

#[test]
fn test_invalid_config_fails_at_startup() -> Result<()> {
    let config_home = tempfile::tempdir()?;
    let config_path = config_home.path().join("coach.toml");
    std::fs::write(&config_path, "request_timeout = \"soon\"\n")?;

    let output = coach_command(config_home.path())
        .arg("--config")
        .arg(&config_path)
        .stdin(Stdio::null())
        .output()
        .context("Failed to run english-coach")?;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "No protocol output expected");
    Ok(())
}

#[test]
fn test_missing_config_file_fails_at_startup() -> Result<()> {
    let config_home = tempfile::tempdir()?;

    let output = coach_command(config_home.path())
        .arg("--config")
        .arg(config_home.path().join("absent.toml"))
        .stdin(Stdio::null())
        .output()
        .context("Failed to run english-coach")?;

    assert!(!output.status.success());
    Ok(())
}
