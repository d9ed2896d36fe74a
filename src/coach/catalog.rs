// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Static descriptors for every resource, prompt and tool kind, plus the
//! validation that turns raw argument maps into typed requests.

use std::collections::HashMap;

use crate::error::DispatchError;
use crate::mcp::{Prompt, PromptArgument, Tool};

/// URI scheme of note resources.
pub const NOTE_SCHEME: &str = "note";
/// Authority part of note resource URIs.
pub const NOTE_HOST: &str = "internal";
/// MIME type of note content.
pub const NOTE_MIME_TYPE: &str = "text/plain";
/// Separator between the English and Chinese halves of a `/verify` input.
pub const VERIFY_SEPARATOR: &str = "\n中文:";

/// Raw argument map as received from the client.
pub type Arguments = HashMap<String, String>;

/// A kind of resource the endpoint can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// URI scheme that selects this kind.
    pub scheme: &'static str,
    /// MIME type of its content.
    pub mime_type: &'static str,
}

/// Every resource kind, currently only notes.
#[must_use]
pub const fn resource_kinds() -> &'static [ResourceKind] {
    &[ResourceKind {
        scheme: NOTE_SCHEME,
        mime_type: NOTE_MIME_TYPE,
    }]
}

/// Every prompt the endpoint offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Summarise all notes.
    SummarizeNotes,
    /// Chinese to idiomatic English.
    Translate,
    /// English grammar review.
    Check,
    /// Does the English say what the Chinese says.
    Verify,
    /// List the slash commands.
    Help,
}

impl PromptKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 5] = [
        Self::SummarizeNotes,
        Self::Translate,
        Self::Check,
        Self::Verify,
        Self::Help,
    ];

    /// Name the client uses to request this prompt.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SummarizeNotes => "summarize-notes",
            Self::Translate => "/translate",
            Self::Check => "/check",
            Self::Verify => "/verify",
            Self::Help => "/help",
        }
    }

    /// Looks up a kind by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Discovery descriptor.
    #[must_use]
    pub fn descriptor(self) -> Prompt {
        let (description, arguments) = match self {
            Self::SummarizeNotes => (
                "Creates a summary of all notes",
                vec![argument(
                    "style",
                    "Style of the summary (brief/detailed)",
                    false,
                )],
            ),
            Self::Translate => (
                "Translate Chinese text to idiomatic English",
                vec![argument("text", "Chinese text to translate", true)],
            ),
            Self::Check => (
                "Check English grammar and provide improvement suggestions",
                vec![argument("text", "English text to check", true)],
            ),
            Self::Verify => (
                "Verify if English accurately represents Chinese meaning",
                vec![argument(
                    "text",
                    "English text followed by Chinese text (separated by '\\n中文:')",
                    true,
                )],
            ),
            Self::Help => ("Display all available commands", Vec::new()),
        };

        Prompt {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            arguments,
        }
    }
}

fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required,
    }
}

/// Every prompt descriptor, in display order.
#[must_use]
pub fn prompt_kinds() -> Vec<Prompt> {
    PromptKind::ALL.into_iter().map(PromptKind::descriptor).collect()
}

/// Every tool the endpoint offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Create or overwrite a note.
    AddNote,
}

impl ToolKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 1] = [Self::AddNote];

    /// Name the client uses to call this tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddNote => "add-note",
        }
    }

    /// Looks up a kind by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Discovery descriptor.
    #[must_use]
    pub fn descriptor(self) -> Tool {
        match self {
            Self::AddNote => Tool {
                name: self.name().to_string(),
                description: Some("Add a new note".to_string()),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "content": { "type": "string" }
                    },
                    "required": ["name", "content"]
                }),
            },
        }
    }
}

/// Every tool descriptor, in display order.
#[must_use]
pub fn tool_kinds() -> Vec<Tool> {
    ToolKind::ALL.into_iter().map(ToolKind::descriptor).collect()
}

/// How much detail `summarize-notes` asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryStyle {
    /// The default.
    #[default]
    Brief,
    /// Ask for extensive details.
    Detailed,
}

/// A validated `/verify` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyInput {
    /// Text before the separator, trimmed.
    pub english: String,
    /// Text after the first separator, trimmed; may be empty.
    pub chinese: String,
}

impl VerifyInput {
    /// Splits `text` at the first [`VERIFY_SEPARATOR`].
    ///
    /// Returns `None` if the separator does not occur.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (english, chinese) = text.split_once(VERIFY_SEPARATOR)?;
        Some(Self {
            english: english.trim().to_string(),
            chinese: chinese.trim().to_string(),
        })
    }
}

/// A typed `prompts/get` request.
///
/// Missing or empty `text` is not an error: those prompts answer with
/// guidance instead, so it is carried as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    /// `summarize-notes`.
    SummarizeNotes {
        /// Requested detail.
        style: SummaryStyle,
    },
    /// `/translate`.
    Translate {
        /// Non-empty Chinese text.
        text: Option<String>,
    },
    /// `/check`.
    Check {
        /// Non-empty English text.
        text: Option<String>,
    },
    /// `/verify`; `None` when text is empty or lacks the separator.
    Verify(Option<VerifyInput>),
    /// `/help`.
    Help,
}

impl PromptRequest {
    /// Validates a prompt name and its arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownPrompt`] if no prompt has this name.
    pub fn parse(name: &str, arguments: Option<&Arguments>) -> Result<Self, DispatchError> {
        let kind =
            PromptKind::from_name(name).ok_or_else(|| DispatchError::UnknownPrompt(name.to_string()))?;
        let text = || non_empty(arguments, "text");

        Ok(match kind {
            PromptKind::SummarizeNotes => {
                let style = match arguments.and_then(|args| args.get("style")).map(String::as_str) {
                    Some("detailed") => SummaryStyle::Detailed,
                    _ => SummaryStyle::Brief,
                };
                Self::SummarizeNotes { style }
            }
            PromptKind::Translate => Self::Translate { text: text() },
            PromptKind::Check => Self::Check { text: text() },
            PromptKind::Verify => Self::Verify(text().as_deref().and_then(VerifyInput::parse)),
            PromptKind::Help => Self::Help,
        })
    }

    /// The kind this request belongs to.
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        match self {
            Self::SummarizeNotes { .. } => PromptKind::SummarizeNotes,
            Self::Translate { .. } => PromptKind::Translate,
            Self::Check { .. } => PromptKind::Check,
            Self::Verify(_) => PromptKind::Verify,
            Self::Help => PromptKind::Help,
        }
    }
}

/// A typed `tools/call` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    /// `add-note`.
    AddNote {
        /// Note name, non-empty.
        name: String,
        /// Note content, non-empty.
        content: String,
    },
}

impl ToolRequest {
    /// Validates a tool name and its arguments.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownTool`] if no tool has this name.
    /// - [`DispatchError::MissingArguments`] if the argument map is absent or empty.
    /// - [`DispatchError::MissingField`] if a required field is absent or empty.
    pub fn parse(name: &str, arguments: Option<&Arguments>) -> Result<Self, DispatchError> {
        let kind =
            ToolKind::from_name(name).ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        let arguments = arguments
            .filter(|args| !args.is_empty())
            .ok_or(DispatchError::MissingArguments)?;

        match kind {
            ToolKind::AddNote => Ok(Self::AddNote {
                name: required(arguments, "name")?,
                content: required(arguments, "content")?,
            }),
        }
    }
}

fn non_empty(arguments: Option<&Arguments>, field: &str) -> Option<String> {
    arguments
        .and_then(|args| args.get(field))
        .filter(|value| !value.is_empty())
        .cloned()
}

fn required(arguments: &Arguments, field: &'static str) -> Result<String, DispatchError> {
    non_empty(Some(arguments), field).ok_or(DispatchError::MissingField(field))
}
