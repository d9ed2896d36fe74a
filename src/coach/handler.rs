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

//! Request dispatcher mapping MCP requests onto notes, prompts and the coach.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

use super::catalog::{
    NOTE_HOST, NOTE_MIME_TYPE, NOTE_SCHEME, PromptRequest, SummaryStyle, ToolRequest,
    VerifyInput, prompt_kinds, resource_kinds, tool_kinds,
};
use super::{ChangeNotifier, NoteStore};
use crate::completion::CompletionGateway;
use crate::error::DispatchError;
use crate::mcp::{
    CallToolResult, GetPromptResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    PromptMessage, ReadResourceResult, RequestHandler, Resource, ResourceContents,
};

/// Characters escaped when a note name becomes a URI path segment.
const NOTE_NAME_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Fixed `/help` text.
const HELP_TEXT: &str = "Available commands:
- `/translate 中文文本` - Translate Chinese to idiomatic English
- `/check 英文文本` - Check English grammar and provide improvement suggestions
- `/verify 英文文本
中文:中文文本` - Verify if English accurately expresses Chinese meaning
- `/help` - Display all available commands";

/// Dispatches MCP requests for the coaching endpoint.
pub struct CoachHandler<G> {
    notes: NoteStore,
    gateway: G,
    notifier: ChangeNotifier,
}

impl<G: CompletionGateway> CoachHandler<G> {
    /// Creates a new `CoachHandler`.
    pub const fn new(notes: NoteStore, gateway: G, notifier: ChangeNotifier) -> Self {
        Self {
            notes,
            gateway,
            notifier,
        }
    }

    /// The note store this handler reads and writes.
    pub const fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Asks the gateway for a reply, rendering failures as reply text.
    async fn coach_reply(&self, prompt: &str) -> String {
        match self.gateway.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(category = e.category().as_str(), "Completion failed: {e}");
                format!("Error calling completion service: {e}")
            }
        }
    }

    fn summarize(&self, style: SummaryStyle) -> GetPromptResult {
        let detail = match style {
            SummaryStyle::Brief => "",
            SummaryStyle::Detailed => " Give extensive details.",
        };
        let lines = self
            .notes
            .entries()
            .iter()
            .map(|note| format!("- {}: {}", note.name, note.content))
            .collect::<Vec<_>>()
            .join("\n");

        GetPromptResult {
            description: Some("Summarize the current notes".to_string()),
            messages: vec![PromptMessage::user(format!(
                "Here are the current notes to summarize:{detail}\n\n{lines}"
            ))],
        }
    }
}

impl<G: CompletionGateway> RequestHandler for CoachHandler<G> {
    fn list_resources(&self) -> ListResourcesResult {
        let resources = self
            .notes
            .list()
            .into_iter()
            .map(|name| Resource {
                uri: note_uri(&name),
                description: Some(format!("A simple note named {name}")),
                mime_type: Some(NOTE_MIME_TYPE.to_string()),
                name: format!("Note: {name}"),
            })
            .collect();

        ListResourcesResult { resources }
    }

    fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, DispatchError> {
        let name = note_name_from_uri(uri)?;
        let text = self.notes.get(&name)?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: Some(NOTE_MIME_TYPE.to_string()),
                text,
            }],
        })
    }

    fn list_prompts(&self) -> ListPromptsResult {
        ListPromptsResult {
            prompts: prompt_kinds(),
        }
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, DispatchError> {
        let request = PromptRequest::parse(name, arguments.as_ref())?;
        debug!("Rendering prompt {}", request.kind().name());

        let result = match request {
            PromptRequest::SummarizeNotes { style } => self.summarize(style),
            PromptRequest::Translate { text: None } => guidance(
                "Translate Chinese to English",
                "Please provide Chinese text to translate.",
            ),
            PromptRequest::Translate { text: Some(text) } => {
                let reply = self
                    .coach_reply(&format!(
                        "As my English coach, please translate the following Chinese text to \
                         natural, idiomatic English. Then follow our interaction rules to provide \
                         alternative expressions, usage scenarios, and learning tips: {text}"
                    ))
                    .await;
                exchange(
                    "Chinese to English Translation",
                    format!("Original Chinese: {text}"),
                    reply,
                )
            }
            PromptRequest::Check { text: None } => guidance(
                "Check English grammar",
                "Please provide English text to check.",
            ),
            PromptRequest::Check { text: Some(text) } => {
                let reply = self
                    .coach_reply(&format!(
                        "Please check the grammar and phrasing of this English text and provide \
                         improvement suggestions: {text}"
                    ))
                    .await;
                exchange(
                    "English Grammar Check",
                    format!("Original text: {text}"),
                    reply,
                )
            }
            PromptRequest::Verify(None) => guidance(
                "Verify English translation",
                "Please provide the English text followed by Chinese text in the format: \
                 'English text\\n中文:Chinese text'",
            ),
            PromptRequest::Verify(Some(VerifyInput { english, chinese })) => {
                let reply = self
                    .coach_reply(&format!(
                        "Please verify if this English text accurately expresses the meaning of \
                         the Chinese text:\n\nEnglish: {english}\n\nChinese: {chinese}"
                    ))
                    .await;
                exchange(
                    "Translation Verification",
                    format!("English: {english}\nChinese: {chinese}"),
                    reply,
                )
            }
            PromptRequest::Help => GetPromptResult {
                description: Some("Help Information".to_string()),
                messages: vec![PromptMessage::assistant(HELP_TEXT)],
            },
        };

        Ok(result)
    }

    fn list_tools(&self) -> ListToolsResult {
        ListToolsResult { tools: tool_kinds() }
    }

    fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<CallToolResult, DispatchError> {
        match ToolRequest::parse(name, arguments.as_ref())? {
            ToolRequest::AddNote { name, content } => {
                let confirmation = format!("Added note '{name}' with content: {content}");
                info!("Storing note '{name}'");
                self.notes.put(name, content);
                self.notifier.notify_resources_changed();
                Ok(CallToolResult::text(confirmation))
            }
        }
    }
}

/// A single user message asking for missing input.
fn guidance(description: &str, text: &str) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.to_string()),
        messages: vec![PromptMessage::user(text)],
    }
}

/// The user's input echoed back, followed by the coach's reply.
fn exchange(description: &str, echo: String, reply: String) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.to_string()),
        messages: vec![PromptMessage::user(echo), PromptMessage::assistant(reply)],
    }
}

/// Builds the `note://internal/<name>` URI for a note.
pub fn note_uri(name: &str) -> String {
    format!(
        "{NOTE_SCHEME}://{NOTE_HOST}/{}",
        utf8_percent_encode(name, NOTE_NAME_ESCAPES)
    )
}

/// Extracts the note name from a `note://` URI.
///
/// # Errors
///
/// - [`DispatchError::InvalidUri`] if `uri` does not parse or decodes to invalid UTF-8.
/// - [`DispatchError::UnsupportedScheme`] if no resource kind serves the scheme.
pub fn note_name_from_uri(uri: &str) -> Result<String, DispatchError> {
    let invalid = |reason: String| DispatchError::InvalidUri {
        uri: uri.to_string(),
        reason,
    };

    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    if !resource_kinds()
        .iter()
        .any(|kind| kind.scheme == parsed.scheme())
    {
        return Err(DispatchError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    // Url normalises dot segments away, so the name comes from the raw text
    let after_scheme = uri.split_once(':').map_or("", |(_, rest)| rest);
    let hierarchy = after_scheme.split(['?', '#']).next().unwrap_or_default();
    let path = match hierarchy.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map_or("", |start| &authority_and_path[start..]),
        None => hierarchy,
    };

    percent_decode_str(path.trim_start_matches('/'))
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| invalid(e.to_string()))
}
