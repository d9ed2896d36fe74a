//! MCP server implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, trace, warn};

use super::types::{
    CallToolParams, CallToolResult, GetPromptParams, GetPromptResult, INTERNAL_ERROR,
    INVALID_PARAMS, INVALID_REQUEST, InitializeParams, InitializeResult, ListChangedCapability,
    ListPromptsResult, ListResourcesResult, ListToolsResult, METHOD_NOT_FOUND, Notification,
    PROTOCOL_VERSION, ReadResourceParams, ReadResourceResult, Request, RequestId,
    ResourcesCapability, Response, ServerCapabilities, ServerInfo,
};
use crate::error::DispatchError;

/// Name advertised in `serverInfo`.
pub const SERVER_NAME: &str = "english-mcp";

/// Trait for handling MCP resource, prompt and tool requests.
pub trait RequestHandler: Send + Sync {
    /// Returns the resources currently available.
    fn list_resources(&self) -> ListResourcesResult;

    /// Reads the resource at `uri`.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the URI is unusable or names nothing.
    fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, DispatchError>;

    /// Returns the available prompts.
    fn list_prompts(&self) -> ListPromptsResult;

    /// Renders the prompt `name` with `arguments`.
    fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> impl Future<Output = Result<GetPromptResult, DispatchError>> + Send;

    /// Returns the available tools.
    fn list_tools(&self) -> ListToolsResult;

    /// Handles a tool call and returns the result.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the tool is unknown or its arguments invalid.
    fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<CallToolResult, DispatchError>;
}

/// MCP server that speaks newline-delimited JSON-RPC.
pub struct McpServer<H: RequestHandler> {
    handler: H,
    notifications: UnboundedReceiver<Notification>,
    initialized: bool,
}

impl<H: RequestHandler> McpServer<H> {
    /// Creates a server; `notifications` is drained after every message.
    pub const fn new(handler: H, notifications: UnboundedReceiver<Notification>) -> Self {
        Self {
            handler,
            notifications,
            initialized: false,
        }
    }

    /// Whether the client has sent `notifications/initialized`.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Runs the MCP server, reading from stdin and writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout fails.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serves requests from `reader` until EOF, writing to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server starting, waiting for requests on stdin");

        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        {
            if line.trim().is_empty() {
                continue;
            }

            trace!("Received: {}", line);

            let outcome = self.handle_message(&line).await;

            // Notifications raised while handling go out before the response.
            self.flush_notifications(&mut writer).await?;

            match outcome {
                Ok(Some(response)) => write_message(&mut writer, &response).await?,
                Ok(None) => {
                    // Notification, no response needed
                }
                Err(e) => {
                    error!("Error handling message: {e:#}");
                }
            }
        }

        info!("MCP server shutting down (stdin closed)");
        Ok(())
    }

    async fn flush_notifications<W: AsyncWrite + Unpin>(&mut self, writer: &mut W) -> Result<()> {
        while let Ok(notification) = self.notifications.try_recv() {
            debug!("Sending notification: {}", notification.method);
            write_message(writer, &notification).await?;
        }
        Ok(())
    }

    async fn handle_message(&mut self, line: &str) -> Result<Option<Response>> {
        let message: Value = serde_json::from_str(line).context("Message is not valid JSON")?;

        // Requests carry an id, notifications don't
        if let Some(raw_id) = message.get("id").cloned() {
            let request: Request = match serde_json::from_value(message) {
                Ok(request) => request,
                Err(e) => {
                    // Answer malformed requests when the id is still recoverable
                    let id: RequestId = serde_json::from_value(raw_id)
                        .with_context(|| format!("Malformed JSON-RPC request: {e}"))?;
                    warn!("Malformed request {id:?}: {e}");
                    return Ok(Some(Response::error(
                        id,
                        INVALID_REQUEST,
                        format!("Invalid request: {e}"),
                    )));
                }
            };
            let id = request.id.clone();
            let response = match self.handle_request(request).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Request failed: {e:#}");
                    Response::error(id, INTERNAL_ERROR, e.to_string())
                }
            };
            return Ok(Some(response));
        }

        let notification: Notification =
            serde_json::from_value(message).context("Malformed JSON-RPC notification")?;
        self.handle_notification(&notification);
        Ok(None)
    }

    async fn handle_request(&self, request: Request) -> Result<Response> {
        debug!("Handling request: {} (id={:?})", request.method, request.id);

        let Request {
            id, method, params, ..
        } = request;

        match method.as_str() {
            "initialize" => self.handle_initialize(id, params),
            "ping" => Ok(Response::success(id, serde_json::json!({}))?),
            "resources/list" => {
                let result = self.handler.list_resources();
                debug!("Listing {} resources", result.resources.len());
                Ok(Response::success(id, result)?)
            }
            "resources/read" => {
                let params: ReadResourceParams = match parse_params(&method, params) {
                    Ok(p) => p,
                    Err(message) => return Ok(Response::error(id, INVALID_PARAMS, message)),
                };
                debug!("Reading resource: {}", params.uri);
                reply(id, self.handler.read_resource(&params.uri))
            }
            "prompts/list" => Ok(Response::success(id, self.handler.list_prompts())?),
            "prompts/get" => {
                let params: GetPromptParams = match parse_params(&method, params) {
                    Ok(p) => p,
                    Err(message) => return Ok(Response::error(id, INVALID_PARAMS, message)),
                };
                debug!("Getting prompt: {}", params.name);
                reply(
                    id,
                    self.handler.get_prompt(&params.name, params.arguments).await,
                )
            }
            "tools/list" => {
                let result = self.handler.list_tools();
                debug!("Listing {} tools", result.tools.len());
                Ok(Response::success(id, result)?)
            }
            "tools/call" => {
                let params: CallToolParams = match parse_params(&method, params) {
                    Ok(p) => p,
                    Err(message) => return Ok(Response::error(id, INVALID_PARAMS, message)),
                };
                debug!("Calling tool: {}", params.name);
                reply(id, self.handler.call_tool(&params.name, params.arguments))
            }
            _ => {
                warn!("Unknown method: {}", method);
                Ok(Response::error(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Unknown method: {method}"),
                ))
            }
        }
    }

    fn handle_notification(&mut self, notification: &Notification) {
        debug!("Handling notification: {}", notification.method);

        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("MCP client initialized");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            _ => {
                debug!("Ignoring unknown notification: {}", notification.method);
            }
        }
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> Result<Response> {
        let params: InitializeParams = match parse_params("initialize", params) {
            Ok(p) => p,
            Err(message) => return Ok(Response::error(id, INVALID_PARAMS, message)),
        };

        info!(
            "MCP client connecting: {} v{}",
            params.client_info.name,
            params.client_info.version.as_deref().unwrap_or("unknown")
        );
        info!("Protocol version: {}", params.protocol_version);

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: true,
                }),
                prompts: Some(ListChangedCapability {
                    list_changed: false,
                }),
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
        };

        Ok(Response::success(id, result)?)
    }
}

fn parse_params<T: DeserializeOwned>(method: &str, params: Option<Value>) -> Result<T, String> {
    let params = params.ok_or_else(|| format!("Missing {method} params"))?;
    serde_json::from_value(params).map_err(|e| format!("Invalid {method} params: {e}"))
}

fn reply<T: Serialize>(id: RequestId, result: Result<T, DispatchError>) -> Result<Response> {
    match result {
        Ok(value) => Ok(Response::success(id, value)?),
        Err(e) => {
            warn!("Request rejected: {e}");
            Ok(Response::error(id, e.code(), e.to_string()))
        }
    }
}

async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(message)?;
    trace!("Sending: {}", json);
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::{
        Prompt, RESOURCE_NOT_FOUND, RESOURCES_LIST_CHANGED, Resource, Tool,
    };
    use anyhow::anyhow;
    use tokio::sync::mpsc::{self, UnboundedSender};

    struct TestHandler {
        tx: UnboundedSender<Notification>,
    }

    impl RequestHandler for TestHandler {
        fn list_resources(&self) -> ListResourcesResult {
            ListResourcesResult {
                resources: vec![Resource {
                    uri: "note://internal/a".to_string(),
                    name: "Note: a".to_string(),
                    description: None,
                    mime_type: None,
                }],
            }
        }

        fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, DispatchError> {
            Err(DispatchError::NotFound(uri.to_string()))
        }

        fn list_prompts(&self) -> ListPromptsResult {
            ListPromptsResult {
                prompts: vec![Prompt {
                    name: "test_prompt".to_string(),
                    description: None,
                    arguments: Vec::new(),
                }],
            }
        }

        async fn get_prompt(
            &self,
            name: &str,
            _arguments: Option<HashMap<String, String>>,
        ) -> Result<GetPromptResult, DispatchError> {
            Err(DispatchError::UnknownPrompt(name.to_string()))
        }

        fn list_tools(&self) -> ListToolsResult {
            ListToolsResult {
                tools: vec![Tool {
                    name: "test_tool".to_string(),
                    description: Some("A test tool".to_string()),
                    input_schema: serde_json::json!({
                        "type": "object",
                        "properties": {}
                    }),
                }],
            }
        }

        fn call_tool(
            &self,
            name: &str,
            _arguments: Option<HashMap<String, String>>,
        ) -> Result<CallToolResult, DispatchError> {
            match name {
                "test_tool" => {
                    let _ = self.tx.send(Notification::new(RESOURCES_LIST_CHANGED));
                    Ok(CallToolResult::text("Test result"))
                }
                _ => Err(DispatchError::UnknownTool(name.to_string())),
            }
        }
    }

    fn server() -> McpServer<TestHandler> {
        let (tx, rx) = mpsc::unbounded_channel();
        McpServer::new(TestHandler { tx }, rx)
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> Request {
        Request {
            jsonrpc: "2.0".to_string(),
            id: RequestId::Number(id),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_handle_initialize() -> Result<()> {
        let server = server();

        let response = server
            .handle_request(request(
                1,
                "initialize",
                Some(serde_json::json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {
                        "name": "test-client",
                        "version": "1.0.0"
                    }
                })),
            ))
            .await?;
        assert!(response.error.is_none());

        let result: InitializeResult =
            serde_json::from_value(response.result.ok_or_else(|| anyhow!("no result"))?)?;
        assert_eq!(result.server_info.name, "english-mcp");
        assert!(result.capabilities.resources.is_some_and(|r| r.list_changed));
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_without_params_is_invalid() -> Result<()> {
        let server = server();
        let response = server.handle_request(request(1, "initialize", None)).await?;
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_PARAMS));
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_tools_list() -> Result<()> {
        let server = server();
        let response = server.handle_request(request(2, "tools/list", None)).await?;

        let result: ListToolsResult =
            serde_json::from_value(response.result.ok_or_else(|| anyhow!("no result"))?)?;
        assert_eq!(result.tools.len(), 1);
        assert_eq!(result.tools[0].name, "test_tool");
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_error_becomes_rpc_error() -> Result<()> {
        let server = server();

        let response = server
            .handle_request(request(
                3,
                "tools/call",
                Some(serde_json::json!({ "name": "delete-note" })),
            ))
            .await?;
        let error = response.error.ok_or_else(|| anyhow!("expected error"))?;
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: delete-note");

        let response = server
            .handle_request(request(
                4,
                "resources/read",
                Some(serde_json::json!({ "uri": "note://internal/x" })),
            ))
            .await?;
        assert_eq!(response.error.map(|e| e.code), Some(RESOURCE_NOT_FOUND));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_params_is_invalid() -> Result<()> {
        let server = server();
        let response = server.handle_request(request(5, "prompts/get", None)).await?;
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_PARAMS));
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_unknown_method() -> Result<()> {
        let server = server();
        let response = server
            .handle_request(request(6, "unknown/method", None))
            .await?;
        assert_eq!(response.error.map(|e| e.code), Some(METHOD_NOT_FOUND));
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_ping() -> Result<()> {
        let server = server();
        let response = server.handle_request(request(7, "ping", None)).await?;
        assert!(response.result.is_some());
        assert!(response.error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_serve_writes_notification_before_response() -> Result<()> {
        let mut server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            "not json\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"test_tool"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        server.serve(input.as_bytes(), &mut output).await?;
        assert!(server.is_initialized());

        let lines: Vec<Value> = String::from_utf8(output)?
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["method"], RESOURCES_LIST_CHANGED);
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["result"]["content"][0]["text"], "Test result");
        assert_eq!(lines[2]["id"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_serve_answers_request_without_method() -> Result<()> {
        let mut server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":5}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        server.serve(input.as_bytes(), &mut output).await?;

        let lines: Vec<Value> = String::from_utf8(output)?
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 5);
        assert_eq!(lines[0]["error"]["code"], INVALID_REQUEST);
        assert_eq!(lines[1]["id"], 6);
        assert!(lines[1]["result"].is_object());
        Ok(())
    }
}
