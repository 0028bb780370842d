//! Stdio MCP server loop.
//!
//! Frames are newline-delimited JSON. Requests are handled one at a time:
//! a response line is written before the next frame is read. Frames are
//! read as raw bytes so a line that is not UTF-8 gets a parse error
//! instead of closing the channel.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{
    AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead, FramedWrite, LinesCodec,
    LinesCodecError,
};
use tracing::{debug, info, warn};
use workbench_application::{DispatchToolUseCase, ToolSchemaPort};
use workbench_domain::{ServerKind, ToolCall, ToolError, ToolResult};

use super::protocol::{
    CallToolParams, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, RpcError, error_codes,
};

/// Fatal channel failures; the process exits on these
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Failed to read from channel: {0}")]
    Read(#[from] AnyDelimiterCodecError),
    #[error("Failed to write to channel: {0}")]
    Write(#[from] LinesCodecError),
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One MCP server: a single catalog behind the dispatcher.
pub struct McpServer {
    kind: ServerKind,
    dispatcher: DispatchToolUseCase,
    schema: Arc<dyn ToolSchemaPort>,
}

impl McpServer {
    pub fn new(
        kind: ServerKind,
        dispatcher: DispatchToolUseCase,
        schema: Arc<dyn ToolSchemaPort>,
    ) -> Self {
        Self {
            kind,
            dispatcher,
            schema,
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), McpError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut frames = FramedRead::new(
            reader,
            AnyDelimiterCodec::new(b"\n".to_vec(), b"\n".to_vec()),
        );
        let mut sink = FramedWrite::new(writer, LinesCodec::new());

        info!(
            server = %self.kind,
            tools = self.dispatcher.tool_executor().tool_spec().len(),
            "MCP server ready on stdio"
        );

        while let Some(frame) = frames.next().await {
            let frame = frame?;
            let response = match std::str::from_utf8(&frame) {
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!(error = %e, "Frame is not valid UTF-8");
                    Some(JsonRpcResponse::error(Value::Null, RpcError::parse_error(e)))
                }
            };
            if let Some(response) = response {
                sink.send(serde_json::to_string(&response)?).await?;
            }
        }

        info!(server = %self.kind, "Input closed, shutting down");
        Ok(())
    }

    /// Handle one frame. Notifications and blank lines produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Unparsable frame");
                return Some(JsonRpcResponse::error(Value::Null, RpcError::parse_error(e)));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => return Some(JsonRpcResponse::error(id, RpcError::invalid_request(e))),
        };

        if request.is_notification() {
            debug!(method = %request.method, "Ignoring notification");
            return None;
        }

        let response = match self.handle_request(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Some(response)
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> Result<Value, RpcError> {
        debug!(method = %request.method, "Handling request");
        match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": self.kind.server_name(),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "ping" => Ok(json!({})),
            "tools/list" => {
                let spec = self.dispatcher.tool_executor().tool_spec();
                Ok(json!({ "tools": self.schema.all_tools_schema(spec) }))
            }
            "tools/call" => self.call_tool(request.params.clone()).await,
            other => Err(RpcError::method_not_found(other)),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| RpcError::invalid_params("tools/call requires params"))
            .and_then(|p| serde_json::from_value(p).map_err(RpcError::invalid_params))?;

        let result = match ToolCall::from_json(&params.name, params.arguments) {
            Ok(call) => self.dispatcher.execute(&call).await,
            Err(message) => ToolResult::from_outcome(Err(ToolError::invalid_argument(message))),
        };

        serde_json::to_value(&result)
            .map_err(|e| RpcError::new(error_codes::INTERNAL_ERROR, format!("Internal error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use workbench_application::ToolExecutorPort;
    use workbench_domain::{
        RiskLevel, ShapeType, ToolDefinition, ToolOutput, ToolParameter, ToolSpec,
    };

    struct EchoExecutor {
        spec: ToolSpec,
    }

    #[async_trait]
    impl ToolExecutorPort for EchoExecutor {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
            match call.get_string("text") {
                Some(text) => Ok(ToolOutput::text(text)),
                None => Err(ToolError::execution_failed("nothing to echo")),
            }
        }
    }

    struct NameOnlySchema;

    impl ToolSchemaPort for NameOnlySchema {
        fn tool_to_schema(&self, tool: &ToolDefinition) -> Value {
            json!({ "name": tool.name, "readOnly": tool.risk_level.is_read_only() })
        }
    }

    fn server() -> McpServer {
        let spec = ToolSpec::from_definitions([
            ToolDefinition::new("echo", "Echo text", RiskLevel::Low)
                .with_parameter(ToolParameter::new("text", "Text", false))
                .with_parameter(
                    ToolParameter::new("times", "Repeat", false).with_type(ShapeType::Integer),
                ),
            ToolDefinition::new("wipe", "Destructive", RiskLevel::High),
        ])
        .unwrap();
        let dispatcher = DispatchToolUseCase::new(Arc::new(EchoExecutor { spec }));
        McpServer::new(ServerKind::Git, dispatcher, Arc::new(NameOnlySchema))
    }

    async fn roundtrip(line: &str) -> Value {
        let response = server().handle_line(line).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).await;
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(resp["result"]["serverInfo"]["name"], "workbench-git");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_in_registration_order() {
        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":"x","method":"tools/list"}"#).await;
        assert_eq!(
            resp["result"]["tools"],
            json!([
                {"name": "echo", "readOnly": true},
                {"name": "wipe", "readOnly": false},
            ])
        );
    }

    #[tokio::test]
    async fn test_tools_call_envelopes() {
        let ok = roundtrip(
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
        )
        .await;
        assert_eq!(
            ok["result"],
            json!({"content": [{"type": "text", "text": "hi"}], "isError": false})
        );

        let failed = roundtrip(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{}}}"#,
        )
        .await;
        assert_eq!(failed["result"]["isError"], true);
        assert_eq!(
            failed["result"]["content"][0]["text"],
            "Error: nothing to echo"
        );

        let unknown = roundtrip(
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;
        assert_eq!(unknown["result"]["isError"], true);
        assert!(unknown.get("error").is_none());
    }

    #[tokio::test]
    async fn test_non_object_arguments_are_invalid() {
        let resp = roundtrip(
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"echo","arguments":[1]}}"#,
        )
        .await;
        assert_eq!(resp["result"]["isError"], true);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("arguments must be a JSON object"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let resp = roundtrip("{not json").await;
        assert_eq!(resp["error"]["code"], -32700);
        assert_eq!(resp["id"], Value::Null);

        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#).await;
        assert_eq!(resp["error"]["code"], -32601);
        assert_eq!(resp["id"], 6);

        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":7,"method":"tools/call"}"#).await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_notifications_and_blank_lines_are_silent() {
        let server = server();
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(server.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"echo","arguments":{"text":"a"}}}"#,
            "\r\n",
        );
        let mut output = Vec::new();
        server().serve(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["result"], json!({}));
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["result"]["content"][0]["text"], "a");
    }

    #[tokio::test]
    async fn test_serve_answers_undecodable_frame_and_keeps_reading() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let mut output = Vec::new();
        server().serve(input.as_slice(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], -32700);
        assert_eq!(lines[0]["id"], Value::Null);
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["result"], json!({}));
    }
}
