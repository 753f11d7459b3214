//! Newline-delimited JSON-RPC loop over stdio

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::protocol::{
    tool_result, JsonRpcError, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};
use super::tools::{tool_definitions, CallError, Tools};
use tenex_core::error::Result;
use tenex_core::relay::{EventPublisher, EventSource};

const SERVER_NAME: &str = "tenex-tools";

pub struct McpServer<R> {
    tools: Tools<R>,
}

impl<R: EventSource + EventPublisher> McpServer<R> {
    pub fn new(tools: Tools<R>) -> Self {
        Self { tools }
    }

    /// Serve requests from `input` until EOF.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                writeln!(output, "{}", serde_json::to_string(&response)?)?;
                output.flush()?;
            }
        }
        tracing::info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Response for one line, or `None` for notifications.
    pub fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse request");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        let result = self.dispatch(&request.method, request.params);
        let id = request.id?;
        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn dispatch(&mut self, method: &str, params: Value) -> std::result::Result<Value, JsonRpcError> {
        tracing::debug!(method, "request");
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
            })),
            "notifications/initialized" | "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions(&self.tools.config) })),
            "tools/call" => self.call_tool(params),
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    fn call_tool(&mut self, params: Value) -> std::result::Result<Value, JsonRpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing tool name"))?
            .to_string();
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        match self.tools.call(&name, arguments) {
            Ok(text) => Ok(tool_result(text, false)),
            Err(CallError::InvalidParams(message)) => {
                Err(JsonRpcError::new(INVALID_PARAMS, message))
            }
            Err(CallError::Failed(e)) => {
                tracing::error!(tool = %name, error = %e, "tool failed");
                Ok(tool_result(format!("Error: {}", e), true))
            }
        }
    }
}
