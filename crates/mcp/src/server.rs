use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Local;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};
use vault_rest_core::VaultBackend;

use crate::tools::{call_tool, list_tools};
use crate::transport::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

const SERVER_NAME: &str = "vault-rest-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

pub const INSTRUCTIONS_PROMPT: &str = "instructions";
pub const LOG_RESOURCE_URI: &str = "file:///mcpserver.log";

const INSTRUCTIONS: &str = include_str!("instructions.txt");

pub struct McpServer {
    backend: Arc<dyn VaultBackend>,
    instructions: String,
    log_file: Option<PathBuf>,
    in_flight: Mutex<HashMap<String, AbortHandle>>,
}

impl McpServer {
    pub fn new(backend: Arc<dyn VaultBackend>) -> Self {
        let instructions = format!(
            "{}\n\nThe current date is: {}",
            INSTRUCTIONS.trim_end(),
            Local::now().format("%Y-%m-%d")
        );

        Self {
            backend,
            instructions,
            log_file: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Expose the server log as a readable resource.
    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    /// Handle one line of input and return the serialized response, if any.
    pub async fn handle_request(&self, input: &str) -> Option<String> {
        let response = match parse_request(input) {
            Ok(request) => self.handle_message(request).await?,
            Err(response) => response,
        };
        Some(encode(&response))
    }

    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "handling request");

        let id = request.id.clone();
        let notification = request.is_notification();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => {
                info!("client initialized");
                return None;
            }
            "notifications/cancelled" => {
                self.cancel(request.params.as_ref());
                return None;
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": list_tools() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "prompts/list" => self.handle_prompts_list(id),
            "prompts/get" => self.handle_prompts_get(id, request.params),
            "resources/list" => self.handle_resources_list(id),
            "resources/read" => self.handle_resources_read(id, request.params).await,
            method if method.starts_with("notifications/") => return None,
            method => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        };

        if notification {
            return None;
        }
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("MCP server initializing");

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "prompts": {},
                    "resources": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                },
                "instructions": self.instructions
            }),
        )
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name,
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name"),
        };

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        let result = call_tool(self.backend.as_ref(), name, arguments).await;

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    fn handle_prompts_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "prompts": [{
                    "name": INSTRUCTIONS_PROMPT,
                    "description": "How to use the vault tools"
                }]
            }),
        )
    }

    fn handle_prompts_get(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let name = params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        if name != INSTRUCTIONS_PROMPT {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown prompt: {}", name));
        }

        JsonRpcResponse::success(
            id,
            json!({
                "description": INSTRUCTIONS_PROMPT,
                "messages": [{
                    "role": "user",
                    "content": { "type": "text", "text": self.instructions }
                }]
            }),
        )
    }

    fn handle_resources_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let resources: Vec<Value> = self
            .log_file
            .iter()
            .map(|_| {
                json!({
                    "uri": LOG_RESOURCE_URI,
                    "name": "server log",
                    "mimeType": "text/plain"
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "resources": resources }))
    }

    async fn handle_resources_read(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let path = match (&self.log_file, uri) {
            (Some(path), LOG_RESOURCE_URI) => path,
            _ => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown resource: {}", uri))
            }
        };

        match tokio::fs::read_to_string(path).await {
            Ok(text) => JsonRpcResponse::success(
                id,
                json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": "text/plain",
                        "text": text
                    }]
                }),
            ),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read log file");
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("failed to read log file: {}", e))
            }
        }
    }

    fn cancel(&self, params: Option<&Value>) {
        let Some(request_id) = params.and_then(|p| p.get("requestId")) else {
            warn!("cancellation without requestId");
            return;
        };

        let key = request_id.to_string();
        let handle = self.in_flight.lock().ok().and_then(|mut m| m.remove(&key));
        match handle {
            Some(handle) => {
                handle.abort();
                info!(request_id = %key, "cancelled in-flight request");
            }
            None => debug!(request_id = %key, "nothing to cancel"),
        }
    }

    fn finish(&self, key: &str) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(key);
        }
    }

    /// Number of tool calls currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted.
    ///
    /// Tool calls run as their own tasks so that `notifications/cancelled`
    /// can abort them while other requests keep flowing.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_lines(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!(%line, "received");

            let request = match parse_request(&line) {
                Ok(request) => request,
                Err(response) => {
                    let _ = tx.send(encode(&response));
                    continue;
                }
            };

            if request.method == "tools/call" {
                if let Some(id) = request.id.clone() {
                    self.spawn_call(id, request, tx.clone());
                    continue;
                }
            }

            if let Some(response) = self.handle_message(request).await {
                let _ = tx.send(encode(&response));
            }
        }

        drop(tx);
        writer_task.await??;
        info!("input closed, server stopping");
        Ok(())
    }

    fn spawn_call(
        self: &Arc<Self>,
        id: Value,
        request: JsonRpcRequest,
        tx: mpsc::UnboundedSender<String>,
    ) {
        let key = id.to_string();
        let server = Arc::clone(self);

        // Hold the table while spawning so the task cannot finish before it is registered.
        let Ok(mut in_flight) = self.in_flight.lock() else {
            error!("in-flight table poisoned");
            return;
        };

        if in_flight.contains_key(&key) {
            warn!(request_id = %key, "request id already in flight");
            let response = JsonRpcResponse::error(
                Some(id),
                INVALID_REQUEST,
                format!("Request id {} is already in use", key),
            );
            let _ = tx.send(encode(&response));
            return;
        }

        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let response = server.handle_message(request).await;
            server.finish(&task_key);
            if let Some(response) = response {
                let _ = tx.send(encode(&response));
            }
        });

        in_flight.insert(key, handle.abort_handle());
    }
}

fn parse_request(input: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(input).map_err(|e| {
        warn!(error = %e, "unparseable message");
        JsonRpcResponse::error(None, PARSE_ERROR, "Parse error")
    })?;

    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid request: {}", e))
    })
}

fn encode(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!(error = %e, "failed to encode response");
        format!(
            r#"{{"jsonrpc":"2.0","error":{{"code":{},"message":"failed to encode response"}},"id":null}}"#,
            INTERNAL_ERROR
        )
    })
}

async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        debug!(%line, "sending");
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
