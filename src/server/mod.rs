//! MCP stdio server
//!
//! Provides:
//! - Newline-delimited JSON-RPC over any reader/writer pair
//! - `initialize`, `tools/list`, `tools/call`, `ping`
//! - Per-call cancellation via `notifications/cancelled` and on input EOF
//!
//! Every `tools/call` runs as its own task. Responses are funnelled through a
//! channel to a single writer task so lines never interleave. A call whose id
//! matches one still in flight is rejected with `-32600`.

pub mod messages;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

use crate::error::{GmapsError, Result};
use crate::invoker::CancellationToken;
use crate::tools::{InvocationRequest, ToolContext, ToolRegistry, ToolResponse};
pub use messages::{ErrorCode, RpcError, RpcRequest, RpcResponse};

pub const SERVER_NAME: &str = "gmaps-mcp";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

type InFlight = Arc<Mutex<HashMap<String, CancellationToken>>>;

/// Tool server bound to a registry and a shared tool context
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    ctx: ToolContext,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, ctx: ToolContext) -> Self {
        Self {
            registry: Arc::new(registry),
            ctx,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve until `reader` hits EOF, then cancel and drain in-flight calls.
    ///
    /// Returns the writer once every response has been flushed.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<W>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<RpcResponse>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let inflight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let mut tasks = JoinSet::new();
        let mut lines = BufReader::new(reader).lines();

        log::info!("server_started tools={}", self.registry.len());

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        self.handle_line(trimmed, &tx, &inflight, &mut tasks).await;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("stdin_read_failed error={}", e);
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        log::error!("tool_task_failed error={}", e);
                    }
                }
            }
        }

        log::info!("input_closed inflight={}", tasks.len());
        for token in inflight.lock().await.values() {
            token.cancel();
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                log::error!("tool_task_failed error={}", e);
            }
        }

        drop(tx);
        let writer = writer_task
            .await
            .map_err(|e| GmapsError::Server(format!("Writer task failed: {}", e)))??;

        log::info!("server_stopped");
        Ok(writer)
    }

    async fn handle_line(
        &self,
        line: &str,
        tx: &mpsc::UnboundedSender<RpcResponse>,
        inflight: &InFlight,
        tasks: &mut JoinSet<()>,
    ) {
        let request = match messages::parse_line(line) {
            Ok(request) => request,
            Err(response) => {
                log::warn!("bad_request error={:?}", response.error);
                send(tx, response);
                return;
            }
        };

        let Some(id) = request.id.clone() else {
            self.handle_notification(&request, inflight).await;
            return;
        };

        log::debug!("request method={} id={}", request.method, id);

        match request.method.as_str() {
            "initialize" => send(tx, RpcResponse::success(id, initialize_result(&request.params))),
            "ping" => send(tx, RpcResponse::success(id, json!({}))),
            "tools/list" => {
                let tools: Vec<Value> = self.registry.definitions().iter().map(|d| d.to_rpc_schema()).collect();
                send(tx, RpcResponse::success(id, json!({"tools": tools})));
            }
            "tools/call" => match call_params(&request.params) {
                Ok(invocation) => self.spawn_call(id, invocation, tx, inflight, tasks).await,
                Err(error) => send(tx, RpcResponse::error(id, error)),
            },
            other => send(tx, RpcResponse::error(id, RpcError::method_not_found(other))),
        }
    }

    async fn handle_notification(&self, request: &RpcRequest, inflight: &InFlight) {
        match request.method.as_str() {
            "notifications/cancelled" => {
                let Some(request_id) = request.params.get("requestId") else {
                    return;
                };
                if let Some(token) = inflight.lock().await.get(&request_key(request_id)) {
                    log::info!("request_cancelled id={}", request_id);
                    token.cancel();
                }
            }
            other => log::debug!("notification_ignored method={}", other),
        }
    }

    async fn spawn_call(
        &self,
        id: Value,
        invocation: InvocationRequest,
        tx: &mpsc::UnboundedSender<RpcResponse>,
        inflight: &InFlight,
        tasks: &mut JoinSet<()>,
    ) {
        let key = request_key(&id);
        let token = CancellationToken::new();
        {
            let mut inflight = inflight.lock().await;
            if inflight.contains_key(&key) {
                log::warn!("duplicate_request id={}", id);
                let message = format!("Request id {} is already in flight", key);
                send(tx, RpcResponse::error(id, RpcError::invalid_request(message)));
                return;
            }
            inflight.insert(key.clone(), token.clone());
        }

        let registry = Arc::clone(&self.registry);
        let ctx = self.ctx.with_cancel(token);
        let tx = tx.clone();
        let inflight = Arc::clone(inflight);

        tasks.spawn(async move {
            let response = registry.dispatch(invocation, &ctx).await;
            inflight.lock().await.remove(&key);
            send(&tx, RpcResponse::success(id, call_result(&response)));
        });
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<RpcResponse>) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let line = serde_json::to_string(&response)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(writer)
}

fn send(tx: &mpsc::UnboundedSender<RpcResponse>, response: RpcResponse) {
    if tx.send(response).is_err() {
        log::warn!("response_dropped reason=writer_closed");
    }
}

/// Map key for a request id (`7` and `"7"` stay distinct)
fn request_key(id: &Value) -> String {
    id.to_string()
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {"tools": {}},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn call_params(params: &Value) -> std::result::Result<InvocationRequest, RpcError> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("tools/call requires a string 'name'"))?;

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(args @ Value::Object(_)) => args.clone(),
        Some(_) => return Err(RpcError::invalid_params("tools/call 'arguments' must be an object")),
    };

    Ok(InvocationRequest::new(name, arguments))
}

/// Wrap an envelope as MCP tool-call content
fn call_result(response: &ToolResponse) -> Value {
    json!({
        "content": [{"type": "text", "text": response.to_json_pretty()}],
        "isError": !response.is_success()
    })
}
