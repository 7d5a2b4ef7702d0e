//! MCP stdio Server
//!
//! Reads one JSON-RPC message per line and writes one response per line.
//! Requests run as independent Tokio tasks, so a slow algorithm does not
//! hold up `ping` or a second tool call; responses may therefore arrive out
//! of order and are matched by id.

use crate::algorithms::AlgorithmRegistry;
use crate::mcp::handlers::{initialize, tools};
use crate::mcp::types::{MCPError, MCPNotification, MCPRequest, MCPResponse};
use crate::services::GdsService;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

/// Everything a request handler needs
#[derive(Clone)]
pub struct McpServices {
    pub gds: GdsService,
    pub registry: Arc<AlgorithmRegistry>,
}

/// Run the MCP server on stdin/stdout until stdin closes
pub async fn run_mcp_server(services: McpServices) -> anyhow::Result<()> {
    run_mcp_server_on(services, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Run the MCP server over arbitrary line-oriented streams
///
/// Returns once `reader` reaches EOF and every in-flight request has been
/// answered.
#[instrument(skip_all)]
pub async fn run_mcp_server_on<R, W>(services: McpServices, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    info!("MCP stdio server started");

    let (tx, rx) = mpsc::unbounded_channel::<MCPResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut in_flight = JoinSet::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("MCP message: {}", line);

        let message: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse JSON-RPC message: {}", e);
                // Unknown id since parsing failed
                let _ = tx.send(MCPResponse::error(
                    0,
                    MCPError::parse_error(format!("Invalid JSON: {}", e)),
                ));
                continue;
            }
        };

        if message.get("id").is_none() {
            match serde_json::from_value::<MCPNotification>(message) {
                Ok(notification) => debug!("MCP notification: {}", notification.method),
                Err(e) => warn!("Ignoring malformed notification: {}", e),
            }
            continue;
        }

        let request: MCPRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid JSON-RPC request: {}", e);
                let _ = tx.send(MCPResponse::error(
                    0,
                    MCPError::invalid_request(format!("Invalid request: {}", e)),
                ));
                continue;
            }
        };

        let services = services.clone();
        let tx = tx.clone();
        in_flight.spawn(async move {
            let response = handle_request(&services, request).await;
            let _ = tx.send(response);
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!("MCP request task failed: {}", e);
        }
    }
    drop(tx);
    writer_task.await??;

    info!("MCP stdio server stopped (stdin closed)");
    Ok(())
}

/// Handle a JSON-RPC request and return a response
#[instrument(skip(services, request), fields(method = %request.method, id = %request.id))]
pub async fn handle_request(services: &McpServices, request: MCPRequest) -> MCPResponse {
    let result = match request.method.as_str() {
        "initialize" => initialize::handle_initialize(request.params),
        "ping" => Ok(json!({})),
        "tools/list" => tools::handle_tools_list(&services.registry, request.params),
        "tools/call" => tools::handle_tools_call(&services.gds, &services.registry, request.params).await,
        _ => {
            warn!("Unknown MCP method: {}", request.method);
            Err(MCPError::method_not_found(&request.method))
        }
    };

    match result {
        Ok(result) => {
            debug!("MCP request {} succeeded", request.id);
            MCPResponse::success(request.id, result)
        }
        Err(error) => {
            error!(
                "MCP request {} failed: {} (code: {})",
                request.id, error.message, error.code
            );
            MCPResponse::error(request.id, error)
        }
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<MCPResponse>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let json = serde_json::to_string(&response)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
