//! MCP Tools Handler
//!
//! Implements MCP-compliant tools/list and tools/call over the
//! [`AlgorithmRegistry`]. Tool failures are reported inside the result with
//! `isError: true`; only malformed calls become JSON-RPC errors.

use crate::algorithms::{AlgorithmError, AlgorithmRegistry};
use crate::mcp::types::MCPError;
use crate::services::GdsService;
use serde_json::{json, Value};
use tracing::{error, info};

/// Handle tools/list MCP request
///
/// Response format:
/// ```json
/// {
///   "tools": [
///     { "name": "pagerank", "description": "...", "inputSchema": { ... } }
///   ]
/// }
/// ```
pub fn handle_tools_list(registry: &AlgorithmRegistry, _params: Value) -> Result<Value, MCPError> {
    Ok(json!({
        "tools": registry.definitions()
    }))
}

fn text_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": text
        }],
        "isError": is_error
    })
}

/// Handle tools/call MCP request
///
/// Request format:
/// ```json
/// { "name": "tool_name", "arguments": { ... } }
/// ```
///
/// On success the tool's JSON output is returned pretty-printed as a single
/// text block. Execution errors yield `isError: true` with the text
/// `Error executing <tool>: <message>`.
pub async fn handle_tools_call(
    gds: &GdsService,
    registry: &AlgorithmRegistry,
    params: Value,
) -> Result<Value, MCPError> {
    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing 'name' parameter".to_string()))?;

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
    info!("Calling tool '{}' with arguments {}", tool_name, arguments);

    match registry.execute(gds, tool_name, arguments).await {
        Ok(data) => {
            let text = serde_json::to_string_pretty(&data).map_err(|e| {
                MCPError::internal_error(format!("JSON serialization failed: {}", e))
            })?;
            Ok(text_result(text, false))
        }
        Err(AlgorithmError::UnknownTool(name)) => {
            Err(MCPError::invalid_params(format!("Unknown tool: {}", name)))
        }
        Err(e) => {
            error!("Tool '{}' failed: {}", tool_name, e);
            Ok(text_result(
                format!("Error executing {}: {}", tool_name, e),
                true,
            ))
        }
    }
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;
