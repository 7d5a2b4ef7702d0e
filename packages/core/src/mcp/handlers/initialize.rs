//! MCP Initialize Handler
//!
//! Handles the MCP initialization handshake and capability discovery.
//! This is the first method called when a client connects to the server.

use crate::mcp::types::MCPError;
use serde_json::{json, Value};

/// Supported MCP protocol versions (for backward compatibility)
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

pub const SERVER_NAME: &str = "neo4j-gds";

/// Handle MCP initialize request
///
/// The client's `protocolVersion` is echoed back when supported; anything
/// else is rejected with the list of versions this server speaks.
///
/// # Errors
///
/// - `INVALID_PARAMS` when protocolVersion is missing
/// - `INVALID_REQUEST` when the version is not supported
pub fn handle_initialize(params: Value) -> Result<Value, MCPError> {
    let client_version = params["protocolVersion"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing protocolVersion parameter".to_string()))?;

    if !SUPPORTED_PROTOCOL_VERSIONS.contains(&client_version) {
        return Err(MCPError::invalid_request(format!(
            "Unsupported protocol version: {}. Server supports: {:?}",
            client_version, SUPPORTED_PROTOCOL_VERSIONS
        )));
    }

    Ok(json!({
        "protocolVersion": client_version,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Graph Data Science algorithms over the connected Neo4j database. \
            Each algorithm call projects the whole database into a temporary in-memory graph \
            and drops it afterwards. Use get_node_properties_keys to find the property that \
            identifies nodes by name before passing node names to a tool."
    }))
}

#[cfg(test)]
#[path = "initialize_test.rs"]
mod initialize_test;
