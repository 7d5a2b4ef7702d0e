//! Model Context Protocol (MCP) Integration
//!
//! JSON-RPC 2.0 over stdin/stdout exposing the GDS tool catalogue.
//!
//! # Usage
//!
//! Clients discover tools with `tools/list` and run them with `tools/call`:
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "tools/call",
//!   "params": {
//!     "name": "find_shortest_path",
//!     "arguments": { "start_node": "Bank", "end_node": "Angel" }
//!   }
//! }
//! ```

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{handle_request, run_mcp_server, run_mcp_server_on, McpServices};
pub use types::{MCPError, MCPNotification, MCPRequest, MCPResponse};
