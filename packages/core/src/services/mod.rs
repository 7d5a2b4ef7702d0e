//! Services
//!
//! - [`GdsService`] - algorithm execution against ephemeral projections,
//!   node lookups by property, graph summaries
//! - [`McpServerService`] - managed wrapper that starts the stdio MCP server
//!
//! Services sit between the store layer and the MCP handlers.

pub mod gds_service;
pub mod mcp_server_service;

pub use gds_service::{GdsService, GraphSummary};
pub use mcp_server_service::McpServerService;
