//! Neo4j Graph Data Science tools over MCP
//!
//! This crate turns the algorithms of the Neo4j GDS plugin into MCP tools
//! that run against whatever data the database holds, with no projection
//! configuration from the caller.
//!
//! # Architecture
//!
//! - **Ad-hoc projections**: every algorithm call projects all nodes and
//!   relationships into a uniquely named in-memory graph and drops it when
//!   the call finishes, whatever the outcome
//! - **Schema probing**: property keys are discovered and their types
//!   inferred from sampled values; only numeric properties are projected
//! - **HTTP transport**: Cypher runs over the Neo4j transactional HTTP API
//! - **stdio MCP**: JSON-RPC 2.0, one message per line
//!
//! # Modules
//!
//! - [`db`] - `GraphStore` abstraction, HTTP implementation, configuration
//! - [`projection`] - schema prober, projection builder, lifecycle guard
//! - [`services`] - `GdsService` and the MCP server service
//! - [`algorithms`] - the tool catalogue
//! - [`mcp`] - MCP stdio server
//! - [`import`] - transit dataset importer

pub mod algorithms;
pub mod db;
pub mod import;
pub mod mcp;
pub mod projection;
pub mod services;

// Re-export commonly used types
pub use algorithms::{AlgorithmError, AlgorithmHandler, AlgorithmRegistry, ToolDefinition};
pub use db::{GraphStore, HttpGraphStore, Neo4jConfig, Row, Statement, StoreError};
pub use projection::{with_projection, Direction, ProjectionError, ProjectionHandle};
pub use services::{GdsService, McpServerService};
