//! Neo4j GDS MCP server
//!
//! Serves the GDS tool catalogue over stdio. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! NEO4J_URI=bolt://localhost:7687 NEO4J_PASSWORD=secret gds-mcp
//! gds-mcp --db-url neo4j+s://abc.databases.neo4j.io --database neo4j
//! ```

use clap::Parser;
use gds_mcp_core::{HttpGraphStore, McpServerService};
use gds_mcp_server::{init_logging, ConnectionArgs};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "gds-mcp", version, about = "Neo4j Graph Data Science tools over MCP (stdio)")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let config = cli.connection.to_config();
    info!(
        "Starting MCP server for {} with username {} (database '{}')",
        config.uri, config.username, config.database
    );

    let store = HttpGraphStore::new(&config)?;
    info!("Cypher endpoint: {}", store.endpoint());

    McpServerService::new(Arc::new(store)).start().await
}
