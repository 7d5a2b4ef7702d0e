//! MCP Server Service
//!
//! Managed service wrapper for the MCP (Model Context Protocol) server.
//! Binds a [`GraphStore`] to the algorithm catalogue and serves it over stdio.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(HttpGraphStore::new(&Neo4jConfig::from_env())?);
//! McpServerService::new(store).start().await?;
//! ```

use crate::algorithms::AlgorithmRegistry;
use crate::db::GraphStore;
use crate::mcp::{self, McpServices};
use crate::services::GdsService;
use std::sync::Arc;
use tracing::info;

/// MCP Server Service
///
/// `Clone` and `Arc`-backed so it can be shared across tasks.
#[derive(Clone)]
pub struct McpServerService {
    gds: GdsService,
    registry: Arc<AlgorithmRegistry>,
}

impl McpServerService {
    /// Serve the full tool catalogue against `store`
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_registry(store, AlgorithmRegistry::new())
    }

    pub fn with_registry(store: Arc<dyn GraphStore>, registry: AlgorithmRegistry) -> Self {
        Self {
            gds: GdsService::new(store),
            registry: Arc::new(registry),
        }
    }

    pub fn services(&self) -> McpServices {
        McpServices {
            gds: self.gds.clone(),
            registry: self.registry.clone(),
        }
    }

    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Serve stdin/stdout until stdin closes
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` on EOF, or `Err` on a fatal I/O error.
    pub async fn start(&self) -> anyhow::Result<()> {
        info!("Starting MCP server with {} tools...", self.tool_count());
        mcp::run_mcp_server(self.services()).await
    }
}
