//! Shared command-line plumbing for the `gds-mcp` and `import-data` binaries

use clap::Args;
use gds_mcp_core::db::{Neo4jConfig, DEFAULT_DATABASE, DEFAULT_URI, DEFAULT_USERNAME};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Neo4j connection flags, each with an environment fallback
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Neo4j URI (bolt://, neo4j:// or http://, with +s variants)
    #[arg(long = "db-url", env = "NEO4J_URI", default_value = DEFAULT_URI)]
    pub db_url: String,

    #[arg(long, env = "NEO4J_USERNAME", default_value = DEFAULT_USERNAME)]
    pub username: String,

    #[arg(long, env = "NEO4J_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "NEO4J_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "NEO4J_TIMEOUT_SECS", default_value_t = 300)]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> Neo4jConfig {
        Neo4jConfig::new(&self.db_url, &self.username, &self.password)
            .with_database(&self.database)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Install the tracing subscriber on stderr; stdout belongs to the protocol
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
