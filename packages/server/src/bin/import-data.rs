//! Imports the London Underground dataset into Neo4j
//!
//! ```bash
//! import-data --dataset dataset/london.json
//! ```

use clap::Parser;
use gds_mcp_core::import::{import_transit_network, load_dataset};
use gds_mcp_core::HttpGraphStore;
use gds_mcp_server::{init_logging, ConnectionArgs};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "import-data", version, about = "Load a transit network dataset into Neo4j")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// JSON file with `stations` and `connections` arrays
    #[arg(long, default_value = "dataset/london.json")]
    dataset: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let dataset = load_dataset(&cli.dataset)?;
    info!(
        "Loaded {} stations and {} connections from {}",
        dataset.stations.len(),
        dataset.connections.len(),
        cli.dataset.display()
    );

    let store = HttpGraphStore::new(&cli.connection.to_config())?;
    let summary = import_transit_network(&store, &dataset).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
