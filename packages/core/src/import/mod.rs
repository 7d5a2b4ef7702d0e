//! Transit dataset importer
//!
//! Loads a `{ "stations": [...], "connections": [...] }` JSON document into
//! Neo4j as `UndergroundStation` nodes joined by `LINK` relationships. Each
//! step is one parameterized `UNWIND` statement; records keep whatever extra
//! fields the dataset has, only the ones below are written.

mod error;

pub use error::ImportError;

use crate::db::{GraphStore, Statement};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

pub const STATION_LABEL: &str = "UndergroundStation";
pub const LINK_TYPE: &str = "LINK";

const CONSTRAINTS: &[&str] = &[
    "CREATE CONSTRAINT underground_station_name IF NOT EXISTS \
     FOR (s:UndergroundStation) REQUIRE s.name IS UNIQUE",
    "CREATE CONSTRAINT underground_station_id IF NOT EXISTS \
     FOR (s:UndergroundStation) REQUIRE s.id IS UNIQUE",
];

const CREATE_STATIONS: &str = "\
UNWIND $stations AS station
CREATE (s:UndergroundStation {
    id: station.id,
    name: station.name,
    display_name: CASE station.display_name WHEN 'NULL' THEN station.name ELSE station.display_name END,
    latitude: toFloat(station.latitude),
    longitude: toFloat(station.longitude),
    zone: CASE WHEN toString(station.zone) CONTAINS '.' THEN toFloat(station.zone) ELSE toInteger(station.zone) END,
    total_lines: toInteger(station.total_lines),
    rail: toInteger(station.rail)
})
RETURN count(s) AS created";

// Datasets without a distance column use travel time as the distance.
const CREATE_LINKS: &str = "\
UNWIND $connections AS conn
MATCH (s1:UndergroundStation {id: conn.station1})
MATCH (s2:UndergroundStation {id: conn.station2})
CREATE (s1)-[r:LINK {
    line: conn.line,
    time: toInteger(conn.time),
    distance: toInteger(coalesce(conn.distance, conn.time))
}]->(s2)
RETURN count(r) AS created";

/// Raw dataset records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitDataset {
    #[serde(default)]
    pub stations: Vec<Map<String, Value>>,
    #[serde(default)]
    pub connections: Vec<Map<String, Value>>,
}

/// What an import wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub stations_created: u64,
    pub links_created: u64,
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<TransitDataset, ImportError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn created(rows: &[Map<String, Value>]) -> u64 {
    rows.first()
        .and_then(|row| row.get("created"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Create constraints, stations, then links
///
/// Not idempotent: running it twice against the same database fails on the
/// uniqueness constraints.
pub async fn import_transit_network(
    store: &dyn GraphStore,
    dataset: &TransitDataset,
) -> Result<ImportSummary, ImportError> {
    for constraint in CONSTRAINTS {
        store
            .query(Statement::new(*constraint))
            .await
            .map_err(|e| ImportError::store("constraints", e))?;
    }
    info!("Constraints on {} in place", STATION_LABEL);

    let stations = store
        .query(Statement::new(CREATE_STATIONS).param("stations", dataset.stations.clone()))
        .await
        .map_err(|e| ImportError::store("stations", e))?;
    let stations_created = created(&stations);
    info!("Created {} {} nodes", stations_created, STATION_LABEL);

    let links = store
        .query(Statement::new(CREATE_LINKS).param("connections", dataset.connections.clone()))
        .await
        .map_err(|e| ImportError::store("connections", e))?;
    let links_created = created(&links);
    info!("Created {} {} relationships", links_created, LINK_TYPE);

    Ok(ImportSummary {
        stations_created,
        links_created,
    })
}
