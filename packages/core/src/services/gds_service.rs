//! GDS Service
//!
//! Thin layer over [`GraphStore`] that every algorithm handler goes through.
//! It runs `gds.<procedure>.stream` calls against a [`ProjectionHandle`] and
//! resolves human-readable node names to internal node ids and back.
//!
//! Property names supplied by tool arguments are always passed as query
//! parameters (`n[$property]`), never spliced into statement text.

use crate::db::{GraphStore, Row, Statement, StoreError};
use crate::projection::{with_projection, Direction, ProjectionError, ProjectionHandle, SchemaProber};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Dotted GDS procedure path such as `shortestPath.dijkstra`
const PROCEDURE_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9]*(\.[A-Za-z][A-Za-z0-9]*)*$";

fn validate_procedure(procedure: &str) -> Result<(), StoreError> {
    static PROCEDURE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PROCEDURE_REGEX.get_or_init(|| {
        Regex::new(PROCEDURE_PATTERN).expect("procedure pattern is a valid regex")
    });
    if regex.is_match(procedure) {
        Ok(())
    } else {
        Err(StoreError::InvalidProcedure(procedure.to_string()))
    }
}

/// Node count plus the labels and relationship types in use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: i64,
    pub node_labels: Vec<String>,
    pub relationship_types: Vec<String>,
}

fn string_column(rows: Vec<Row>, column: &str) -> Vec<String> {
    rows.into_iter()
        .filter_map(|mut row| match row.remove(column) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
        .collect()
}

/// Shared entry point for running GDS algorithms
#[derive(Clone)]
pub struct GdsService {
    store: Arc<dyn GraphStore>,
}

impl GdsService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Run `body` against a fresh ephemeral projection (see [`with_projection`])
    pub async fn with_projection<F, Fut, T, E>(&self, direction: Direction, body: F) -> Result<T, E>
    where
        F: FnOnce(ProjectionHandle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ProjectionError>,
    {
        with_projection(&self.store, direction, body).await
    }

    /// `CALL gds.<procedure>.stream($graphName, $config)`, every yielded column
    pub async fn stream(
        &self,
        graph: &ProjectionHandle,
        procedure: &str,
        config: Map<String, Value>,
    ) -> Result<Vec<Row>, StoreError> {
        validate_procedure(procedure)?;
        debug!("gds.{}.stream on '{}' with {:?}", procedure, graph.graph_name(), config);

        let statement = Statement::new(format!(
            "CALL gds.{}.stream($graphName, $config)",
            procedure
        ))
        .param("graphName", graph.graph_name())
        .param("config", config);
        self.store.query(statement).await
    }

    /// Like [`stream`](Self::stream) but yields only `columns`
    ///
    /// Used to leave out path-typed columns that don't survive JSON encoding.
    pub async fn stream_columns(
        &self,
        graph: &ProjectionHandle,
        procedure: &str,
        config: Map<String, Value>,
        columns: &[&str],
    ) -> Result<Vec<Row>, StoreError> {
        validate_procedure(procedure)?;
        let columns = columns.join(", ");

        let statement = Statement::new(format!(
            "CALL gds.{}.stream($graphName, $config) YIELD {} RETURN {}",
            procedure, columns, columns
        ))
        .param("graphName", graph.graph_name())
        .param("config", config);
        self.store.query(statement).await
    }

    pub async fn count_nodes(&self) -> Result<GraphSummary, StoreError> {
        let count = self
            .store
            .query(Statement::new("MATCH (n) RETURN count(n) AS count"))
            .await?
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        let labels = self
            .store
            .query(Statement::new("CALL db.labels() YIELD label RETURN label"))
            .await?;
        let types = self
            .store
            .query(Statement::new(
                "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType",
            ))
            .await?;

        Ok(GraphSummary {
            node_count: count,
            node_labels: string_column(labels, "label"),
            relationship_types: string_column(types, "relationshipType"),
        })
    }

    /// Distinct node property keys, sorted
    pub async fn node_property_keys(&self) -> Result<Vec<String>, StoreError> {
        let keys = SchemaProber::new(self.store.as_ref())
            .list_node_property_keys()
            .await?;
        Ok(keys.into_iter().map(|k| k.as_str().to_string()).collect())
    }

    /// Ids of nodes whose `property` contains any of `names`, case-insensitively
    pub async fn find_node_ids(&self, property: &str, names: &[String]) -> Result<Vec<i64>, StoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let statement = Statement::new(
            "UNWIND $names AS name \
             MATCH (n) WHERE toLower(toString(n[$property])) CONTAINS toLower(name) \
             RETURN DISTINCT id(n) AS nodeId",
        )
        .param("names", names.to_vec())
        .param("property", property);

        Ok(self
            .store
            .query(statement)
            .await?
            .iter()
            .filter_map(|row| row.get("nodeId").and_then(Value::as_i64))
            .collect())
    }

    /// Best single match for `name`: an exact (case-insensitive) match wins
    /// over a substring match
    pub async fn find_node_id(&self, property: &str, name: &str) -> Result<Option<i64>, StoreError> {
        let statement = Statement::new(
            "MATCH (n) WHERE toLower(toString(n[$property])) CONTAINS toLower($name) \
             RETURN id(n) AS nodeId \
             ORDER BY CASE WHEN toLower(toString(n[$property])) = toLower($name) THEN 0 ELSE 1 END, nodeId \
             LIMIT 1",
        )
        .param("property", property)
        .param("name", name);

        Ok(self
            .store
            .query(statement)
            .await?
            .first()
            .and_then(|row| row.get("nodeId"))
            .and_then(Value::as_i64))
    }

    /// `property` value for each of `ids` (ids without the property map to null)
    pub async fn node_names(&self, property: &str, ids: &[i64]) -> Result<HashMap<i64, Value>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let statement = Statement::new(
            "MATCH (n) WHERE id(n) IN $ids RETURN id(n) AS nodeId, n[$property] AS name",
        )
        .param("ids", ids.to_vec())
        .param("property", property);

        Ok(self
            .store
            .query(statement)
            .await?
            .into_iter()
            .filter_map(|mut row| {
                let id = row.get("nodeId").and_then(Value::as_i64)?;
                Some((id, row.remove("name").unwrap_or(Value::Null)))
            })
            .collect())
    }
}
