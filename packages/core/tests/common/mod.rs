//! In-memory `GraphStore` for integration tests
//!
//! Holds a small property graph, answers the schema-probe and node-lookup
//! statements the crate issues, serves canned rows for `gds.*.stream` calls
//! and records every projection create/drop.

#![allow(dead_code)]

use async_trait::async_trait;
use gds_mcp_core::db::{GraphStore, Row, Statement, StoreError};
use gds_mcp_core::projection::{Direction, ProjectionSpec};
use serde_json::{json, Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

pub fn props(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// A projection as the store saw it
#[derive(Debug, Clone)]
pub struct CreatedProjection {
    pub graph_name: String,
    pub direction: Direction,
    pub node_properties: Vec<String>,
    pub relationship_properties: Vec<String>,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Create(String),
    Stream { graph_name: String, procedure: String, config: Value },
    Drop(String),
}

#[derive(Default)]
pub struct MemoryStore {
    nodes: Vec<Map<String, Value>>,
    relationships: Vec<Map<String, Value>>,
    stream_rows: HashMap<String, Vec<Row>>,
    failing_procedures: BTreeSet<String>,
    create_delay: Option<Duration>,
    created: Mutex<Vec<CreatedProjection>>,
    events: Mutex<Vec<Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node ids are insertion positions
    pub fn with_node(mut self, properties: Value) -> Self {
        self.nodes.push(props(properties));
        self
    }

    pub fn with_relationship(mut self, properties: Value) -> Self {
        self.relationships.push(props(properties));
        self
    }

    pub fn with_stream_rows(mut self, procedure: &str, rows: Value) -> Self {
        let rows = rows
            .as_array()
            .map(|rows| rows.iter().map(|r| props(r.clone())).collect())
            .unwrap_or_default();
        self.stream_rows.insert(procedure.to_string(), rows);
        self
    }

    pub fn with_failing_procedure(mut self, procedure: &str) -> Self {
        self.failing_procedures.insert(procedure.to_string());
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn created(&self) -> Vec<CreatedProjection> {
        self.created.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn dropped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Drop(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn owner_records(&self, text: &str) -> &[Map<String, Value>] {
        if text.starts_with("MATCH ()-[e]->()") {
            &self.relationships
        } else {
            &self.nodes
        }
    }

    fn param_str<'a>(statement: &'a Statement, key: &str) -> &'a str {
        statement.parameters.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn matching_ids(&self, property: &str, name: &str) -> Vec<i64> {
        let needle = name.to_lowercase();
        let mut matches: Vec<(bool, i64)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| {
                let value = node.get(property)?.as_str()?.to_lowercase();
                value
                    .contains(&needle)
                    .then_some((value != needle, id as i64))
            })
            .collect();
        matches.sort();
        matches.into_iter().map(|(_, id)| id).collect()
    }
}

fn procedure_of(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("CALL gds.")?;
    rest.split(".stream(").next()
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn query(&self, statement: Statement) -> Result<Vec<Row>, StoreError> {
        let text = statement.text.as_str();

        if let Some(procedure) = procedure_of(text) {
            self.events.lock().unwrap().push(Event::Stream {
                graph_name: Self::param_str(&statement, "graphName").to_string(),
                procedure: procedure.to_string(),
                config: statement.parameters.get("config").cloned().unwrap_or(Value::Null),
            });
            if self.failing_procedures.contains(procedure) {
                return Err(StoreError::neo4j(
                    "Neo.ClientError.Procedure.ProcedureCallFailed",
                    format!("{} failed", procedure),
                ));
            }
            return Ok(self.stream_rows.get(procedure).cloned().unwrap_or_default());
        }

        if text.contains("UNWIND keys(e)") {
            let keys: BTreeSet<&String> = self
                .owner_records(text)
                .iter()
                .flat_map(|record| record.keys())
                .collect();
            return Ok(keys.into_iter().map(|k| props(json!({"key": k}))).collect());
        }

        if text.contains("e[$key] IS NOT NULL") {
            let key = Self::param_str(&statement, "key");
            let limit = statement.parameters.get("limit").and_then(Value::as_u64).unwrap_or(10);
            return Ok(self
                .owner_records(text)
                .iter()
                .filter_map(|record| record.get(key).filter(|v| !v.is_null()))
                .take(limit as usize)
                .map(|v| props(json!({"value": v})))
                .collect());
        }

        if text.contains("id(n) IN $ids") {
            let property = Self::param_str(&statement, "property");
            let ids: Vec<i64> = statement.parameters["ids"]
                .as_array()
                .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default();
            return Ok(ids
                .into_iter()
                .filter_map(|id| {
                    let node = self.nodes.get(id as usize)?;
                    let name = node.get(property).cloned().unwrap_or(Value::Null);
                    Some(props(json!({"nodeId": id, "name": name})))
                })
                .collect());
        }

        if text.contains("UNWIND $names") {
            let property = Self::param_str(&statement, "property");
            let mut ids: Vec<i64> = statement.parameters["names"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .flat_map(|name| self.matching_ids(property, name))
                .collect();
            ids.sort_unstable();
            ids.dedup();
            return Ok(ids.into_iter().map(|id| props(json!({"nodeId": id}))).collect());
        }

        if text.contains("LIMIT 1") {
            let property = Self::param_str(&statement, "property");
            let name = Self::param_str(&statement, "name");
            return Ok(self
                .matching_ids(property, name)
                .into_iter()
                .take(1)
                .map(|id| props(json!({"nodeId": id})))
                .collect());
        }

        Ok(Vec::new())
    }

    async fn create_projection(&self, spec: &ProjectionSpec) -> Result<Row, StoreError> {
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        self.created.lock().unwrap().push(CreatedProjection {
            graph_name: spec.graph_name().to_string(),
            direction: spec.direction(),
            node_properties: spec.node_properties().keys().map(|k| k.as_str().to_string()).collect(),
            relationship_properties: spec
                .relationship_properties()
                .keys()
                .map(|k| k.as_str().to_string())
                .collect(),
            statement: spec.to_statement().text,
        });
        self.events
            .lock()
            .unwrap()
            .push(Event::Create(spec.graph_name().to_string()));

        Ok(props(json!({
            "graphName": spec.graph_name(),
            "nodeCount": self.nodes.len(),
            "relationshipCount": self.relationships.len(),
            "projectMillis": 1
        })))
    }

    async fn drop_projection(&self, graph_name: &str) -> Result<(), StoreError> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Drop(graph_name.to_string()));
        Ok(())
    }
}
