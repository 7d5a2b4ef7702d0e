//! Database overview tools that need no projection

use super::{AlgorithmError, AlgorithmHandler, ToolDefinition};
use crate::services::GdsService;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

pub(crate) fn handlers() -> Vec<Box<dyn AlgorithmHandler>> {
    vec![Box::new(CountNodesHandler), Box::new(NodePropertyKeysHandler)]
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

pub struct CountNodesHandler;

#[async_trait]
impl AlgorithmHandler for CountNodesHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "count_nodes",
            description: "Count the number of nodes in the graph, and list the node labels and relationship types in use",
            input_schema: empty_schema(),
        }
    }

    async fn execute(
        &self,
        gds: &GdsService,
        _arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError> {
        let summary = gds.count_nodes().await?;
        info!(
            "Graph has {} nodes, {} labels, {} relationship types",
            summary.node_count,
            summary.node_labels.len(),
            summary.relationship_types.len()
        );
        Ok(json!(summary))
    }
}

pub struct NodePropertyKeysHandler;

#[async_trait]
impl AlgorithmHandler for NodePropertyKeysHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_node_properties_keys",
            description: "Get all node property keys in the database",
            input_schema: empty_schema(),
        }
    }

    async fn execute(
        &self,
        gds: &GdsService,
        _arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError> {
        Ok(json!(gds.node_property_keys().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockGraphStore, Row};
    use std::sync::Arc;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_property_keys_sorted_and_distinct() {
        let mut store = MockGraphStore::new();
        store.expect_query().times(1).returning(|_| {
            Ok(vec![
                row(json!({"key": "name"})),
                row(json!({"key": "latitude"})),
                row(json!({"key": "name"})),
            ])
        });
        store.expect_create_projection().never();

        let gds = GdsService::new(Arc::new(store));
        let result = NodePropertyKeysHandler
            .execute(&gds, Map::new())
            .await
            .unwrap();
        assert_eq!(result, json!(["latitude", "name"]));
    }
}
