//! Centrality tools: ArticleRank, degree and PageRank
//!
//! All three share one shape. Scores are streamed for every node; when the
//! caller names `nodes`, the result is cut down to nodes whose `property_key`
//! contains one of the names.

use super::{
    forwarded_config, optional_str, rows_to_value, string_list, AlgorithmError, AlgorithmHandler,
    ToolDefinition,
};
use crate::projection::Direction;
use crate::services::GdsService;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::info;

const LOCAL_KEYS: &[&str] = &["nodes", "property_key"];

pub(crate) fn handlers() -> Vec<Box<dyn AlgorithmHandler>> {
    vec![
        Box::new(CentralityHandler::article_rank()),
        Box::new(CentralityHandler::degree()),
        Box::new(CentralityHandler::page_rank()),
    ]
}

fn filter_properties() -> Map<String, Value> {
    json!({
        "nodes": {
            "type": "array",
            "items": {"type": "string"},
            "description": "List of nodes to return the scores for."
        },
        "property_key": {
            "type": "string",
            "description": "Property key to use to filter the specified nodes."
        }
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

fn iteration_properties(algorithm: &str) -> Map<String, Value> {
    json!({
        "dampingFactor": {
            "type": "number",
            "description": format!("The damping factor of the {} calculation. Must be in [0, 1).", algorithm)
        },
        "maxIterations": {
            "type": "integer",
            "description": format!("Maximum number of iterations for {}", algorithm)
        },
        "tolerance": {
            "type": "number",
            "description": "Minimum change in scores between iterations. If all scores change less than the tolerance value the result is considered stable and the algorithm returns."
        }
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

fn object_schema(properties: Map<String, Value>) -> Value {
    json!({"type": "object", "properties": properties, "required": []})
}

/// One of the centrality tools
pub struct CentralityHandler {
    name: &'static str,
    description: &'static str,
    procedure: &'static str,
    /// Whether `sourceNodes` names are resolved to node ids
    personalised: bool,
    input_schema: Value,
}

impl CentralityHandler {
    pub fn article_rank() -> Self {
        let mut properties = filter_properties();
        properties.extend(iteration_properties("ArticleRank"));
        properties.extend(
            json!({
                "relationshipWeightProperty": {
                    "type": "string",
                    "description": "Property of the relationship to use for weighting. If not specified, all relationships are treated equally."
                },
                "sourceNodes": {
                    "description": "The nodes or node-bias pairs to use for computing Personalized ArticleRank. Nodes are matched by name through property_key. To use different bias for different source nodes, use the syntax: [[node1, bias1], [node2, bias2], ...]",
                    "anyOf": [
                        {"type": "string", "description": "Single node"},
                        {"type": "array", "items": {"type": "string"}, "description": "List of nodes"},
                        {
                            "type": "array",
                            "items": {
                                "type": "array",
                                "prefixItems": [{"type": "string"}, {"type": "number"}],
                                "minItems": 2,
                                "maxItems": 2
                            },
                            "description": "List of [node, bias] pairs"
                        }
                    ]
                },
                "scaler": {
                    "type": "string",
                    "description": "The name of the scaler applied for the final scores. Supported values are None, MinMax, Max, Mean, Log, and StdScore."
                }
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );

        Self {
            name: "article_rank",
            description: "Calculate ArticleRank for nodes in the graph. ArticleRank is similar to PageRank but normalizes by the number of outgoing references.",
            procedure: "articleRank",
            personalised: true,
            input_schema: object_schema(properties),
        }
    }

    pub fn degree() -> Self {
        Self {
            name: "degree_centrality",
            description: "Calculate degree centrality for all nodes in the graph",
            procedure: "degree",
            personalised: false,
            input_schema: object_schema(filter_properties()),
        }
    }

    pub fn page_rank() -> Self {
        let mut properties = filter_properties();
        properties.extend(iteration_properties("PageRank"));
        Self {
            name: "pagerank",
            description: "Calculate PageRank for all nodes in the graph",
            procedure: "pageRank",
            personalised: false,
            input_schema: object_schema(properties),
        }
    }
}

/// Replace node names in a `sourceNodes` value with node ids
///
/// Accepts a single name, a list of names, or `[name, bias]` pairs; numbers
/// are taken to be ids already and kept as they are.
async fn resolve_source_nodes(
    gds: &GdsService,
    property: &str,
    value: Value,
) -> Result<Value, AlgorithmError> {
    let items = match value {
        Value::String(name) => vec![Value::String(name)],
        Value::Array(items) => items,
        other => return Ok(other),
    };

    let mut resolved = Vec::new();
    for item in items {
        match item {
            Value::String(name) => {
                let ids = gds.find_node_ids(property, &[name]).await?;
                resolved.extend(ids.into_iter().map(Value::from));
            }
            Value::Array(pair) => match pair.as_slice() {
                [Value::String(name), bias] => {
                    let ids = gds.find_node_ids(property, &[name.clone()]).await?;
                    resolved.extend(ids.into_iter().map(|id| json!([id, bias])));
                }
                _ => resolved.push(Value::Array(pair)),
            },
            other => resolved.push(other),
        }
    }
    Ok(Value::Array(resolved))
}

#[async_trait]
impl AlgorithmHandler for CentralityHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema.clone(),
        }
    }

    async fn execute(
        &self,
        gds: &GdsService,
        arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError> {
        let names = string_list(&arguments, "nodes")?;
        let property_key = optional_str(&arguments, "property_key")?;
        if names.is_some() && property_key.is_none() {
            return Err(AlgorithmError::invalid_arguments(
                "If 'nodes' is provided, 'property_key' must also be specified. \
                 get_node_properties_keys should return all available property keys \
                 and the most appropriate one can be picked.",
            ));
        }

        let mut config = forwarded_config(&self.definition(), &arguments, LOCAL_KEYS);
        if self.personalised {
            if let (Some(property), Some(source_nodes)) =
                (property_key.as_deref(), config.remove("sourceNodes"))
            {
                let resolved = resolve_source_nodes(gds, property, source_nodes).await?;
                config.insert("sourceNodes".to_string(), resolved);
            }
        }
        info!("{} parameters: {:?}", self.name, config);

        let keep: Option<HashSet<i64>> = match (&names, property_key.as_deref()) {
            (Some(names), Some(property)) => {
                info!("Filtering {} results for nodes: {:?}", self.name, names);
                Some(gds.find_node_ids(property, names).await?.into_iter().collect())
            }
            _ => None,
        };

        let procedure = self.procedure;
        let mut rows = gds
            .with_projection(Direction::Directed, |graph| async move {
                gds.stream(&graph, procedure, config)
                    .await
                    .map_err(AlgorithmError::from)
            })
            .await?;

        if let Some(keep) = keep {
            rows.retain(|row| {
                row.get("nodeId")
                    .and_then(Value::as_i64)
                    .map_or(false, |id| keep.contains(&id))
            });
        }
        Ok(rows_to_value(rows))
    }
}
