//! Similarity tools: node similarity and k-nearest neighbours
//!
//! The filtered variants accept node names for `sourceNodeFilter` and
//! `targetNodeFilter` when `nodeIdentifierProperty` is given; otherwise the
//! filters go to GDS untouched (a label or node ids).

use super::{
    attach_node_names, forwarded_config, optional_str, rows_to_value, AlgorithmError,
    AlgorithmHandler, ToolDefinition,
};
use crate::projection::Direction;
use crate::services::GdsService;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

const NODE_IDENTIFIER_PROPERTY: &str = "nodeIdentifierProperty";
const FILTER_KEYS: [&str; 2] = ["sourceNodeFilter", "targetNodeFilter"];

pub(crate) fn handlers() -> Vec<Box<dyn AlgorithmHandler>> {
    vec![
        Box::new(SimilarityHandler::node_similarity()),
        Box::new(SimilarityHandler::filtered_node_similarity()),
        Box::new(SimilarityHandler::k_nearest_neighbors()),
        Box::new(SimilarityHandler::filtered_k_nearest_neighbors()),
    ]
}

fn properties(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn node_similarity_properties() -> Map<String, Value> {
    properties(json!({
        "similarityCutoff": {
            "type": "number",
            "description": "Lower limit for the similarity score to be present in the result. Values must be between 0 and 1."
        },
        "degreeCutoff": {
            "type": "integer",
            "description": "Inclusive lower bound on the node degree for a node to be considered in the comparisons."
        },
        "upperDegreeCutoff": {
            "type": "integer",
            "description": "Inclusive upper bound on the node degree for a node to be considered in the comparisons."
        },
        "topK": {"type": "integer", "description": "Limit on the number of scores per node."},
        "bottomK": {"type": "integer", "description": "Limit on the number of scores per node, lowest first."},
        "topN": {"type": "integer", "description": "Global limit on the number of scores computed."},
        "bottomN": {"type": "integer", "description": "Global limit on the number of scores computed, lowest first."},
        "relationshipWeightProperty": {
            "type": "string",
            "description": "Name of the relationship property to use as weights. If unspecified, the algorithm runs unweighted."
        },
        "similarityMetric": {
            "type": "string",
            "enum": ["JACCARD", "OVERLAP", "COSINE"],
            "description": "The metric used to compute similarity."
        },
        "useComponents": {
            "description": "If enabled, Node Similarity uses components to improve performance. A string is taken as the node property holding precomputed components.",
            "anyOf": [{"type": "boolean"}, {"type": "string"}]
        }
    }))
}

fn knn_properties() -> Map<String, Value> {
    properties(json!({
        "nodeProperties": {
            "description": "The node properties to use for similarity computation, a single name, a list, or a map of property name to similarity metric.",
            "anyOf": [
                {"type": "string"},
                {"type": "array", "items": {"type": "string"}},
                {"type": "object"}
            ]
        },
        "topK": {"type": "integer", "description": "The number of neighbours to find for each node."},
        "sampleRate": {
            "type": "number",
            "description": "Sample rate to limit the number of comparisons per node. Value must be between 0 (exclusive) and 1 (inclusive)."
        },
        "deltaThreshold": {
            "type": "number",
            "description": "Value as a percentage to determine when to stop early."
        },
        "maxIterations": {"type": "integer", "description": "Hard limit to stop the algorithm after that many iterations."},
        "randomJoins": {
            "type": "integer",
            "description": "The number of random attempts per node to connect new node neighbours based on random selection."
        },
        "initialSampler": {
            "type": "string",
            "enum": ["uniform", "randomWalk"],
            "description": "The method used to sample the first k random neighbours for each node."
        },
        "similarityCutoff": {
            "type": "number",
            "description": "Filter out from the list of K-nearest neighbours nodes with similarity below this threshold."
        },
        "perturbationRate": {
            "type": "number",
            "description": "The probability of replacing the least similar known neighbour with an encountered neighbour of equal similarity."
        }
    }))
}

fn filter_properties() -> Map<String, Value> {
    let filter = |end: &str| {
        json!({
            "description": format!("Restricts the {} nodes. A node label, or node names (matched through nodeIdentifierProperty) when nodeIdentifierProperty is given.", end),
            "anyOf": [{"type": "string"}, {"type": "array", "items": {"type": "string"}}]
        })
    };
    let mut properties = Map::new();
    properties.insert("sourceNodeFilter".to_string(), filter("source"));
    properties.insert("targetNodeFilter".to_string(), filter("target"));
    properties
}

/// One similarity tool; every variant streams `node1`, `node2`, `similarity`
pub struct SimilarityHandler {
    name: &'static str,
    description: &'static str,
    procedure: &'static str,
    filtered: bool,
    properties: Map<String, Value>,
    required: &'static [&'static str],
}

impl SimilarityHandler {
    pub fn node_similarity() -> Self {
        Self {
            name: "node_similarity",
            description: "Node Similarity compares nodes by the nodes they are connected to, using the Jaccard, Overlap or Cosine metric. Two nodes are considered similar if they share many of the same neighbours.",
            procedure: "nodeSimilarity",
            filtered: false,
            properties: node_similarity_properties(),
            required: &[],
        }
    }

    pub fn filtered_node_similarity() -> Self {
        let mut properties = node_similarity_properties();
        properties.extend(filter_properties());
        Self {
            name: "filtered_node_similarity",
            description: "Filtered Node Similarity is Node Similarity restricted to comparisons between a set of source nodes and a set of target nodes.",
            procedure: "nodeSimilarity.filtered",
            filtered: true,
            properties,
            required: &[],
        }
    }

    pub fn k_nearest_neighbors() -> Self {
        Self {
            name: "k_nearest_neighbors",
            description: "The K-Nearest Neighbors algorithm computes a similarity score between pairs of nodes based on their node properties and links each node to its k most similar neighbours.",
            procedure: "knn",
            filtered: false,
            properties: knn_properties(),
            required: &["nodeProperties"],
        }
    }

    pub fn filtered_k_nearest_neighbors() -> Self {
        let mut properties = knn_properties();
        properties.extend(filter_properties());
        properties.insert(
            "seedTargetNodes".to_string(),
            json!({
                "type": "boolean",
                "description": "Seed the initial neighbour sets with target nodes only."
            }),
        );
        Self {
            name: "filtered_k_nearest_neighbors",
            description: "Filtered K-Nearest Neighbors restricts K-Nearest Neighbors to a set of source nodes and a set of target nodes.",
            procedure: "knn.filtered",
            filtered: true,
            properties,
            required: &["nodeProperties"],
        }
    }
}

/// Turn a name filter into node ids: a single name resolves to the best
/// match, a list to every match
async fn resolve_filter(
    gds: &GdsService,
    property: &str,
    filter: Value,
) -> Result<Option<Value>, AlgorithmError> {
    match filter {
        Value::String(name) => Ok(gds.find_node_id(property, &name).await?.map(Value::from)),
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            Ok(Some(json!(gds.find_node_ids(property, &names).await?)))
        }
        other => Ok(Some(other)),
    }
}

#[async_trait]
impl AlgorithmHandler for SimilarityHandler {
    fn definition(&self) -> ToolDefinition {
        let mut properties = self.properties.clone();
        properties.insert(
            NODE_IDENTIFIER_PROPERTY.to_string(),
            json!({
                "type": "string",
                "description": "Node property used to add node1Name and node2Name to each result row."
            }),
        );
        ToolDefinition {
            name: self.name,
            description: self.description,
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": self.required,
            }),
        }
    }

    async fn execute(
        &self,
        gds: &GdsService,
        arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError> {
        let identifier = optional_str(&arguments, NODE_IDENTIFIER_PROPERTY)?;
        let mut config = forwarded_config(&self.definition(), &arguments, &[NODE_IDENTIFIER_PROPERTY]);

        if let (true, Some(property)) = (self.filtered, identifier.as_deref()) {
            for key in FILTER_KEYS {
                if let Some(filter) = config.remove(key) {
                    // An unmatched single name leaves the filter out entirely
                    if let Some(resolved) = resolve_filter(gds, property, filter).await? {
                        config.insert(key.to_string(), resolved);
                    }
                }
            }
        }
        info!("{} parameters: {:?}", self.name, config);

        let procedure = self.procedure;
        let mut rows = gds
            .with_projection(Direction::Directed, |graph| async move {
                gds.stream(&graph, procedure, config)
                    .await
                    .map_err(AlgorithmError::from)
            })
            .await?;

        if let Some(property) = identifier {
            attach_node_names(
                gds,
                &mut rows,
                &property,
                &[("node1", "node1Name"), ("node2", "node2Name")],
            )
            .await?;
        }
        Ok(rows_to_value(rows))
    }
}
