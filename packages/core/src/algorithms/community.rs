//! Community detection tools

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

pub(crate) fn handlers() -> Vec<Box<dyn AlgorithmHandler>> {
    vec![
        Box::new(CommunityHandler::conductance()),
        Box::new(CommunityHandler::hdbscan()),
        Box::new(CommunityHandler::k_core_decomposition()),
        Box::new(CommunityHandler::k_1_coloring()),
        Box::new(CommunityHandler::k_means_clustering()),
        Box::new(CommunityHandler::label_propagation()),
        Box::new(CommunityHandler::leiden()),
    ]
}

fn properties(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn min_community_size() -> Value {
    json!({
        "type": "integer",
        "description": "Only nodes inside communities larger or equal the given value are returned."
    })
}

/// A community tool streaming one row per node (or per community, for
/// conductance)
pub struct CommunityHandler {
    name: &'static str,
    description: &'static str,
    procedure: &'static str,
    direction: Direction,
    /// Rows carry `nodeId`, so `nodeIdentifierProperty` can label them
    per_node: bool,
    properties: Map<String, Value>,
    required: &'static [&'static str],
}

impl CommunityHandler {
    pub fn conductance() -> Self {
        Self {
            name: "conductance",
            description: "Calculate the conductance metric for all communities",
            procedure: "conductance",
            direction: Direction::Directed,
            per_node: false,
            properties: properties(json!({
                "communityProperty": {
                    "type": "string",
                    "description": "The node property that holds the community ID as an integer for each node. Only non-negative community IDs are considered valid and will have their conductance computed."
                },
                "relationshipWeightProperty": {
                    "type": "string",
                    "description": "The relationship property that holds the weight of the relationships. If not provided, all relationships are considered to have a weight of 1."
                }
            })),
            required: &["communityProperty"],
        }
    }

    pub fn hdbscan() -> Self {
        Self {
            name: "hdbscan",
            description: "Perform HDBSCAN (Hierarchical Density-Based Spatial Clustering of Applications with Noise) clustering on the graph. HDBSCAN runs DBSCAN over a range of parameters and builds a hierarchy of clusters, so it finds clusters of varying densities without tuning a density parameter.",
            procedure: "hdbscan",
            direction: Direction::Directed,
            per_node: true,
            properties: properties(json!({
                "nodeProperty": {
                    "type": "string",
                    "description": "A node property corresponding to an array of floats used by HDBSCAN to compute clusters"
                },
                "minClusterSize": {
                    "type": "integer",
                    "description": "The minimum number of nodes that a cluster should contain."
                },
                "samples": {
                    "type": "integer",
                    "description": "The number of neighbours to be considered when computing the core distances of a node."
                },
                "leafSize": {
                    "type": "integer",
                    "description": "The number of leaf nodes of the supporting tree data structure."
                }
            })),
            required: &["nodeProperty"],
        }
    }

    pub fn k_core_decomposition() -> Self {
        Self {
            name: "k_core_decomposition",
            description: "The K-core decomposition separates the nodes in a graph into groups based on the degree sequence and topology of the graph. Each node is associated with a core value: the largest i such that the node belongs to a maximal subgraph in which every node has degree at least i. The largest core value is the degeneracy of the graph.",
            procedure: "kcore",
            direction: Direction::Undirected,
            per_node: true,
            properties: Map::new(),
            required: &[],
        }
    }

    pub fn k_1_coloring() -> Self {
        Self {
            name: "k_1_coloring",
            description: "The K-1 Coloring algorithm assigns a color to every node in the graph, trying to give every neighbour of a node a different color while using as few colors as possible. The algorithm is greedy: the result is neither guaranteed optimal nor always correct, and its precision is controlled by the number of iterations.",
            procedure: "k1coloring",
            direction: Direction::Directed,
            per_node: true,
            properties: properties(json!({
                "maxIterations": {
                    "type": "integer",
                    "description": "The maximum number of iterations to run the coloring algorithm."
                },
                "minCommunitySize": min_community_size()
            })),
            required: &[],
        }
    }

    pub fn k_means_clustering() -> Self {
        Self {
            name: "k_means_clustering",
            description: "K-Means clustering classifies nodes into k clusters based on a float array node property. Nodes are positioned as points in a d-dimensional space and repeatedly assigned to the nearest of k centroids until results stabilize or the maximum number of iterations is reached. Relationships are ignored.",
            procedure: "kmeans",
            direction: Direction::Directed,
            per_node: true,
            properties: properties(json!({
                "nodeProperty": {
                    "type": "string",
                    "description": "A node property corresponding to an array of floats used by K-Means to cluster nodes into communities."
                },
                "k": {"type": "integer", "description": "The number of clusters to create."},
                "maxIterations": {
                    "type": "integer",
                    "description": "The maximum number of iterations the algorithm will run."
                },
                "deltaThreshold": {
                    "type": "number",
                    "description": "Value as a percentage to determine when to stop early. If fewer than 'deltaThreshold * |nodes|' nodes change their cluster, the algorithm stops. Value must be between 0 (exclusive) and 1 (inclusive)."
                },
                "numberOfRestarts": {
                    "type": "integer",
                    "description": "Number of times to execute K-Means with different initial centers. The communities returned are those minimizing the average node-center distances."
                },
                "initialSampler": {
                    "type": "string",
                    "enum": ["uniform", "kmeans++"],
                    "description": "The method used to sample the first k centroids."
                },
                "seedCentroids": {
                    "type": "array",
                    "items": {"type": "array", "items": {"type": "number"}},
                    "description": "Explicit initial centroids. Cannot be combined with a non-default numberOfRestarts."
                },
                "computeSilhouette": {
                    "type": "boolean",
                    "description": "If set to true, the silhouette scores are computed once the clustering has been determined."
                }
            })),
            required: &["nodeProperty"],
        }
    }

    pub fn label_propagation() -> Self {
        Self {
            name: "label_propagation",
            description: "The Label Propagation algorithm (LPA) is a fast algorithm for finding communities in a graph. It propagates labels throughout the network and forms communities from the result, using network structure alone.",
            procedure: "labelPropagation",
            direction: Direction::Directed,
            per_node: true,
            properties: properties(json!({
                "maxIterations": {"type": "integer", "description": "The maximum number of iterations to run."},
                "nodeWeightProperty": {
                    "type": "string",
                    "description": "The name of a node property that contains node weights."
                },
                "relationshipWeightProperty": {
                    "type": "string",
                    "description": "Name of the relationship property to use as weights. If unspecified, the algorithm runs unweighted."
                },
                "seedProperty": {
                    "type": "string",
                    "description": "The name of a node property that defines an initial numeric label."
                },
                "consecutiveIds": {
                    "type": "boolean",
                    "description": "Whether component identifiers are mapped into a consecutive id space (requires additional memory)."
                },
                "minCommunitySize": min_community_size()
            })),
            required: &[],
        }
    }

    pub fn leiden() -> Self {
        Self {
            name: "leiden",
            description: "The Leiden algorithm detects communities in large networks by maximizing modularity. It refines Louvain by periodically breaking communities into smaller well-connected ones.",
            procedure: "leiden",
            direction: Direction::Undirected,
            per_node: true,
            properties: properties(json!({
                "maxLevels": {
                    "type": "integer",
                    "description": "The maximum number of levels in which the graph is clustered and then condensed."
                },
                "gamma": {
                    "type": "number",
                    "description": "Resolution parameter used when computing the modularity."
                },
                "theta": {
                    "type": "number",
                    "description": "Controls the randomness while breaking a community into smaller ones."
                },
                "tolerance": {
                    "type": "number",
                    "description": "Minimum change in modularity between iterations."
                },
                "includeIntermediateCommunities": {
                    "type": "boolean",
                    "description": "Whether to return intermediate communities as well as the final one."
                },
                "seedProperty": {
                    "type": "string",
                    "description": "Initial community for a node. The property value needs to be a non-negative number."
                },
                "minCommunitySize": min_community_size()
            })),
            required: &[],
        }
    }
}

#[async_trait]
impl AlgorithmHandler for CommunityHandler {
    fn definition(&self) -> ToolDefinition {
        let mut properties = self.properties.clone();
        if self.per_node {
            properties.insert(
                NODE_IDENTIFIER_PROPERTY.to_string(),
                json!({
                    "type": "string",
                    "description": "Node property used to label each result row with a nodeName."
                }),
            );
        }
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
        let config = forwarded_config(&self.definition(), &arguments, &[NODE_IDENTIFIER_PROPERTY]);
        info!("{} parameters: {:?}", self.name, config);

        let procedure = self.procedure;
        let mut rows = gds
            .with_projection(self.direction, |graph| async move {
                gds.stream(&graph, procedure, config)
                    .await
                    .map_err(AlgorithmError::from)
            })
            .await?;

        if let Some(property) = identifier.filter(|_| self.per_node) {
            attach_node_names(gds, &mut rows, &property, &[("nodeId", "nodeName")]).await?;
        }
        Ok(rows_to_value(rows))
    }
}
