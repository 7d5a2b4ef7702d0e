//! Path finding tools
//!
//! Endpoints are given by name and resolved through `nodeIdentifierProperty`
//! (default `name`) before any projection is opened, so an unknown node
//! never costs a projection round-trip. The GDS `path` column is not
//! requested; node ids, names and costs carry the same information.

use super::{
    forwarded_config, optional_str, required_str, rows_to_value, AlgorithmError,
    AlgorithmHandler, ToolDefinition,
};
use crate::db::Row;
use crate::projection::Direction;
use crate::services::GdsService;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

const NODE_IDENTIFIER_PROPERTY: &str = "nodeIdentifierProperty";
const DEFAULT_NODE_IDENTIFIER: &str = "name";

const PATH_COLUMNS: &[&str] = &["index", "sourceNode", "targetNode", "totalCost", "nodeIds", "costs"];

pub(crate) fn handlers() -> Vec<Box<dyn AlgorithmHandler>> {
    vec![
        Box::new(ShortestPathHandler),
        Box::new(PathHandler::delta_stepping()),
        Box::new(PathHandler::dijkstra_single_source()),
        Box::new(PathHandler::a_star()),
        Box::new(PathHandler::yens()),
    ]
}

fn not_found(message: &str) -> Value {
    json!({"found": false, "message": message})
}

fn identifier_property(arguments: &Map<String, Value>) -> Result<String, AlgorithmError> {
    Ok(optional_str(arguments, NODE_IDENTIFIER_PROPERTY)?
        .unwrap_or_else(|| DEFAULT_NODE_IDENTIFIER.to_string()))
}

fn node_identifier_schema() -> Value {
    json!({
        "type": "string",
        "description": "Node property the node names are matched against. Defaults to 'name'."
    })
}

fn weight_schema() -> Value {
    json!({
        "type": "string",
        "description": "Name of the relationship property to use as weights. If unspecified, the algorithm runs unweighted."
    })
}

fn id_list(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

/// Add `sourceNodeName`, `targetNodeName` and `nodeNames` to each path row
async fn name_paths(gds: &GdsService, property: &str, rows: &mut [Row]) -> Result<(), AlgorithmError> {
    let mut ids: Vec<i64> = rows
        .iter()
        .flat_map(|row| {
            let mut ids = id_list(row.get("nodeIds"));
            ids.extend(row.get("sourceNode").and_then(Value::as_i64));
            ids.extend(row.get("targetNode").and_then(Value::as_i64));
            ids
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let names = gds.node_names(property, &ids).await?;
    let name_of = |id: Option<i64>| {
        id.and_then(|id| names.get(&id).cloned())
            .unwrap_or(Value::Null)
    };

    for row in rows.iter_mut() {
        let node_names: Vec<Value> = id_list(row.get("nodeIds"))
            .into_iter()
            .map(|id| name_of(Some(id)))
            .collect();
        let source = name_of(row.get("sourceNode").and_then(Value::as_i64));
        let target = name_of(row.get("targetNode").and_then(Value::as_i64));
        row.insert("sourceNodeName".to_string(), source);
        row.insert("targetNodeName".to_string(), target);
        row.insert("nodeNames".to_string(), Value::Array(node_names));
    }
    Ok(())
}

/// Dijkstra source-target between two named nodes
pub struct ShortestPathHandler;

#[async_trait]
impl AlgorithmHandler for ShortestPathHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "find_shortest_path",
            description: "Find the shortest path between two nodes using Dijkstra's algorithm",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "start_node": {"type": "string", "description": "Name of the starting node"},
                    "end_node": {"type": "string", "description": "Name of the ending node"},
                    "relationship_property": {
                        "type": "string",
                        "description": "Property of the relationship to use for path finding"
                    },
                    "nodeIdentifierProperty": node_identifier_schema()
                },
                "required": ["start_node", "end_node"]
            }),
        }
    }

    async fn execute(
        &self,
        gds: &GdsService,
        arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError> {
        let start = required_str(&arguments, "start_node")?;
        let end = required_str(&arguments, "end_node")?;
        let property = identifier_property(&arguments)?;

        let (Some(source_id), Some(target_id)) = (
            gds.find_node_id(&property, &start).await?,
            gds.find_node_id(&property, &end).await?,
        ) else {
            return Ok(not_found("One or both node names not found"));
        };

        let mut config = Map::new();
        config.insert("sourceNode".to_string(), source_id.into());
        config.insert("targetNode".to_string(), target_id.into());
        if let Some(weight) = optional_str(&arguments, "relationship_property")? {
            config.insert("relationshipWeightProperty".to_string(), weight.into());
        }
        info!("Dijkstra source-target shortest path parameters: {:?}", config);

        let rows = gds
            .with_projection(Direction::Directed, |graph| async move {
                gds.stream_columns(&graph, "shortestPath.dijkstra", config, &["totalCost", "nodeIds", "costs"])
                    .await
                    .map_err(AlgorithmError::from)
            })
            .await?;

        let Some(mut best) = rows.into_iter().next() else {
            return Ok(not_found("No path found between the specified nodes"));
        };

        let node_ids = id_list(best.get("nodeIds"));
        let names = gds.node_names(&property, &node_ids).await?;
        let node_names: Vec<Value> = node_ids
            .iter()
            .map(|id| names.get(id).cloned().unwrap_or(Value::Null))
            .collect();

        Ok(json!({
            "totalCost": best.remove("totalCost").unwrap_or(Value::Null),
            "nodeIds": node_ids,
            "nodeNames": node_names,
            "costs": best.remove("costs").unwrap_or_else(|| json!([])),
        }))
    }
}

/// GDS path procedures taking named `sourceNode` and optional `targetNode`
pub struct PathHandler {
    name: &'static str,
    description: &'static str,
    procedure: &'static str,
    with_target: bool,
    extra_properties: Map<String, Value>,
    /// Forwarded when the caller leaves them out
    defaults: &'static [(&'static str, &'static str)],
}

impl PathHandler {
    pub fn delta_stepping() -> Self {
        Self {
            name: "delta_stepping_shortest_path",
            description: "The Delta-Stepping Shortest Path algorithm computes all shortest paths between a source node and all reachable nodes in the graph. It supports weighted graphs with positive relationship weights and, unlike Dijkstra Single-Source, corrects distances as it goes so it can traverse the graph in parallel. If several shortest paths exist between two nodes, the one returned may differ between runs.",
            procedure: "allShortestPaths.delta",
            with_target: false,
            extra_properties: json!({
                "delta": {
                    "type": "number",
                    "description": "The bucket width for grouping nodes with the same tentative distance to the source node."
                }
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
            defaults: &[],
        }
    }

    pub fn dijkstra_single_source() -> Self {
        Self {
            name: "dijkstra_single_source_shortest_path",
            description: "The Dijkstra Single-Source algorithm computes the shortest paths between a source node and all nodes reachable from that node. It supports weighted graphs with positive relationship weights.",
            procedure: "allShortestPaths.dijkstra",
            with_target: false,
            extra_properties: Map::new(),
            defaults: &[],
        }
    }

    pub fn a_star() -> Self {
        Self {
            name: "a_star_shortest_path",
            description: "The A* Shortest Path algorithm computes the shortest path between two nodes. It is an informed search guided by the haversine distance between geo-coordinates stored on the nodes, combined with the distance already travelled. It supports weighted graphs with positive relationship weights.",
            procedure: "shortestPath.astar",
            with_target: true,
            extra_properties: json!({
                "latitudeProperty": {
                    "type": "string",
                    "description": "The node property that stores the latitude value. Defaults to 'latitude'."
                },
                "longitudeProperty": {
                    "type": "string",
                    "description": "The node property that stores the longitude value. Defaults to 'longitude'."
                }
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
            defaults: &[("latitudeProperty", "latitude"), ("longitudeProperty", "longitude")],
        }
    }

    pub fn yens() -> Self {
        Self {
            name: "yens_shortest_paths",
            description: "Yen's Shortest Path algorithm computes up to k shortest paths between two nodes, discovered in order of total cost. For k = 1 it behaves exactly like Dijkstra's shortest path algorithm. It supports weighted graphs with positive relationship weights and respects parallel relationships.",
            procedure: "shortestPath.yens",
            with_target: true,
            extra_properties: json!({
                "k": {
                    "type": "integer",
                    "description": "The number of shortest paths to compute between source and target node."
                }
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
            defaults: &[],
        }
    }
}

#[async_trait]
impl AlgorithmHandler for PathHandler {
    fn definition(&self) -> ToolDefinition {
        let mut properties = Map::new();
        properties.insert(
            "sourceNode".to_string(),
            json!({"type": "string", "description": "Name of the source node to find shortest paths from."}),
        );
        let mut required = vec!["sourceNode"];
        if self.with_target {
            properties.insert(
                "targetNode".to_string(),
                json!({"type": "string", "description": "Name of the target node to find shortest paths to."}),
            );
            required.push("targetNode");
        }
        properties.extend(self.extra_properties.clone());
        properties.insert("relationshipWeightProperty".to_string(), weight_schema());
        properties.insert(NODE_IDENTIFIER_PROPERTY.to_string(), node_identifier_schema());

        ToolDefinition {
            name: self.name,
            description: self.description,
            input_schema: json!({"type": "object", "properties": properties, "required": required}),
        }
    }

    async fn execute(
        &self,
        gds: &GdsService,
        arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError> {
        let property = identifier_property(&arguments)?;
        let mut config = forwarded_config(&self.definition(), &arguments, &[NODE_IDENTIFIER_PROPERTY]);

        for key in ["sourceNode", "targetNode"] {
            if key == "targetNode" && !self.with_target {
                continue;
            }
            let name = required_str(&arguments, key)?;
            match gds.find_node_id(&property, &name).await? {
                Some(id) => {
                    config.insert(key.to_string(), id.into());
                }
                None => return Ok(not_found(&format!("Node '{}' not found", name))),
            }
        }
        for (key, default) in self.defaults {
            config
                .entry(key.to_string())
                .or_insert_with(|| Value::from(*default));
        }
        info!("{} parameters: {:?}", self.name, config);

        let procedure = self.procedure;
        let mut rows = gds
            .with_projection(Direction::Directed, |graph| async move {
                gds.stream_columns(&graph, procedure, config, PATH_COLUMNS)
                    .await
                    .map_err(AlgorithmError::from)
            })
            .await?;

        if rows.is_empty() && self.with_target {
            return Ok(not_found("No path found between the specified nodes"));
        }
        name_paths(gds, &property, &mut rows).await?;
        Ok(rows_to_value(rows))
    }
}
