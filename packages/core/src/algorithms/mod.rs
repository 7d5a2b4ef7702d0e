//! Algorithm Tool Catalogue
//!
//! Each MCP tool is an [`AlgorithmHandler`]: a JSON-schema definition plus an
//! `execute` that forwards the schema-declared arguments to a GDS procedure as
//! its configuration map. Handlers never build projections themselves; they go
//! through [`GdsService::with_projection`](crate::services::GdsService::with_projection).
//!
//! ## Categories
//!
//! - [`graph_info`] - node counts and property keys
//! - [`centrality`] - ArticleRank, degree, PageRank
//! - [`community`] - conductance, HDBSCAN, k-core, k-1 coloring, k-means,
//!   label propagation, Leiden
//! - [`path`] - Dijkstra, delta-stepping, A*, Yen's
//! - [`similarity`] - node similarity and k-nearest neighbours (plain and filtered)

mod arguments;
pub mod centrality;
pub mod community;
pub mod graph_info;
pub mod path;
pub mod similarity;

use crate::db::StoreError;
use crate::projection::ProjectionError;
use crate::services::GdsService;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub(crate) use arguments::{
    attach_node_names, forwarded_config, optional_str, required_str, rows_to_value, string_list,
};

/// Errors surfaced by tool execution
#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("Unknown tool: {0}.")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AlgorithmError {
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

/// MCP tool definition
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Argument names declared in `inputSchema.properties`
    pub fn property_names(&self) -> Vec<&str> {
        self.input_schema["properties"]
            .as_object()
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Argument names listed in `inputSchema.required`
    pub fn required(&self) -> Vec<&str> {
        self.input_schema["required"]
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// One callable tool
#[async_trait]
pub trait AlgorithmHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool; `arguments` has already been checked against the
    /// definition's required list
    async fn execute(
        &self,
        gds: &GdsService,
        arguments: Map<String, Value>,
    ) -> Result<Value, AlgorithmError>;
}

/// Name -> handler lookup, in registration order
pub struct AlgorithmRegistry {
    handlers: Vec<Box<dyn AlgorithmHandler>>,
}

impl AlgorithmRegistry {
    /// Registry with no tools
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registry with the full tool catalogue
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for handler in graph_info::handlers()
            .into_iter()
            .chain(centrality::handlers())
            .chain(community::handlers())
            .chain(path::handlers())
            .chain(similarity::handlers())
        {
            registry.register(handler);
        }
        registry
    }

    /// Add a handler, replacing any existing one with the same name
    pub fn register(&mut self, handler: Box<dyn AlgorithmHandler>) {
        let name = handler.definition().name;
        self.handlers.retain(|h| h.definition().name != name);
        self.handlers.push(handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn AlgorithmHandler> {
        self.handlers
            .iter()
            .find(|h| h.definition().name == name)
            .map(|h| h.as_ref())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.handlers.iter().map(|h| h.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Validate `arguments` and run the named tool
    pub async fn execute(
        &self,
        gds: &GdsService,
        name: &str,
        arguments: Value,
    ) -> Result<Value, AlgorithmError> {
        let handler = self
            .get(name)
            .ok_or_else(|| AlgorithmError::UnknownTool(name.to_string()))?;

        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(AlgorithmError::invalid_arguments(format!(
                    "Arguments must be an object, got {}",
                    other
                )))
            }
        };

        let definition = handler.definition();
        let missing: Vec<&str> = definition
            .required()
            .into_iter()
            .filter(|key| arguments.get(*key).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(AlgorithmError::invalid_arguments(format!(
                "Missing required argument(s) for {}: {}",
                name,
                missing.join(", ")
            )));
        }

        handler.execute(gds, arguments).await
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_names_unique_and_complete() {
        let registry = AlgorithmRegistry::new();
        let names: HashSet<&str> = registry.definitions().iter().map(|d| d.name).collect();

        assert_eq!(names.len(), registry.len());
        for expected in [
            "count_nodes",
            "get_node_properties_keys",
            "article_rank",
            "degree_centrality",
            "pagerank",
            "conductance",
            "hdbscan",
            "k_core_decomposition",
            "k_1_coloring",
            "k_means_clustering",
            "label_propagation",
            "leiden",
            "find_shortest_path",
            "delta_stepping_shortest_path",
            "dijkstra_single_source_shortest_path",
            "a_star_shortest_path",
            "yens_shortest_paths",
            "node_similarity",
            "filtered_node_similarity",
            "k_nearest_neighbors",
            "filtered_k_nearest_neighbors",
        ] {
            assert!(names.contains(expected), "missing tool {}", expected);
        }
    }

    #[test]
    fn test_every_schema_is_an_object_schema() {
        for definition in AlgorithmRegistry::new().definitions() {
            assert_eq!(
                definition.input_schema["type"], "object",
                "{} schema type",
                definition.name
            );
            assert!(!definition.description.is_empty());
            for required in definition.required() {
                assert!(
                    definition.property_names().contains(&required),
                    "{} requires undeclared '{}'",
                    definition.name,
                    required
                );
            }
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = AlgorithmRegistry::empty();
        registry.register(Box::new(graph_info::CountNodesHandler));
        registry.register(Box::new(graph_info::CountNodesHandler));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("count_nodes").is_some());
        assert!(registry.get("nope").is_none());
    }
}
