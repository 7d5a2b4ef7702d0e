//! Projection Builder
//!
//! Turns probed property descriptors into one `gds.graph.project` Cypher
//! aggregation and submits it.
//!
//! The generated statement matches every node (isolated ones included) and
//! every relationship; no label or type filtering happens here. Labels and
//! relationship types are carried into the projection so handlers can filter
//! afterwards.

use crate::db::{GraphStore, Row, Statement};
use crate::projection::{
    PropertyDescriptor, PropertyKey, PropertyOwner, PropertyType, ProjectionError,
    ProjectionGuard, SchemaProber,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Prefix of every ephemeral graph name
pub const GRAPH_NAME_PREFIX: &str = "temp_graph_";

/// Fresh graph name: prefix plus 128 random bits in hex
///
/// Concurrent projections rely on this never colliding.
pub fn generate_graph_name() -> String {
    format!("{}{}", GRAPH_NAME_PREFIX, Uuid::new_v4().simple())
}

/// Which relationship directions the projection materializes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Only the stored direction
    #[default]
    Directed,
    /// Every relationship type traversable both ways
    Undirected,
}

impl Direction {
    pub fn from_undirected(undirected: bool) -> Self {
        if undirected {
            Self::Undirected
        } else {
            Self::Directed
        }
    }
}

/// Type conversion applied to a property value as it enters the projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Integers and integer lists pass through unchanged
    Identity,
    ToFloat,
    ToFloatList,
}

impl Coercion {
    /// Coercion for a projectable type, `None` for strings and unsupported types
    pub fn for_type(property_type: PropertyType) -> Option<Self> {
        match property_type {
            PropertyType::Integer | PropertyType::IntegerList => Some(Self::Identity),
            PropertyType::Float => Some(Self::ToFloat),
            PropertyType::FloatList => Some(Self::ToFloatList),
            PropertyType::String | PropertyType::Unsupported => None,
        }
    }

    /// Cypher expression reading `key` from `variable`
    pub fn expression(self, variable: &str, key: &PropertyKey) -> String {
        let access = format!("{}.{}", variable, key.quoted());
        match self {
            Self::Identity => access,
            Self::ToFloat => format!("toFloat({})", access),
            Self::ToFloatList => format!("toFloatList({})", access),
        }
    }
}

/// Everything needed to materialize one ephemeral projection
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSpec {
    graph_name: String,
    direction: Direction,
    node_properties: BTreeMap<PropertyKey, Coercion>,
    relationship_properties: BTreeMap<PropertyKey, Coercion>,
}

impl ProjectionSpec {
    /// Build a spec with a freshly generated graph name
    ///
    /// `descriptors` is the prober's output and doubles as the allow-list:
    /// only keys present there can appear in the statement.
    pub fn from_descriptors(direction: Direction, descriptors: &[PropertyDescriptor]) -> Self {
        let mut node_properties = BTreeMap::new();
        let mut relationship_properties = BTreeMap::new();

        for descriptor in descriptors {
            let Some(coercion) = Coercion::for_type(descriptor.inferred_type) else {
                debug!(
                    "Excluding {} property '{}' ({:?})",
                    descriptor.owner, descriptor.key, descriptor.inferred_type
                );
                continue;
            };
            let target = match descriptor.owner {
                PropertyOwner::Node => &mut node_properties,
                PropertyOwner::Relationship => &mut relationship_properties,
            };
            target.insert(descriptor.key.clone(), coercion);
        }

        Self {
            graph_name: generate_graph_name(),
            direction,
            node_properties,
            relationship_properties,
        }
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node_properties(&self) -> &BTreeMap<PropertyKey, Coercion> {
        &self.node_properties
    }

    pub fn relationship_properties(&self) -> &BTreeMap<PropertyKey, Coercion> {
        &self.relationship_properties
    }

    /// Whether `key` made it into the node or relationship property map
    pub fn includes(&self, owner: PropertyOwner, key: &str) -> bool {
        let map = match owner {
            PropertyOwner::Node => &self.node_properties,
            PropertyOwner::Relationship => &self.relationship_properties,
        };
        map.keys().any(|k| k.as_str() == key)
    }

    fn property_map(properties: &BTreeMap<PropertyKey, Coercion>, variable: &str) -> String {
        let entries: Vec<String> = properties
            .iter()
            .map(|(key, coercion)| format!("{}: {}", key.quoted(), coercion.expression(variable, key)))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }

    /// The projection-creation statement; the graph name is a parameter
    pub fn to_statement(&self) -> Statement {
        let mut data_config = vec![
            "sourceNodeLabels: labels(source)".to_string(),
            "targetNodeLabels: labels(target)".to_string(),
            "relationshipType: type(r)".to_string(),
        ];
        if !self.node_properties.is_empty() {
            data_config.push(format!(
                "sourceNodeProperties: {}",
                Self::property_map(&self.node_properties, "source")
            ));
            data_config.push(format!(
                "targetNodeProperties: {}",
                Self::property_map(&self.node_properties, "target")
            ));
        }
        if !self.relationship_properties.is_empty() {
            data_config.push(format!(
                "relationshipProperties: {}",
                Self::property_map(&self.relationship_properties, "r")
            ));
        }

        let configuration = match self.direction {
            Direction::Directed => "{}",
            Direction::Undirected => "{undirectedRelationshipTypes: ['*']}",
        };

        let text = format!(
            "MATCH (source)\n\
             OPTIONAL MATCH (source)-[r]->(target)\n\
             WITH gds.graph.project(\n  $graphName,\n  source,\n  target,\n  {{{}}},\n  {}\n) AS g\n\
             RETURN g.graphName AS graphName, g.nodeCount AS nodeCount, \
             g.relationshipCount AS relationshipCount, g.projectMillis AS projectMillis",
            data_config.join(", "),
            configuration
        );

        Statement::new(text).param("graphName", self.graph_name.as_str())
    }
}

/// Statistics GDS reports for a freshly created projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionStats {
    pub graph_name: String,
    #[serde(default)]
    pub node_count: u64,
    #[serde(default)]
    pub relationship_count: u64,
    #[serde(default)]
    pub project_millis: u64,
}

impl ProjectionStats {
    /// Read the statistics row; missing counters default to zero
    pub fn from_row(graph_name: &str, row: Row) -> Self {
        serde_json::from_value(serde_json::Value::Object(row)).unwrap_or_else(|_| Self {
            graph_name: graph_name.to_string(),
            node_count: 0,
            relationship_count: 0,
            project_millis: 0,
        })
    }
}

/// Probes the schema and opens ephemeral projections
#[derive(Clone)]
pub struct ProjectionBuilder {
    store: Arc<dyn GraphStore>,
}

impl ProjectionBuilder {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Probe the store and assemble a spec without creating anything
    pub async fn build_spec(&self, direction: Direction) -> Result<ProjectionSpec, ProjectionError> {
        let descriptors = SchemaProber::new(self.store.as_ref())
            .probe_all()
            .await
            .map_err(ProjectionError::schema_probe)?;

        Ok(ProjectionSpec::from_descriptors(direction, &descriptors))
    }

    /// Probe, create the projection, and hand back a guard that owns it
    #[instrument(skip(self))]
    pub async fn open(&self, direction: Direction) -> Result<ProjectionGuard, ProjectionError> {
        let spec = self.build_spec(direction).await?;
        let graph_name = spec.graph_name().to_string();

        let row = self
            .store
            .create_projection(&spec)
            .await
            .map_err(|e| ProjectionError::create(&graph_name, e))?;
        let stats = ProjectionStats::from_row(&graph_name, row);

        info!(
            "Projected graph '{}' ({} nodes, {} relationships, {:?}, node properties: {:?}, relationship properties: {:?})",
            graph_name,
            stats.node_count,
            stats.relationship_count,
            direction,
            spec.node_properties().keys().map(PropertyKey::as_str).collect::<Vec<_>>(),
            spec.relationship_properties().keys().map(PropertyKey::as_str).collect::<Vec<_>>()
        );

        Ok(ProjectionGuard::new(self.store.clone(), graph_name, stats))
    }
}
