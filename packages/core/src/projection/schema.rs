//! Schema Prober
//!
//! Discovers which property keys exist on nodes and relationships and
//! classifies each one from a bounded sample of stored values.
//!
//! Classification is a heuristic: only [`SAMPLE_LIMIT`] non-null values are
//! inspected per key, so a property that is numeric in the sample but holds
//! strings elsewhere will be misclassified. GDS then rejects the projection
//! and the error reaches the caller unchanged.

use crate::db::{GraphStore, Statement, StoreError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Maximum number of non-null values sampled per property key
pub const SAMPLE_LIMIT: usize = 10;

/// Whether a property lives on nodes or on relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyOwner {
    Node,
    Relationship,
}

impl PropertyOwner {
    /// `MATCH` clause binding every entity of this kind to `e`
    fn match_clause(self) -> &'static str {
        match self {
            Self::Node => "MATCH (e)",
            Self::Relationship => "MATCH ()-[e]->()",
        }
    }
}

impl fmt::Display for PropertyOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Relationship => write!(f, "relationship"),
        }
    }
}

/// A property key reported by the store
///
/// Only the prober can create these, which makes the prober's output the
/// allow-list of names that may be embedded in generated Cypher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(String);

impl PropertyKey {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted Cypher identifier, embedded backticks doubled
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0.replace('`', "``"))
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime type inferred from sampled values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Integer,
    Float,
    IntegerList,
    FloatList,
    Unsupported,
}

impl PropertyType {
    /// GDS only accepts numeric scalars and numeric arrays
    pub fn is_projectable(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::IntegerList | Self::FloatList
        )
    }
}

/// Inferred type of one property key on one kind of entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub key: PropertyKey,
    pub owner: PropertyOwner,
    pub inferred_type: PropertyType,
}

/// Shape of a single sampled value
enum Shape {
    Text,
    Number { fractional: bool },
    NumberList { fractional: bool },
    Other,
}

fn is_fractional(n: &serde_json::Number) -> bool {
    match n.as_f64() {
        Some(f) if !(n.is_i64() || n.is_u64()) => f.fract() != 0.0,
        _ => false,
    }
}

fn shape_of(value: &Value) -> Shape {
    match value {
        Value::String(_) => Shape::Text,
        Value::Number(n) => Shape::Number {
            fractional: is_fractional(n),
        },
        Value::Array(items) if !items.is_empty() => {
            let mut fractional = false;
            for item in items {
                match item {
                    Value::Number(n) => fractional |= is_fractional(n),
                    _ => return Shape::Other,
                }
            }
            Shape::NumberList { fractional }
        }
        _ => Shape::Other,
    }
}

/// Classify a property from its sampled non-null values
///
/// - every value a string -> `String`
/// - strings mixed with anything else -> `Unsupported`
/// - numeric scalars -> `Integer` when all whole-valued, otherwise `Float`
/// - non-empty numeric lists -> `IntegerList` when all elements are
///   whole-valued, otherwise `FloatList`
/// - no samples, booleans, maps, empty lists, or scalars mixed with lists
///   -> `Unsupported`
pub fn infer_property_type(samples: &[Value]) -> PropertyType {
    if samples.is_empty() {
        return PropertyType::Unsupported;
    }

    let (mut texts, mut scalars, mut lists) = (0usize, 0usize, 0usize);
    let mut fractional = false;

    for sample in samples {
        match shape_of(sample) {
            Shape::Text => texts += 1,
            Shape::Number { fractional: f } => {
                scalars += 1;
                fractional |= f;
            }
            Shape::NumberList { fractional: f } => {
                lists += 1;
                fractional |= f;
            }
            Shape::Other => return PropertyType::Unsupported,
        }
    }

    let total = samples.len();
    if texts == total {
        PropertyType::String
    } else if scalars == total {
        if fractional {
            PropertyType::Float
        } else {
            PropertyType::Integer
        }
    } else if lists == total {
        if fractional {
            PropertyType::FloatList
        } else {
            PropertyType::IntegerList
        }
    } else {
        PropertyType::Unsupported
    }
}

/// Reads property keys and samples from the live store
///
/// Queries are never retried; the first failure is returned.
pub struct SchemaProber<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> SchemaProber<'a> {
    pub fn new(store: &'a dyn GraphStore) -> Self {
        Self { store }
    }

    /// Distinct property keys across all nodes (empty for an empty store)
    pub async fn list_node_property_keys(&self) -> Result<BTreeSet<PropertyKey>, StoreError> {
        self.list_property_keys(PropertyOwner::Node).await
    }

    /// Distinct property keys across all relationships
    pub async fn list_relationship_property_keys(
        &self,
    ) -> Result<BTreeSet<PropertyKey>, StoreError> {
        self.list_property_keys(PropertyOwner::Relationship).await
    }

    pub async fn list_property_keys(
        &self,
        owner: PropertyOwner,
    ) -> Result<BTreeSet<PropertyKey>, StoreError> {
        let statement = Statement::new(format!(
            "{} UNWIND keys(e) AS key RETURN DISTINCT key",
            owner.match_clause()
        ));

        let rows = self.store.query(statement).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("key").and_then(Value::as_str))
            .map(PropertyKey::new)
            .collect())
    }

    /// Sample up to [`SAMPLE_LIMIT`] non-null values of `key` and classify them
    pub async fn classify_property(
        &self,
        key: &PropertyKey,
        owner: PropertyOwner,
    ) -> Result<PropertyDescriptor, StoreError> {
        let statement = Statement::new(format!(
            "{} WHERE e[$key] IS NOT NULL RETURN e[$key] AS value LIMIT $limit",
            owner.match_clause()
        ))
        .param("key", key.as_str())
        .param("limit", SAMPLE_LIMIT as u64);

        let samples: Vec<Value> = self
            .store
            .query(statement)
            .await?
            .into_iter()
            .filter_map(|mut row| row.remove("value"))
            .filter(|value| !value.is_null())
            .collect();

        let inferred_type = infer_property_type(&samples);
        debug!(
            "Classified {} property '{}' as {:?} from {} samples",
            owner,
            key,
            inferred_type,
            samples.len()
        );

        Ok(PropertyDescriptor {
            key: key.clone(),
            owner,
            inferred_type,
        })
    }

    /// List and classify every property key for one kind of entity
    pub async fn probe(&self, owner: PropertyOwner) -> Result<Vec<PropertyDescriptor>, StoreError> {
        let keys = self.list_property_keys(owner).await?;
        let mut descriptors = Vec::with_capacity(keys.len());
        for key in &keys {
            descriptors.push(self.classify_property(key, owner).await?);
        }
        Ok(descriptors)
    }

    /// Node descriptors followed by relationship descriptors
    pub async fn probe_all(&self) -> Result<Vec<PropertyDescriptor>, StoreError> {
        let mut descriptors = self.probe(PropertyOwner::Node).await?;
        descriptors.extend(self.probe(PropertyOwner::Relationship).await?);
        Ok(descriptors)
    }
}
