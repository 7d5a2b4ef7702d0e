//! GraphStore Trait - Database Abstraction Layer
//!
//! The `GraphStore` trait abstracts the three kinds of round-trip the GDS
//! tool layer makes against Neo4j:
//!
//! - plain parameterized Cypher (`query`)
//! - ephemeral projection creation (`create_projection`)
//! - ephemeral projection teardown (`drop_projection`)
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every method is a network call
//! 2. **Rows as JSON maps**: results are column-name -> `serde_json::Value`
//!    so handlers can return them to MCP clients without re-encoding
//! 3. **Parameters, not interpolation**: values always travel in
//!    [`Statement::parameters`]; only identifiers vetted elsewhere are ever
//!    embedded in statement text

use crate::db::StoreError;
use crate::projection::ProjectionSpec;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One result row: column name -> value
pub type Row = Map<String, Value>;

/// A Cypher statement plus its parameter map
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub parameters: Map<String, Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Map::new(),
        }
    }

    /// Bind a parameter (`$key` in the statement text)
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Abstraction over the live Neo4j database
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: a single store is shared by every
/// concurrently running tool call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a statement and collect every row
    ///
    /// Returns an empty vector when the statement matches nothing.
    async fn query(&self, statement: Statement) -> Result<Vec<Row>, StoreError>;

    /// Materialize the in-memory projection described by `spec`
    ///
    /// Returns the statistics row reported by GDS (`graphName`, `nodeCount`,
    /// `relationshipCount`, `projectMillis`). Fails if the graph name is
    /// already taken or a coercion expression fails on a stored value.
    async fn create_projection(&self, spec: &ProjectionSpec) -> Result<Row, StoreError>;

    /// Remove the in-memory projection named `graph_name`
    ///
    /// A graph that no longer exists is not an error.
    async fn drop_projection(&self, graph_name: &str) -> Result<(), StoreError>;
}
