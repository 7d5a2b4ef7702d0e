//! Graph Store Layer
//!
//! This module handles all interaction with the Neo4j database:
//!
//! - [`GraphStore`] - the async seam every other component talks through
//! - [`HttpGraphStore`] - Neo4j HTTP transactional Cypher endpoint client
//! - [`Neo4jConfig`] - connection settings (URI, credentials, database)
//!
//! Nothing above this layer builds HTTP requests or parses Neo4j responses.
//! Projection creation and teardown are part of the trait so that callers can
//! reason about (and tests can count) exactly which store round-trips happen.

mod config;
mod error;
mod graph_store;
mod http_store;

pub use config::{Neo4jConfig, DEFAULT_DATABASE, DEFAULT_URI, DEFAULT_USERNAME};
pub use error::StoreError;
pub use graph_store::{GraphStore, Row, Statement};
#[cfg(test)]
pub use graph_store::MockGraphStore;
pub use http_store::{http_base_url, HttpGraphStore};
