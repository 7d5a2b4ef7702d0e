//! Projection Error Types

use crate::db::StoreError;
use thiserror::Error;

/// Errors raised while building, creating or tearing down a projection
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// A schema probe query failed; nothing was created
    #[error("Schema probe failed: {source}")]
    SchemaProbe {
        #[source]
        source: StoreError,
    },

    /// GDS rejected the projection (name collision, bad coercion on a stored value)
    #[error("Failed to create projection '{graph_name}': {source}")]
    Create {
        graph_name: String,
        #[source]
        source: StoreError,
    },

    /// Teardown failed. Only ever logged by the lifecycle manager.
    #[error("Failed to drop projection '{graph_name}': {source}")]
    Drop {
        graph_name: String,
        #[source]
        source: StoreError,
    },
}

impl ProjectionError {
    pub fn schema_probe(source: StoreError) -> Self {
        Self::SchemaProbe { source }
    }

    pub fn create(graph_name: impl Into<String>, source: StoreError) -> Self {
        Self::Create {
            graph_name: graph_name.into(),
            source,
        }
    }

    pub fn drop_failed(graph_name: impl Into<String>, source: StoreError) -> Self {
        Self::Drop {
            graph_name: graph_name.into(),
            source,
        }
    }
}
