//! Ephemeral Graph Projections
//!
//! Every GDS algorithm runs against an in-memory projection. This module
//! builds one on demand from whatever is currently stored:
//!
//! 1. [`SchemaProber`] lists node and relationship property keys and samples
//!    each one to infer a [`PropertyType`]
//! 2. [`ProjectionSpec`] turns the projectable descriptors into a single
//!    `gds.graph.project` Cypher aggregation with per-property coercions
//! 3. [`ProjectionGuard`] / [`with_projection`] own the projection for one
//!    unit of work and drop it on every exit path
//!
//! # Ordering
//!
//! Probing strictly precedes creation, which strictly precedes the caller's
//! algorithm, which strictly precedes teardown. A probe failure aborts before
//! anything exists in the GDS catalog, so there is nothing to clean up.
//!
//! # Isolation
//!
//! Concurrent tool calls each get their own randomly named projection; no
//! locking happens at this layer.

mod builder;
mod error;
mod lifecycle;
mod schema;

pub use builder::{
    generate_graph_name, Coercion, Direction, ProjectionBuilder, ProjectionSpec, ProjectionStats,
    GRAPH_NAME_PREFIX,
};
pub use error::ProjectionError;
pub use lifecycle::{with_projection, ProjectionGuard, ProjectionHandle};
pub use schema::{
    infer_property_type, PropertyDescriptor, PropertyKey, PropertyOwner, PropertyType,
    SchemaProber, SAMPLE_LIMIT,
};
