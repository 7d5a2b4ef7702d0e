//! End-to-end projection behaviour against an in-memory store

mod common;

use common::{Event, MemoryStore};
use gds_mcp_core::db::{GraphStore, StoreError};
use gds_mcp_core::projection::{with_projection, Direction, ProjectionError};
use gds_mcp_core::{AlgorithmError, AlgorithmRegistry, GdsService};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn scenario_a() -> MemoryStore {
    MemoryStore::new()
        .with_node(json!({"name": "X", "weight": 5}))
        .with_node(json!({"name": "Y", "weight": 7}))
        .with_relationship(json!({"time": 3.5}))
}

#[tokio::test]
async fn test_numeric_properties_projected_with_coercions() {
    let store = Arc::new(scenario_a());
    let dyn_store: Arc<dyn GraphStore> = store.clone();

    let result: Result<(), ProjectionError> =
        with_projection(&dyn_store, Direction::Directed, |_| async { Ok(()) }).await;
    assert_ok!(result);

    let created = store.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].node_properties, vec!["weight"]);
    assert_eq!(created[0].relationship_properties, vec!["time"]);
    assert!(created[0].statement.contains("source.`weight`"));
    assert!(created[0].statement.contains("toFloat(r.`time`)"));
    assert!(!created[0].statement.contains("`name`"));
    assert_eq!(store.dropped(), vec![created[0].graph_name.clone()]);
}

#[tokio::test]
async fn test_mixed_type_property_excluded_everywhere() {
    let store = Arc::new(
        MemoryStore::new()
            .with_node(json!({"score": "high"}))
            .with_node(json!({"score": 2}))
            .with_node(json!({"score": 3, "rank": 1}))
            .with_relationship(json!({"score": "high"}))
            .with_relationship(json!({"score": 2.5})),
    );
    let dyn_store: Arc<dyn GraphStore> = store.clone();

    let result: Result<(), ProjectionError> =
        with_projection(&dyn_store, Direction::Directed, |_| async { Ok(()) }).await;
    assert_ok!(result);

    let created = &store.created()[0];
    assert_eq!(created.node_properties, vec!["rank"]);
    assert!(created.relationship_properties.is_empty());
    assert!(!created.statement.contains("`score`"));
}

#[tokio::test]
async fn test_concurrent_calls_get_distinct_projections() {
    let store = Arc::new(scenario_a().with_create_delay(Duration::from_millis(20)));
    let dyn_store: Arc<dyn GraphStore> = store.clone();

    let slow = with_projection(&dyn_store, Direction::Directed, |graph| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, ProjectionError>(graph.graph_name().to_string())
    });
    let fast = with_projection(&dyn_store, Direction::Undirected, |graph| async move {
        Ok::<_, ProjectionError>(graph.graph_name().to_string())
    });
    let (slow, fast) = tokio::join!(slow, fast);
    let (slow, fast) = (slow.unwrap(), fast.unwrap());

    assert_ne!(slow, fast);
    let mut dropped = store.dropped();
    dropped.sort();
    let mut expected = vec![slow.clone(), fast.clone()];
    expected.sort();
    assert_eq!(dropped, expected);

    // The fast call finishes without waiting for the slow one
    let events = store.events();
    let fast_drop = events.iter().position(|e| *e == Event::Drop(fast.clone()));
    let slow_drop = events.iter().position(|e| *e == Event::Drop(slow.clone()));
    assert!(fast_drop < slow_drop);
}

#[tokio::test]
async fn test_algorithm_failure_still_drops_and_surfaces_algorithm_error() {
    let store = Arc::new(scenario_a().with_failing_procedure("pageRank"));
    let gds = GdsService::new(store.clone());

    let err = assert_err!(
        AlgorithmRegistry::new()
            .execute(&gds, "pagerank", json!({}))
            .await
    );
    match err {
        AlgorithmError::Store(StoreError::Neo4j { message, .. }) => {
            assert_eq!(message, "pageRank failed")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let events = store.events();
    let graph_name = store.created()[0].graph_name.clone();
    assert_eq!(events.last(), Some(&Event::Drop(graph_name)));
}

#[tokio::test]
async fn test_undirected_tools_project_undirected() {
    let store = Arc::new(scenario_a().with_stream_rows("kcore", json!([{"nodeId": 0, "coreValue": 1}])));
    let gds = GdsService::new(store.clone());
    let registry = AlgorithmRegistry::new();

    assert_ok!(registry.execute(&gds, "k_core_decomposition", json!({})).await);
    assert_ok!(registry.execute(&gds, "degree_centrality", json!({})).await);

    let created = store.created();
    assert_eq!(created[0].direction, Direction::Undirected);
    assert!(created[0].statement.contains("undirectedRelationshipTypes: ['*']"));
    assert_eq!(created[1].direction, Direction::Directed);
    assert!(!created[1].statement.contains("undirectedRelationshipTypes"));
}
