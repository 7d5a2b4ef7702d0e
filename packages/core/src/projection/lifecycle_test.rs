//! Tests for the projection lifecycle
//!
//! Uses a mocked `GraphStore` so every create/drop call can be counted.

use super::*;
use crate::db::{MockGraphStore, Row, StoreError};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
enum TestError {
    Projection(ProjectionError),
    Algorithm(String),
}

impl From<ProjectionError> for TestError {
    fn from(e: ProjectionError) -> Self {
        TestError::Projection(e)
    }
}

fn stats_row() -> Row {
    json!({"graphName": "g", "nodeCount": 3, "relationshipCount": 2, "projectMillis": 1})
        .as_object()
        .unwrap()
        .clone()
}

/// Mock with an empty schema and a successful create
fn empty_schema_store() -> MockGraphStore {
    let mut store = MockGraphStore::new();
    store.expect_query().returning(|_| Ok(vec![]));
    store
        .expect_create_projection()
        .times(1)
        .returning(|_| Ok(stats_row()));
    store
}

#[tokio::test]
async fn test_drop_issued_after_successful_body() {
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut store = empty_schema_store();
    let drop_events = events.clone();
    store.expect_drop_projection().times(1).returning(move |name| {
        assert!(name.starts_with("temp_graph_"));
        drop_events.lock().unwrap().push("drop");
        Ok(())
    });
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let body_events = events.clone();
    let result: Result<u32, ProjectionError> =
        with_projection(&store, Direction::Directed, |graph| async move {
            assert!(graph.graph_name().starts_with("temp_graph_"));
            tokio::task::yield_now().await;
            body_events.lock().unwrap().push("body");
            Ok(7)
        })
        .await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(*events.lock().unwrap(), vec!["body", "drop"]);
}

#[tokio::test]
async fn test_drop_issued_when_body_fails_and_body_error_surfaces() {
    let mut store = empty_schema_store();
    store
        .expect_drop_projection()
        .times(1)
        .returning(|_| Ok(()));
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let result: Result<(), TestError> = with_projection(&store, Direction::Directed, |_| async {
        Err(TestError::Algorithm("No path found".to_string()))
    })
    .await;

    match result {
        Err(TestError::Algorithm(message)) => assert_eq!(message, "No path found"),
        other => panic!("expected the body's error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_drop_failure_does_not_replace_body_error() {
    let mut store = empty_schema_store();
    store
        .expect_drop_projection()
        .times(1)
        .returning(|name| {
            Err(StoreError::neo4j(
                "Neo.ClientError.Procedure.ProcedureCallFailed",
                format!("Graph with name `{}` does not exist", name),
            ))
        });
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let result: Result<(), TestError> = with_projection(&store, Direction::Directed, |_| async {
        Err(TestError::Algorithm("boom".to_string()))
    })
    .await;

    assert!(matches!(result, Err(TestError::Algorithm(ref m)) if m == "boom"));
}

#[tokio::test]
async fn test_drop_failure_does_not_fail_successful_body() {
    let mut store = empty_schema_store();
    store
        .expect_drop_projection()
        .times(1)
        .returning(|_| Err(StoreError::malformed("connection reset")));
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let result: Result<&str, ProjectionError> =
        with_projection(&store, Direction::Directed, |_| async { Ok("ranks") }).await;

    assert_eq!(result.unwrap(), "ranks");
}

#[tokio::test]
async fn test_probe_failure_creates_and_drops_nothing() {
    let mut store = MockGraphStore::new();
    store
        .expect_query()
        .times(1)
        .returning(|_| Err(StoreError::malformed("connection reset")));
    store.expect_create_projection().never();
    store.expect_drop_projection().never();
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let mut body_ran = false;
    let result: Result<(), ProjectionError> =
        with_projection(&store, Direction::Directed, |_| {
            body_ran = true;
            async { Ok(()) }
        })
        .await;

    assert!(matches!(result, Err(ProjectionError::SchemaProbe { .. })));
    assert!(!body_ran);
}

#[tokio::test]
async fn test_create_failure_attempts_no_drop() {
    let mut store = MockGraphStore::new();
    store.expect_query().returning(|_| Ok(vec![]));
    store.expect_create_projection().times(1).returning(|_| {
        Err(StoreError::neo4j(
            "Neo.ClientError.Procedure.ProcedureCallFailed",
            "A graph with name 'temp_graph_x' already exists.",
        ))
    });
    store.expect_drop_projection().never();
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let result: Result<(), ProjectionError> =
        with_projection(&store, Direction::Undirected, |_| async { Ok(()) }).await;

    match result {
        Err(ProjectionError::Create { graph_name, source }) => {
            assert!(graph_name.starts_with("temp_graph_"));
            assert!(source.to_string().contains("already exists"));
        }
        other => panic!("expected create error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_explicit_close_drops_exactly_once() {
    let mut store = empty_schema_store();
    store
        .expect_drop_projection()
        .times(1)
        .returning(|_| Ok(()));
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let guard = ProjectionBuilder::new(store.clone())
        .open(Direction::Directed)
        .await
        .unwrap();
    assert_eq!(guard.stats().node_count, 3);

    guard.close().await.unwrap();
    // Give any stray spawned teardown a chance to run; mock enforces times(1).
    tokio::task::yield_now().await;
}

#[tokio::test]
async fn test_teardown_runs_when_body_panics() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut store = empty_schema_store();
    store
        .expect_drop_projection()
        .times(1)
        .returning(move |name| {
            let _ = tx.send(name.to_string());
            Ok(())
        });
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let task_store = store.clone();
    let joined = tokio::spawn(async move {
        let _: Result<(), ProjectionError> =
            with_projection(&task_store, Direction::Directed, |_| async {
                if true {
                    panic!("algorithm crashed");
                }
                Ok(())
            })
            .await;
    })
    .await;
    assert!(joined.is_err());

    let dropped = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("teardown was not scheduled")
        .unwrap();
    assert!(dropped.starts_with("temp_graph_"));
}

#[tokio::test]
async fn test_teardown_runs_when_caller_abandons_the_call() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut store = empty_schema_store();
    store
        .expect_drop_projection()
        .times(1)
        .returning(move |name| {
            let _ = tx.send(name.to_string());
            Ok(())
        });
    let store: Arc<dyn GraphStore> = Arc::new(store);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        with_projection(&store, Direction::Directed, |_| async {
            std::future::pending::<Result<(), ProjectionError>>().await
        }),
    )
    .await;
    assert!(abandoned.is_err());

    let dropped = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("teardown was not scheduled")
        .unwrap();
    assert!(dropped.starts_with("temp_graph_"));
}
