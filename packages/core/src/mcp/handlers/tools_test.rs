//! Tests for MCP Tools Handler
//!
//! Tests tools/list and tools/call against a mocked graph store.

use super::*;
use crate::db::{MockGraphStore, Row, StoreError};
use serde_json::json;
use std::sync::Arc;

fn service(store: MockGraphStore) -> GdsService {
    GdsService::new(Arc::new(store))
}

#[test]
fn test_tools_list_returns_catalogue() {
    let registry = AlgorithmRegistry::new();
    let result = handle_tools_list(&registry, json!({})).unwrap();
    let tools = result["tools"].as_array().unwrap();

    assert_eq!(tools.len(), registry.len());
    for tool in tools {
        assert!(tool["name"].is_string(), "Tool missing name");
        assert!(tool["description"].is_string(), "Tool missing description");
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
    assert!(tools.iter().any(|t| t["name"] == "find_shortest_path"));
}

#[tokio::test]
async fn test_tools_call_missing_name() {
    let registry = AlgorithmRegistry::new();
    let err = handle_tools_call(&service(MockGraphStore::new()), &registry, json!({"arguments": {}}))
        .await
        .unwrap_err();
    assert_eq!(err.code, crate::mcp::types::INVALID_PARAMS);
}

#[tokio::test]
async fn test_tools_call_unknown_tool() {
    let registry = AlgorithmRegistry::new();
    let err = handle_tools_call(
        &service(MockGraphStore::new()),
        &registry,
        json!({"name": "louvain", "arguments": {}}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, crate::mcp::types::INVALID_PARAMS);
    assert!(err.message.contains("louvain"));
}

#[tokio::test]
async fn test_tools_call_success_is_pretty_json_text() {
    let mut store = MockGraphStore::new();
    store.expect_query().returning(|_| {
        let mut row = Row::new();
        row.insert("key".to_string(), json!("name"));
        Ok(vec![row])
    });
    let registry = AlgorithmRegistry::new();

    let result = handle_tools_call(
        &service(store),
        &registry,
        json!({"name": "get_node_properties_keys"}),
    )
    .await
    .unwrap();

    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["type"], "text");
    let text = result["content"][0]["text"].as_str().unwrap();
    assert_eq!(text, "[\n  \"name\"\n]");
}

#[tokio::test]
async fn test_tools_call_missing_required_argument_is_tool_error() {
    let mut store = MockGraphStore::new();
    store.expect_query().never();
    store.expect_create_projection().never();
    let registry = AlgorithmRegistry::new();

    let result = handle_tools_call(
        &service(store),
        &registry,
        json!({"name": "find_shortest_path", "arguments": {"start_node": "Bank"}}),
    )
    .await
    .unwrap();

    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error executing find_shortest_path:"));
    assert!(text.contains("end_node"));
}

#[tokio::test]
async fn test_tools_call_projection_failure_is_tool_error() {
    let mut store = MockGraphStore::new();
    store.expect_query().returning(|_| Ok(Vec::new()));
    store.expect_create_projection().times(1).returning(|_| {
        Err(StoreError::neo4j(
            "Neo.ClientError.Procedure.ProcedureNotFound",
            "gds.graph.project is not available",
        ))
    });
    store.expect_drop_projection().never();
    let registry = AlgorithmRegistry::new();

    let result = handle_tools_call(&service(store), &registry, json!({"name": "pagerank"}))
        .await
        .unwrap();

    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error executing pagerank: Failed to create projection 'temp_graph_"));
    assert!(text.contains("ProcedureNotFound"));
}
