//! Tests for MCP Initialize Handler

use super::*;
use serde_json::json;

#[test]
fn test_initialize_success() {
    let params = json!({
        "protocolVersion": "2024-11-05",
        "clientInfo": {
            "name": "test-client",
            "version": "1.0.0"
        }
    });

    let result = handle_initialize(params).unwrap();

    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "neo4j-gds");
    assert!(result["serverInfo"]["version"].is_string());
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
}

#[test]
fn test_initialize_echoes_each_supported_version() {
    for version in SUPPORTED_PROTOCOL_VERSIONS {
        let result = handle_initialize(json!({"protocolVersion": version})).unwrap();
        assert_eq!(result["protocolVersion"], *version);
    }
}

#[test]
fn test_initialize_wrong_version() {
    let params = json!({
        "protocolVersion": "1999-01-01",
        "clientInfo": {"name": "test-client"}
    });

    let err = handle_initialize(params).unwrap_err();
    assert_eq!(err.code, crate::mcp::types::INVALID_REQUEST);
    assert!(err.message.contains("Unsupported protocol version"));
    assert!(err.message.contains("1999-01-01"));
    assert!(err.message.contains("2024-11-05"));
}

#[test]
fn test_initialize_missing_version() {
    let err = handle_initialize(json!({"clientInfo": {"name": "test-client"}})).unwrap_err();
    assert_eq!(err.code, crate::mcp::types::INVALID_PARAMS);
    assert!(err.message.contains("Missing protocolVersion"));
}

#[test]
fn test_initialize_null_params() {
    let err = handle_initialize(Value::Null).unwrap_err();
    assert_eq!(err.code, crate::mcp::types::INVALID_PARAMS);
}
