//! Store Error Types
//!
//! Errors raised while talking to Neo4j. Everything above the store layer
//! wraps these rather than inspecting HTTP details.

use thiserror::Error;

/// Graph store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure (connection refused, TLS, timeout)
    #[error("HTTP request to Neo4j failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Neo4j answered with a non-success status and no structured error
    #[error("Neo4j returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Neo4j rejected the statement (syntax error, procedure failure, ...)
    #[error("{code}: {message}")]
    Neo4j { code: String, message: String },

    /// The response body did not have the expected shape
    #[error("Malformed Neo4j response: {0}")]
    MalformedResponse(String),

    /// The configured database URI cannot be mapped to an HTTP endpoint
    #[error("Invalid database URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// A GDS procedure path that is not a plain dotted identifier
    #[error("Invalid GDS procedure name: {0}")]
    InvalidProcedure(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a Neo4j error from a response error entry
    pub fn neo4j(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Neo4j {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an invalid URI error
    pub fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Neo4j status code, if the error came from the database itself
    pub fn neo4j_code(&self) -> Option<&str> {
        match self {
            Self::Neo4j { code, .. } => Some(code),
            _ => None,
        }
    }
}
