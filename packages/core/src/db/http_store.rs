//! Neo4j HTTP Store
//!
//! [`GraphStore`] implementation over the Neo4j HTTP transactional Cypher
//! endpoint (`POST /db/{database}/tx/commit`). Each call is its own
//! auto-committed transaction.

use crate::db::{GraphStore, Neo4jConfig, Row, Statement, StoreError};
use crate::projection::ProjectionSpec;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

const BOLT_PORT: u16 = 7687;
const HTTP_PORT: u16 = 7474;
const HTTPS_PORT: u16 = 7473;

/// Map a configured database URI onto the base URL of the HTTP API
///
/// - `http(s)://host:port` is used as given
/// - `bolt://`, `neo4j://` become `http://`; the default Bolt port (explicit
///   or implied) becomes 7474
/// - `bolt+s://`, `neo4j+s://` and the `+ssc` variants become `https://`; an
///   explicit 7687 becomes 7473, no port stays no port (Aura serves HTTPS on 443)
pub fn http_base_url(uri: &str) -> Result<Url, StoreError> {
    let parsed = Url::parse(uri).map_err(|e| StoreError::invalid_uri(uri, e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| StoreError::invalid_uri(uri, "missing host"))?;

    let (scheme, port) = match parsed.scheme() {
        "http" | "https" => (parsed.scheme(), parsed.port()),
        "bolt" | "neo4j" => match parsed.port() {
            None | Some(BOLT_PORT) => ("http", Some(HTTP_PORT)),
            other => ("http", other),
        },
        "bolt+s" | "bolt+ssc" | "neo4j+s" | "neo4j+ssc" => match parsed.port() {
            Some(BOLT_PORT) => ("https", Some(HTTPS_PORT)),
            other => ("https", other),
        },
        other => {
            return Err(StoreError::invalid_uri(
                uri,
                format!("unsupported scheme '{}'", other),
            ))
        }
    };

    let base = match port {
        Some(port) => format!("{}://{}:{}", scheme, host, port),
        None => format!("{}://{}", scheme, host),
    };
    Url::parse(&base).map_err(|e| StoreError::invalid_uri(uri, e.to_string()))
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataEntry>,
}

#[derive(Debug, Deserialize)]
struct DataEntry {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    code: String,
    message: String,
}

/// Turn a tx/commit response body into rows keyed by column name
fn parse_commit_response(body: &str) -> Result<Vec<Row>, StoreError> {
    let response: CommitResponse = serde_json::from_str(body)?;

    if let Some(error) = response.errors.into_iter().next() {
        return Err(StoreError::neo4j(error.code, error.message));
    }

    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::malformed("response contains no statement result"))?;

    result
        .data
        .into_iter()
        .map(|entry| {
            if entry.row.len() != result.columns.len() {
                return Err(StoreError::malformed(format!(
                    "row has {} values for {} columns",
                    entry.row.len(),
                    result.columns.len()
                )));
            }
            Ok(result.columns.iter().cloned().zip(entry.row).collect())
        })
        .collect()
}

/// Neo4j client over the HTTP transactional endpoint
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections across concurrent tool calls.
#[derive(Debug, Clone)]
pub struct HttpGraphStore {
    client: Client,
    endpoint: Url,
    username: String,
    password: String,
}

impl HttpGraphStore {
    /// Create a store for the given configuration
    ///
    /// No request is made; connectivity problems surface on first use.
    pub fn new(config: &Neo4jConfig) -> Result<Self, StoreError> {
        let base = http_base_url(&config.uri)?;
        let endpoint = base
            .join(&format!("db/{}/tx/commit", config.database))
            .map_err(|e| StoreError::invalid_uri(&config.uri, e.to_string()))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Full URL statements are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute(&self, statement: Statement) -> Result<Vec<Row>, StoreError> {
        debug!("Cypher: {}", statement.text);

        let body = json!({
            "statements": [{
                "statement": statement.text,
                "parameters": statement.parameters,
                "resultDataContents": ["row"]
            }]
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json;charset=UTF-8")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // Neo4j reports statement errors with 200 and an `errors` array;
        // auth failures come back as 401 with the same body shape.
        match parse_commit_response(&text) {
            Err(e @ StoreError::Neo4j { .. }) => Err(e),
            _ if !status.is_success() => Err(StoreError::HttpStatus {
                status: status.as_u16(),
                body: text,
            }),
            result => result,
        }
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    #[instrument(skip(self, statement))]
    async fn query(&self, statement: Statement) -> Result<Vec<Row>, StoreError> {
        self.execute(statement).await
    }

    #[instrument(skip(self, spec), fields(graph_name = %spec.graph_name()))]
    async fn create_projection(&self, spec: &ProjectionSpec) -> Result<Row, StoreError> {
        self.execute(spec.to_statement())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::malformed("projection returned no statistics row"))
    }

    #[instrument(skip(self))]
    async fn drop_projection(&self, graph_name: &str) -> Result<(), StoreError> {
        let statement = Statement::new(
            "CALL gds.graph.drop($graphName, false) YIELD graphName RETURN graphName",
        )
        .param("graphName", graph_name);
        self.execute(statement).await.map(|_| ())
    }
}
