//! Neo4j connection configuration

use std::fmt;
use std::time::Duration;

/// Default Neo4j HTTP endpoint
pub const DEFAULT_URI: &str = "http://localhost:7474";
/// Default database name
pub const DEFAULT_DATABASE: &str = "neo4j";
/// Default user name
pub const DEFAULT_USERNAME: &str = "neo4j";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for a Neo4j instance with the GDS plugin installed
///
/// `uri` may use any of the `bolt`, `neo4j`, `http` schemes (with their
/// `+s`/`+ssc` variants); it is mapped onto the HTTP endpoint by
/// [`http_base_url`](super::http_base_url).
#[derive(Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Per-request timeout. Algorithm calls on large graphs are slow, so
    /// this is generous by default.
    pub timeout: Duration,
}

impl Neo4jConfig {
    pub fn new(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
            database: DEFAULT_DATABASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Select a database other than the default `neo4j`
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the configuration from `NEO4J_URI`, `NEO4J_USERNAME`,
    /// `NEO4J_PASSWORD` and `NEO4J_DATABASE`, falling back to defaults.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let mut config = Self::new(
            var("NEO4J_URI").unwrap_or_else(|| DEFAULT_URI.to_string()),
            var("NEO4J_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            var("NEO4J_PASSWORD").unwrap_or_default(),
        );
        if let Some(database) = var("NEO4J_DATABASE") {
            config.database = database;
        }
        config
    }
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URI, DEFAULT_USERNAME, "")
    }
}

// Keeps the password out of logs.
impl fmt::Debug for Neo4jConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = Neo4jConfig::new("neo4j://db:7687", "admin", "secret")
            .with_database("transit")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.uri, "neo4j://db:7687");
        assert_eq!(config.database, "transit");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Neo4jConfig::new(DEFAULT_URI, "neo4j", "hunter2");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_default_uses_default_database() {
        let config = Neo4jConfig::default();
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.username, DEFAULT_USERNAME);
    }
}
