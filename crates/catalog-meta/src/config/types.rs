//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::normalize::LengthRule;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection.
    pub connection: ConnectionConfig,

    /// What to scan and how.
    #[serde(default)]
    pub introspection: IntrospectionConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Dialect identifier ("postgres", "mssql", or an alias).
    #[serde(default = "default_postgres")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port. Defaults to the dialect's standard port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// PostgreSQL SSL mode (default: "require").
    #[serde(default = "default_require")]
    pub ssl_mode: String,

    /// SQL Server: encrypt the connection (default: true).
    #[serde(default = "default_true")]
    pub encrypt: bool,

    /// SQL Server: trust the server certificate (default: false).
    #[serde(default)]
    pub trust_server_cert: bool,

    /// Maximum pooled connections (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Per-statement timeout in seconds (default: 30). A timed-out catalog
    /// query is reported as a catalog access failure.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl ConnectionConfig {
    /// Port to connect to, falling back to the dialect's standard port.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| match self.r#type.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => 1433,
            _ => 5432,
        })
    }
}

/// Introspection behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntrospectionConfig {
    /// Schemas to scan. Empty means every non-system schema.
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Tables to include (glob patterns, `*` and `?`).
    #[serde(default)]
    pub include_tables: Vec<String>,

    /// Tables to exclude (glob patterns, `*` and `?`).
    #[serde(default)]
    pub exclude_tables: Vec<String>,

    /// Concurrent table scans (default: 4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Override the dialect's length-recovery rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_rules: Option<Vec<LengthRule>>,
}

impl IntrospectionConfig {
    pub fn get_workers(&self) -> usize {
        self.workers.unwrap_or(4)
    }
}

fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_require() -> String {
    "require".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> usize {
    4
}

fn default_query_timeout() -> u64 {
    30
}
