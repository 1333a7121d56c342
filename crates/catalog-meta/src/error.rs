//! Error types for catalog introspection.

use thiserror::Error;

/// Main error type for introspection operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Configuration error (invalid YAML, missing fields, unknown dialect).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The catalog query could not be executed (connectivity, permissions, cancellation).
    #[error("Could not read catalog ({context}): {message}")]
    CatalogAccess { context: String, message: String },

    /// Catalog data violates an invariant the model depends on.
    #[error("Catalog data inconsistent for table {table}: {message}")]
    SchemaConsistency { table: String, message: String },

    /// A schema was requested that has never been scanned.
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// A table was requested that is not part of its scanned schema.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scan was cancelled before it completed.
    #[error("Scan cancelled")]
    Cancelled,
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for CatalogError {
    fn from(e: tokio_postgres::Error) -> Self {
        CatalogError::access("postgres query", e)
    }
}

#[cfg(feature = "mssql")]
impl From<tiberius::error::Error> for CatalogError {
    fn from(e: tiberius::error::Error) -> Self {
        CatalogError::access("mssql query", e)
    }
}

impl CatalogError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        CatalogError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a CatalogAccess error.
    pub fn access(context: impl Into<String>, message: impl ToString) -> Self {
        CatalogError::CatalogAccess {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a SchemaConsistency error.
    pub fn consistency(table: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::SchemaConsistency {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Attach a table identity to an access failure so operators can tell
    /// which scan failed.
    pub fn with_table(self, table: impl std::fmt::Display) -> Self {
        match self {
            CatalogError::CatalogAccess { context, message } => CatalogError::CatalogAccess {
                context: format!("{} for table {}", context, table),
                message,
            },
            CatalogError::Pool { message, context } => CatalogError::CatalogAccess {
                context: format!("{} for table {}", context, table),
                message,
            },
            CatalogError::Cancelled => CatalogError::CatalogAccess {
                context: format!("scan of table {}", table),
                message: "cancelled".to_string(),
            },
            other => other,
        }
    }

    /// True for infrastructure failures (connectivity, pool, cancellation)
    /// as opposed to inconsistent catalog data.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::CatalogAccess { .. } | CatalogError::Pool { .. } | CatalogError::Cancelled
        )
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            CatalogError::Config(_) | CatalogError::Yaml(_) => 2,
            CatalogError::CatalogAccess { .. } | CatalogError::Pool { .. } => 3,
            CatalogError::SchemaConsistency { .. } => 4,
            CatalogError::Cancelled => 130,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_table_names_the_table() {
        let err = CatalogError::access("fetching columns", "connection reset").with_table("public.users");
        let msg = err.to_string();
        assert!(msg.contains("public.users"));
        assert!(msg.contains("connection reset"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_consistency_is_not_transient() {
        let err = CatalogError::consistency("public.users", "ordinal gap").with_table("ignored");
        assert!(!err.is_transient());
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("public.users"));
    }

    #[test]
    fn test_cancelled_becomes_access_error() {
        let err = CatalogError::Cancelled.with_table("dbo.Orders");
        assert!(matches!(err, CatalogError::CatalogAccess { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CatalogError::Config("x".into()).exit_code(), 2);
        assert_eq!(CatalogError::pool("timeout", "get").exit_code(), 3);
        assert_eq!(CatalogError::UnknownSchema("s".into()).exit_code(), 1);
    }
}
