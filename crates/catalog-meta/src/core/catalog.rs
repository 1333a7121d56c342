//! Dialect registry.
//!
//! The [`DialectRegistry`] maps dialect identifiers to [`CatalogDialect`]
//! implementations. It is explicitly constructed and passed to the session
//! rather than living in a global, so tests can register their own dialects.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CatalogError, Result};

use super::traits::CatalogDialect;

/// Registry of catalog dialects by name.
#[derive(Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, Arc<dyn CatalogDialect>>,
}

impl DialectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with PostgreSQL and SQL Server registered.
    pub fn with_builtins() -> Self {
        use crate::drivers::{MssqlDialect, PostgresDialect};

        let mut registry = Self::new();
        registry.register("postgres", PostgresDialect::new());
        registry.register("mssql", MssqlDialect::new());
        registry
    }

    /// Register a dialect. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, name: impl Into<String>, dialect: impl CatalogDialect + 'static) {
        self.register_arc(name, Arc::new(dialect));
    }

    /// Register a shared dialect.
    pub fn register_arc(&mut self, name: impl Into<String>, dialect: Arc<dyn CatalogDialect>) {
        self.dialects.insert(name.into().to_lowercase(), dialect);
    }

    /// Look a dialect up by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CatalogDialect>> {
        let key = Self::normalize_name(name)
            .map(str::to_string)
            .unwrap_or_else(|_| name.to_lowercase());
        self.dialects.get(&key).cloned()
    }

    /// Look a dialect up by name, returning an error if not registered.
    pub fn require(&self, name: &str) -> Result<Arc<dyn CatalogDialect>> {
        self.get(name).ok_or_else(|| {
            CatalogError::Config(format!(
                "Unknown database dialect: '{}'. Registered dialects: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Whether a dialect is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered dialect names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the canonical dialect name for a configured database type.
    ///
    /// - "postgres", "postgresql", "pg" → "postgres"
    /// - "mssql", "sqlserver", "sql_server" → "mssql"
    pub fn normalize_name(db_type: &str) -> Result<&'static str> {
        match db_type.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok("postgres"),
            "mssql" | "sqlserver" | "sql_server" => Ok("mssql"),
            other => Err(CatalogError::Config(format!(
                "Unknown database type: '{}'. Supported types: postgres, mssql",
                other
            ))),
        }
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::PostgresDialect;

    #[test]
    fn test_builtins_registered() {
        let registry = DialectRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["mssql", "postgres"]);
        assert_eq!(registry.require("postgres").unwrap().name(), "postgres");
        assert_eq!(registry.require("mssql").unwrap().name(), "mssql");
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = DialectRegistry::with_builtins();
        for alias in ["pg", "PostgreSQL", "POSTGRES"] {
            assert_eq!(registry.require(alias).unwrap().name(), "postgres");
        }
        for alias in ["sqlserver", "sql_server", "MSSQL"] {
            assert_eq!(registry.require(alias).unwrap().name(), "mssql");
        }
    }

    #[test]
    fn test_unknown_dialect_is_config_error() {
        let registry = DialectRegistry::with_builtins();
        let err = registry.require("oracle").err().unwrap();
        assert!(matches!(err, CatalogError::Config(_)));
        assert!(err.to_string().contains("oracle"));
        assert!(!registry.contains("oracle"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = DialectRegistry::new();
        assert!(registry.names().is_empty());
        assert!(registry.require("postgres").is_err());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = DialectRegistry::new();
        registry.register("Warehouse", PostgresDialect::new());
        assert!(registry.contains("warehouse"));
        assert!(!registry.contains("postgres"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(DialectRegistry::normalize_name("pg").unwrap(), "postgres");
        assert_eq!(DialectRegistry::normalize_name("SqlServer").unwrap(), "mssql");
        assert!(DialectRegistry::normalize_name("").is_err());
    }
}
