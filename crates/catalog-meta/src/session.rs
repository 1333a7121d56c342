//! Session wiring: configuration → dialect → executor → definition tree.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::core::catalog::DialectRegistry;
use crate::core::schema::{SchemaDefinition, TableDefinition, TableId};
use crate::core::traits::{CatalogDialect, CatalogExecutor};
use crate::database::{Database, ScanReport};
use crate::drivers::open_executor;
use crate::error::Result;
use crate::normalize::LengthRecovery;

/// An open introspection session for one configured database.
pub struct Session {
    config: Config,
    database: Arc<Database>,
}

impl Session {
    /// Connect using the built-in dialects.
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::connect_with(config, &DialectRegistry::with_builtins()).await
    }

    /// Connect, resolving the dialect through `registry`.
    pub async fn connect_with(config: &Config, registry: &DialectRegistry) -> Result<Self> {
        let dialect = registry.require(&config.connection.r#type)?;
        let executor = open_executor(&config.connection).await?;
        Ok(Self::from_parts(config.clone(), dialect, executor))
    }

    /// Build a session over an already-open executor.
    pub fn from_parts(
        config: Config,
        dialect: Arc<dyn CatalogDialect>,
        executor: Arc<dyn CatalogExecutor>,
    ) -> Self {
        let mut database = Database::new(config.connection.database.clone(), dialect, executor);
        if let Some(rules) = &config.introspection.length_rules {
            database = database.with_length_recovery(LengthRecovery::new(rules.clone()));
        }

        Self {
            config,
            database: Arc::new(database),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    /// Register the configured schemas, or every schema when none are listed.
    pub async fn scan(&self) -> Result<Vec<Arc<SchemaDefinition>>> {
        let wanted = &self.config.introspection.schemas;
        if wanted.is_empty() {
            return self.database.scan_schemata().await;
        }

        let mut schemas = Vec::with_capacity(wanted.len());
        for name in wanted {
            schemas.push(self.database.scan_schema(name).await?);
        }
        Ok(schemas)
    }

    /// Tables of a schema that pass the include/exclude filters.
    pub async fn tables(&self, schema: &str) -> Result<Vec<TableDefinition>> {
        let intro = &self.config.introspection;
        Ok(self
            .database
            .tables(schema)
            .await?
            .iter()
            .filter(|t| intro.accepts_table(&t.name))
            .cloned()
            .collect())
    }

    /// Scan schemas, then fill columns for every selected table.
    pub async fn scan_all(&self, cancel: Option<watch::Receiver<bool>>) -> Result<ScanReport> {
        let mut ids: Vec<TableId> = Vec::new();
        for schema in self.scan().await? {
            ids.extend(self.tables(&schema.name).await?.iter().map(TableDefinition::id));
        }

        let workers = self.config.introspection.get_workers();
        Ok(self.database.scan_columns(ids, workers, cancel).await)
    }

    /// Verify the connection answers a trivial statement.
    pub async fn health_check(&self) -> Result<()> {
        self.database.executor().query("SELECT 1", &[]).await?;
        info!(
            "Health check passed for {} ({})",
            self.database.name(),
            self.database.dialect().name()
        );
        Ok(())
    }

    pub async fn close(&self) {
        self.database.executor().close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{CatalogRow, CatalogValue};
    use crate::drivers::PostgresDialect;
    use crate::testing::{column_row, employees_rows, MockExecutor};

    const YAML: &str = r#"
connection:
  type: postgres
  host: localhost
  database: hr
  user: postgres
introspection:
  exclude_tables: ["tmp_*"]
  workers: 2
"#;

    fn rows(names: &[(&str, &str)]) -> Vec<CatalogRow> {
        names
            .iter()
            .map(|(key, name)| {
                CatalogRow::new()
                    .with(key, *name)
                    .with("table_kind", "r")
                    .with("description", CatalogValue::Null)
            })
            .collect()
    }

    fn executor() -> Arc<MockExecutor> {
        Arc::new(
            MockExecutor::new("postgres")
                .on("nspname NOT LIKE", &[], rows(&[("schema_name", "app"), ("schema_name", "public")]))
                .on("relkind IN", &["app"], Vec::new())
                .on(
                    "relkind IN",
                    &["public"],
                    rows(&[("table_name", "employees"), ("table_name", "tmp_load")]),
                )
                .on("information_schema.columns", &["public", "employees"], employees_rows())
                .on(
                    "information_schema.columns",
                    &["public", "tmp_load"],
                    vec![column_row("x", 1, "text", "text", None, true, None, None)],
                ),
        )
    }

    fn session(yaml: &str, exec: Arc<MockExecutor>) -> Session {
        let config = Config::from_yaml(yaml).unwrap();
        Session::from_parts(config, Arc::new(PostgresDialect::new()), exec)
    }

    #[tokio::test]
    async fn test_scan_all_applies_filters() {
        let exec = executor();
        let s = session(YAML, exec.clone());

        let report = s.scan_all(None).await.unwrap();
        let scanned: Vec<_> = report.tables.iter().map(|t| t.table.to_string()).collect();
        assert_eq!(scanned, ["public.employees"]);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_configured_schemas_only() {
        let yaml = YAML.replace("introspection:", "introspection:\n  schemas: [public]");
        let s = session(&yaml, executor());

        let schemas = s.scan().await.unwrap();
        assert_eq!(schemas.len(), 1);
        assert!(s.database().schema("app").await.is_unknown());
        assert_eq!(s.tables("public").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_length_rules_from_config() {
        let codes = vec![column_row("codes", 1, "ARRAY", "_bpchar", None, true, None, None)
            .with("udt_name", "_bpchar")
            .with("type_modifier", 14)];
        let exec = || {
            Arc::new(MockExecutor::new("postgres").on(
                "information_schema.columns",
                &["public", "lookup"],
                codes.clone(),
            ))
        };
        let id = TableId::new("public", "lookup");

        let s = session(YAML, exec());
        assert_eq!(s.database().columns(&id).await.unwrap()[0].data_type.length, None);

        let yaml = format!(
            "{}  length_rules:\n    - udt_name: _bpchar\n      header_size: 4\n",
            YAML
        );
        let s = session(&yaml, exec());
        assert_eq!(s.database().columns(&id).await.unwrap()[0].data_type.length, Some(10));
    }

    #[tokio::test]
    async fn test_health_check() {
        let exec = executor();
        let s = session(YAML, exec.clone());
        s.health_check().await.unwrap();
        assert_eq!(exec.calls(), 1);

        exec.fail_next(1);
        assert!(s.health_check().await.is_err());
        s.close().await;
    }

    #[tokio::test]
    async fn test_connect_rejects_unregistered_dialect() {
        let config = Config::from_yaml(YAML).unwrap();
        let err = Session::connect_with(&config, &DialectRegistry::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, crate::error::CatalogError::Config(_)));
    }
}
