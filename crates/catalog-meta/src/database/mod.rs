//! The database → schema → table → column definition tree.
//!
//! A [`Database`] owns every [`SchemaDefinition`] it has scanned and caches
//! each table's materialized column list. The cache is a point-in-time
//! snapshot with no expiry; [`Database::invalidate`] discards it.
//!
//! Column lists are filled single-flight: concurrent [`Database::columns`]
//! calls for the same table share one catalog query, while different tables
//! proceed independently. A failed fill leaves no cache entry behind.

mod scan;

pub use scan::{ScanReport, TableScan};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info};

use crate::core::identifier::validate_identifier;
use crate::core::schema::{ColumnDefinition, SchemaDefinition, TableDefinition, TableId};
use crate::core::traits::{CatalogDialect, CatalogExecutor};
use crate::error::{CatalogError, Result};
use crate::normalize::{materialize_columns, LengthRecovery};

type ColumnCell = Arc<OnceCell<Arc<Vec<ColumnDefinition>>>>;

/// Result of looking a schema up by name.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaLookup {
    /// The schema was scanned.
    Found(Arc<SchemaDefinition>),
    /// The schema was never scanned. No placeholder is created.
    Unknown,
}

impl SchemaLookup {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SchemaLookup::Unknown)
    }

    pub fn found(self) -> Option<Arc<SchemaDefinition>> {
        match self {
            SchemaLookup::Found(schema) => Some(schema),
            SchemaLookup::Unknown => None,
        }
    }
}

/// The introspected database root.
pub struct Database {
    name: String,
    dialect: Arc<dyn CatalogDialect>,
    executor: Arc<dyn CatalogExecutor>,
    recovery: LengthRecovery,
    schemas: RwLock<BTreeMap<String, Arc<SchemaDefinition>>>,
    tables: RwLock<HashMap<String, Arc<Vec<TableDefinition>>>>,
    columns: Mutex<HashMap<TableId, ColumnCell>>,
}

impl Database {
    pub fn new(
        name: impl Into<String>,
        dialect: Arc<dyn CatalogDialect>,
        executor: Arc<dyn CatalogExecutor>,
    ) -> Self {
        let recovery = dialect.length_recovery();
        Self {
            name: name.into(),
            dialect,
            executor,
            recovery,
            schemas: RwLock::new(BTreeMap::new()),
            tables: RwLock::new(HashMap::new()),
            columns: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the dialect's length-recovery rules.
    pub fn with_length_recovery(mut self, recovery: LengthRecovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> &dyn CatalogDialect {
        self.dialect.as_ref()
    }

    pub fn executor(&self) -> &Arc<dyn CatalogExecutor> {
        &self.executor
    }

    /// Register every non-system schema of the database.
    ///
    /// Already-registered schemas keep their existing instance so resolved
    /// type references stay pointer-equal across re-scans.
    pub async fn scan_schemata(&self) -> Result<Vec<Arc<SchemaDefinition>>> {
        let found = self
            .dialect
            .fetch_schemata(self.executor.as_ref(), &self.name)
            .await?;

        let mut schemas = self.schemas.write().await;
        for schema in found {
            schemas
                .entry(schema.name.clone())
                .or_insert_with(|| Arc::new(schema));
        }

        info!("Registered {} schemas in {}", schemas.len(), self.name);
        Ok(schemas.values().cloned().collect())
    }

    /// Register one schema and enumerate its tables.
    pub async fn scan_schema(&self, name: &str) -> Result<Arc<SchemaDefinition>> {
        validate_identifier(name)?;
        let found = self
            .dialect
            .fetch_schemata(self.executor.as_ref(), &self.name)
            .await?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))?;

        let schema = {
            let mut schemas = self.schemas.write().await;
            schemas
                .entry(found.name.clone())
                .or_insert_with(|| Arc::new(found))
                .clone()
        };

        self.load_tables(name).await?;
        Ok(schema)
    }

    /// Every registered schema, ordered by name.
    pub async fn schemas(&self) -> Vec<Arc<SchemaDefinition>> {
        self.schemas.read().await.values().cloned().collect()
    }

    /// Look up a previously scanned schema.
    pub async fn schema(&self, name: &str) -> SchemaLookup {
        match self.schemas.read().await.get(name) {
            Some(schema) => SchemaLookup::Found(schema.clone()),
            None => SchemaLookup::Unknown,
        }
    }

    /// Tables of a registered schema, ordered by name.
    ///
    /// The table list is enumerated on first use and kept afterwards.
    pub async fn tables(&self, schema: &str) -> Result<Arc<Vec<TableDefinition>>> {
        if self.schema(schema).await.is_unknown() {
            return Err(CatalogError::UnknownSchema(schema.to_string()));
        }
        if let Some(tables) = self.tables.read().await.get(schema) {
            return Ok(tables.clone());
        }
        self.load_tables(schema).await
    }

    /// One table of a registered schema.
    pub async fn table(&self, schema: &str, name: &str) -> Result<TableDefinition> {
        self.tables(schema)
            .await?
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTable(format!("{}.{}", schema, name)))
    }

    async fn load_tables(&self, schema: &str) -> Result<Arc<Vec<TableDefinition>>> {
        let tables = Arc::new(
            self.dialect
                .fetch_tables(self.executor.as_ref(), schema)
                .await?,
        );
        self.tables
            .write()
            .await
            .insert(schema.to_string(), tables.clone());
        Ok(tables)
    }

    /// The ordered column list of a table.
    ///
    /// The first call runs the catalog query and materializes the result;
    /// later calls return the cached list. Type references are resolved
    /// against the schemas registered at fill time.
    pub async fn columns(&self, table: &TableId) -> Result<Arc<Vec<ColumnDefinition>>> {
        validate_identifier(&table.schema)?;
        validate_identifier(&table.name)?;

        let cell = {
            let mut cache = self.columns.lock().await;
            cache.entry(table.clone()).or_default().clone()
        };

        cell.get_or_try_init(|| self.load_columns(table))
            .await
            .cloned()
            .map_err(|e| e.with_table(table))
    }

    async fn load_columns(&self, table: &TableId) -> Result<Arc<Vec<ColumnDefinition>>> {
        let rows = self
            .dialect
            .fetch_columns(self.executor.as_ref(), &table.schema, &table.name)
            .await?;

        let registry = self.schemas.read().await.clone();
        let columns = materialize_columns(
            table,
            rows,
            self.dialect.as_ref(),
            &self.recovery,
            |name| registry.get(name).cloned(),
        )?;

        debug!("Loaded {} columns for {}", columns.len(), table);
        Ok(Arc::new(columns))
    }

    /// Whether a table's column list is cached.
    pub async fn is_cached(&self, table: &TableId) -> bool {
        self.columns
            .lock()
            .await
            .get(table)
            .is_some_and(|cell| cell.initialized())
    }

    /// Discard every cached column list.
    ///
    /// Registered schemas and table lists are kept. Fills already in flight
    /// finish for their callers but are not cached.
    pub async fn invalidate(&self) {
        self.columns.lock().await.clear();
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("dialect", &self.dialect.name())
            .finish()
    }
}
