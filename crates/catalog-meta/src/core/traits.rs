//! Core traits for dialect-independent catalog introspection.
//!
//! - [`CatalogExecutor`]: runs one catalog statement and returns buffered rows
//! - [`CatalogDialect`]: a vendor's catalog queries and derived-semantics rules
//!
//! A dialect never owns a connection; it is handed an executor per call, so
//! one dialect instance serves every session of that vendor.

use async_trait::async_trait;

use crate::error::Result;
use crate::normalize::LengthRecovery;

use super::schema::{RawColumn, SchemaDefinition, TableDefinition};
use super::value::CatalogRow;

/// Execute catalog SQL and return fully-buffered rows.
///
/// Implementations are all-or-nothing: on any failure (connectivity,
/// permission denial, cancellation) they return a `CatalogAccess` error and
/// no rows.
#[async_trait]
pub trait CatalogExecutor: Send + Sync {
    /// Run a statement with positional text parameters.
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>>;

    /// Get the dialect identifier this executor speaks (e.g. "postgres").
    fn dialect_name(&self) -> &str;

    /// Close the connection pool.
    async fn close(&self);
}

/// A vendor's catalog query layer.
#[async_trait]
pub trait CatalogDialect: Send + Sync {
    /// Dialect identifier (e.g. "postgres", "mssql").
    fn name(&self) -> &str;

    /// Enumerate the non-system schemas of the database.
    async fn fetch_schemata(
        &self,
        exec: &dyn CatalogExecutor,
        database: &str,
    ) -> Result<Vec<SchemaDefinition>>;

    /// Enumerate the relations of one schema, ordered by name.
    async fn fetch_tables(
        &self,
        exec: &dyn CatalogExecutor,
        schema: &str,
    ) -> Result<Vec<TableDefinition>>;

    /// Fetch one table's raw column rows, ordered by ordinal position.
    async fn fetch_columns(
        &self,
        exec: &dyn CatalogExecutor,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>>;

    /// Lowercase prefix of a default expression that invokes a sequence.
    fn identity_marker(&self) -> &str;

    /// Rules for recovering character length from internal type modifiers.
    fn length_recovery(&self) -> LengthRecovery;

    /// Strip vendor decoration from a default expression before the identity
    /// marker is checked. The default trims whitespace only.
    fn unwrap_default<'a>(&self, default: &'a str) -> &'a str {
        default.trim()
    }
}
