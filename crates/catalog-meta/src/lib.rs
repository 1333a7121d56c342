//! # catalog-meta
//!
//! Relational catalog introspection library.
//!
//! Reads structural metadata from a database's system catalog and normalizes
//! it into a dialect-independent definition tree:
//!
//! - **Catalog queries** per vendor (PostgreSQL, SQL Server)
//! - **Type normalization** with effective-length recovery and UDT resolution
//! - **Column materialization** with identity detection and ordinal checks
//! - **Definition tree** with a single-flight per-table column cache
//! - **Dialect registry** for plugging in new vendors
//!
//! ## Example
//!
//! ```rust,no_run
//! use catalog_meta::{Config, Session, TableId};
//!
//! #[tokio::main]
//! async fn main() -> catalog_meta::Result<()> {
//!     let config = Config::load("catalog.yaml")?;
//!     let session = Session::connect(&config).await?;
//!     session.scan().await?;
//!
//!     let columns = session
//!         .database()
//!         .columns(&TableId::new("public", "employees"))
//!         .await?;
//!     for column in columns.iter() {
//!         println!("{} {}", column.name, column.data_type.display_type());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod database;
pub mod drivers;
pub mod error;
pub mod normalize;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use config::{Config, ConnectionConfig, IntrospectionConfig};
pub use crate::core::{
    CatalogDialect, CatalogExecutor, CatalogRow, CatalogValue, ColumnDefinition,
    DataTypeDefinition, DialectRegistry, Json, QualifiedName, SchemaDefinition, TableDefinition,
    TableId, TableKind, UdtReference,
};
pub use database::{Database, ScanReport, SchemaLookup, TableScan};
pub use error::{CatalogError, Result};
pub use normalize::{LengthRecovery, LengthRule};
pub use session::Session;
