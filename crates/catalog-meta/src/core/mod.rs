//! Core abstractions for catalog introspection.
//!
//! - [`traits`]: executor and dialect seams
//! - [`schema`]: schema, table, column, and data type definitions
//! - [`value`]: catalog row values and the [`Json`] wrapper
//! - [`identifier`]: qualified names
//! - [`catalog`]: the dialect registry

pub mod catalog;
pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use catalog::DialectRegistry;
pub use identifier::{validate_identifier, QualifiedName};
pub use schema::{
    ColumnDefinition, DataTypeDefinition, RawColumn, SchemaDefinition, TableDefinition, TableId,
    TableKind, UdtReference,
};
pub use traits::{CatalogDialect, CatalogExecutor};
pub use value::{CatalogRow, CatalogValue, Json};
