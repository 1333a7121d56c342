//! Vendor catalog implementations.
//!
//! - [`postgres`]: PostgreSQL catalog queries and executor
//! - [`mssql`]: SQL Server catalog queries and executor
//! - [`common`]: Shared utilities (TLS)
//!
//! Dialects (the query text and derived-semantics rules) are always compiled.
//! Executors need the driver crates and sit behind the `postgres` and `mssql`
//! Cargo features.

pub mod common;
pub mod mssql;
pub mod postgres;

pub use mssql::MssqlDialect;
pub use postgres::PostgresDialect;

#[cfg(feature = "mssql")]
pub use mssql::MssqlExecutor;
#[cfg(feature = "postgres")]
pub use postgres::PostgresExecutor;

use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::core::catalog::DialectRegistry;
use crate::core::traits::CatalogExecutor;
use crate::error::{CatalogError, Result};

/// Open an executor for the configured connection type.
pub async fn open_executor(config: &ConnectionConfig) -> Result<Arc<dyn CatalogExecutor>> {
    match DialectRegistry::normalize_name(&config.r#type)? {
        #[cfg(feature = "postgres")]
        "postgres" => Ok(Arc::new(PostgresExecutor::connect(config).await?)),
        #[cfg(feature = "mssql")]
        "mssql" => Ok(Arc::new(MssqlExecutor::connect(config).await?)),
        other => Err(CatalogError::Config(format!(
            "Database type '{}' is not enabled in this build",
            other
        ))),
    }
}
