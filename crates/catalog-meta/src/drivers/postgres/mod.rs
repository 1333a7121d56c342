//! PostgreSQL catalog support.

mod dialect;
#[cfg(feature = "postgres")]
mod executor;

pub use dialect::{PostgresDialect, VARHDRSZ};
#[cfg(feature = "postgres")]
pub use executor::PostgresExecutor;
