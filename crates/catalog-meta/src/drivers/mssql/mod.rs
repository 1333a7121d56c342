//! SQL Server catalog support.

mod dialect;
#[cfg(feature = "mssql")]
mod executor;

pub use dialect::MssqlDialect;
#[cfg(feature = "mssql")]
pub use executor::MssqlExecutor;
