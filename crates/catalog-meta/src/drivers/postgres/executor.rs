//! PostgreSQL catalog executor over a deadpool connection pool.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Config as PgConfig, Row};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::traits::CatalogExecutor;
use crate::core::value::{CatalogRow, CatalogValue, Json};
use crate::drivers::common::{make_connector, SslMode};
use crate::error::{CatalogError, Result};

/// Runs catalog statements against PostgreSQL.
pub struct PostgresExecutor {
    pool: Pool,
    timeout: Duration,
}

impl PostgresExecutor {
    /// Create a pool from configuration and verify it with `SELECT 1`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.effective_port());
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("catalog-meta");

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let pool = match make_connector(SslMode::parse(&config.ssl_mode)?)? {
            None => {
                let mgr = Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config);
                Pool::builder(mgr).max_size(config.max_connections).build()
            }
            Some(tls) => {
                let mgr = Manager::from_config(pg_config, tls, mgr_config);
                Pool::builder(mgr).max_size(config.max_connections).build()
            }
        }
        .map_err(|e| CatalogError::pool(e, "creating PostgreSQL pool"))?;

        let client = pool
            .get()
            .await
            .map_err(|e| CatalogError::pool(e, "testing PostgreSQL connection"))?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );

        Ok(Self {
            pool,
            timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    async fn run(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| CatalogError::pool(e, "getting PostgreSQL connection from pool"))?;

        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = client.query(sql, &params).await?;
        rows.iter().map(convert_row).collect()
    }
}

/// Convert a driver row into a name-keyed catalog row.
fn convert_row(row: &Row) -> Result<CatalogRow> {
    let mut out = CatalogRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx)?.map_or(CatalogValue::Null, CatalogValue::Bool)
        } else if *ty == Type::INT2 {
            int(row.try_get::<_, Option<i16>>(idx)?.map(i64::from))
        } else if *ty == Type::INT4 {
            int(row.try_get::<_, Option<i32>>(idx)?.map(i64::from))
        } else if *ty == Type::INT8 {
            int(row.try_get::<_, Option<i64>>(idx)?)
        } else if *ty == Type::OID {
            int(row.try_get::<_, Option<u32>>(idx)?.map(i64::from))
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            row.try_get::<_, Option<serde_json::Value>>(idx)?
                .map_or(CatalogValue::Null, |v| CatalogValue::Json(Json::value_of(v.to_string())))
        } else {
            CatalogValue::from(row.try_get::<_, Option<String>>(idx)?)
        };
        out.insert(column.name(), value);
    }
    Ok(out)
}

fn int(v: Option<i64>) -> CatalogValue {
    v.map_or(CatalogValue::Null, CatalogValue::Int)
}

#[async_trait]
impl CatalogExecutor for PostgresExecutor {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let rows = tokio::time::timeout(self.timeout, self.run(sql, params))
            .await
            .map_err(|_| {
                CatalogError::access(
                    "postgres query",
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            })??;
        debug!("Catalog query returned {} rows", rows.len());
        Ok(rows)
    }

    fn dialect_name(&self) -> &str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close();
    }
}
