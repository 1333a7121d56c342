//! SQL Server catalog executor using Tiberius with bb8 pooling.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::traits::CatalogExecutor;
use crate::core::value::{CatalogRow, CatalogValue};
use crate::error::{CatalogError, Result};

/// Connection acquisition timeout from pool.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle connection timeout (5 minutes).
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection manager for bb8 pool with Tiberius.
#[derive(Clone)]
struct TiberiusConnectionManager {
    config: ConnectionConfig,
}

impl TiberiusConnectionManager {
    fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    fn build_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.host);
        config.port(self.config.effective_port());
        config.database(&self.config.database);
        config.application_name("catalog-meta");
        config.authentication(AuthMethod::sql_server(
            &self.config.user,
            &self.config.password,
        ));

        if self.config.encrypt {
            if self.config.trust_server_cert {
                config.trust_cert();
            }
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }

        config
    }
}

#[async_trait]
impl bb8::ManageConnection for TiberiusConnectionManager {
    type Connection = Client<Compat<TcpStream>>;
    type Error = tiberius::error::Error;

    async fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        let config = self.build_config();
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            tiberius::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            }
        })?;
        tcp.set_nodelay(true).ok();
        Client::connect(config, tcp.compat_write()).await
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Runs catalog statements against SQL Server.
pub struct MssqlExecutor {
    pool: Pool<TiberiusConnectionManager>,
    timeout: Duration,
}

impl MssqlExecutor {
    /// Create a pool from configuration and verify it with `SELECT 1`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let manager = TiberiusConnectionManager::new(config.clone());
        let pool = Pool::builder()
            .max_size(config.max_connections as u32)
            .connection_timeout(POOL_CONNECTION_TIMEOUT)
            .idle_timeout(Some(POOL_IDLE_TIMEOUT))
            .build(manager)
            .await
            .map_err(|e| CatalogError::pool(e, "creating MSSQL connection pool"))?;

        {
            let mut conn = pool
                .get()
                .await
                .map_err(|e| CatalogError::pool(e, "testing MSSQL connection"))?;
            conn.simple_query("SELECT 1").await?.into_row().await?;
        }

        info!(
            "Connected to MSSQL: {}:{}/{} (pool_size={})",
            config.host,
            config.effective_port(),
            config.database,
            config.max_connections
        );

        Ok(Self {
            pool,
            timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    async fn get_client(&self) -> Result<PooledConnection<'_, TiberiusConnectionManager>> {
        self.pool
            .get()
            .await
            .map_err(|e| CatalogError::pool(e, "getting MSSQL connection from pool"))
    }

    async fn run(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let mut client = self.get_client().await?;

        let mut query = Query::new(sql);
        for p in params {
            query.bind(p.to_string());
        }

        let stream = query.query(&mut *client).await?;
        let rows = stream.into_first_result().await?;
        rows.into_iter().map(convert_row).collect()
    }
}

/// Convert a Tiberius row into a name-keyed catalog row.
fn convert_row(row: Row) -> Result<CatalogRow> {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let mut out = CatalogRow::new();

    for (name, data) in names.iter().zip(row) {
        let value = match data {
            ColumnData::String(s) => CatalogValue::from(s.map(|s| s.into_owned())),
            ColumnData::I32(v) => CatalogValue::from(v),
            ColumnData::I16(v) => v.map_or(CatalogValue::Null, |v| CatalogValue::Int(v.into())),
            ColumnData::U8(v) => v.map_or(CatalogValue::Null, |v| CatalogValue::Int(v.into())),
            ColumnData::I64(v) => v.map_or(CatalogValue::Null, CatalogValue::Int),
            ColumnData::Bit(v) => v.map_or(CatalogValue::Null, CatalogValue::Bool),
            other => {
                return Err(CatalogError::access(
                    "decoding MSSQL row",
                    format!("unsupported value for column '{}': {:?}", name, other),
                ))
            }
        };
        out.insert(name, value);
    }

    Ok(out)
}

#[async_trait]
impl CatalogExecutor for MssqlExecutor {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let rows = tokio::time::timeout(self.timeout, self.run(sql, params))
            .await
            .map_err(|_| {
                CatalogError::access(
                    "mssql query",
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            })??;
        debug!("Catalog query returned {} rows", rows.len());
        Ok(rows)
    }

    fn dialect_name(&self) -> &str {
        "mssql"
    }

    async fn close(&self) {}
}
