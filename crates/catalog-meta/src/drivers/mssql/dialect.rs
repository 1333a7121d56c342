//! SQL Server catalog queries.

use async_trait::async_trait;
use tracing::debug;

use crate::core::schema::{RawColumn, SchemaDefinition, TableDefinition, TableKind};
use crate::core::traits::{CatalogDialect, CatalogExecutor};
use crate::error::Result;
use crate::normalize::LengthRecovery;

const SCHEMATA_QUERY: &str = r#"
    SELECT
        s.name AS schema_name,
        CAST(ep.value AS NVARCHAR(4000)) AS description
    FROM sys.schemas s
    LEFT JOIN sys.extended_properties ep
        ON ep.class = 3
       AND ep.major_id = s.schema_id
       AND ep.name = 'MS_Description'
    WHERE s.name NOT IN ('sys', 'INFORMATION_SCHEMA', 'guest')
      AND s.name NOT LIKE 'db[_]%'
    ORDER BY s.name
"#;

const TABLES_QUERY: &str = r#"
    SELECT
        o.name AS table_name,
        RTRIM(o.type) AS table_kind,
        CAST(ep.value AS NVARCHAR(4000)) AS description
    FROM sys.objects o
    JOIN sys.schemas s ON s.schema_id = o.schema_id
    LEFT JOIN sys.extended_properties ep
        ON ep.class = 1
       AND ep.major_id = o.object_id
       AND ep.minor_id = 0
       AND ep.name = 'MS_Description'
    WHERE s.name = @P1
      AND o.type IN ('U', 'V')
      AND o.is_ms_shipped = 0
    ORDER BY o.name
"#;

// Only user-defined types carry a schema; system types are reported as
// built-in. ORDINAL_POSITION follows column_id, which keeps holes after
// ALTER TABLE ... DROP COLUMN, hence the dense row number.
const COLUMNS_QUERY: &str = r#"
    SELECT
        c.COLUMN_NAME AS column_name,
        CAST(ROW_NUMBER() OVER (ORDER BY c.ORDINAL_POSITION) AS INT) AS ordinal_position,
        sc.column_id AS catalog_ordinal,
        c.DATA_TYPE AS declared_type,
        t.name AS type_name,
        CAST(c.CHARACTER_MAXIMUM_LENGTH AS INT) AS character_maximum_length,
        CAST(sc.max_length AS INT) AS type_modifier,
        CAST(c.NUMERIC_PRECISION AS INT) AS numeric_precision,
        CAST(c.NUMERIC_SCALE AS INT) AS numeric_scale,
        CAST(CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END AS BIT) AS is_nullable,
        c.COLUMN_DEFAULT AS column_default,
        CASE WHEN t.is_user_defined = 1 THEN ts.name END AS udt_schema,
        CASE WHEN t.is_user_defined = 1 THEN t.name END AS udt_name,
        t.is_user_defined AS user_defined,
        sc.is_identity AS catalog_identity,
        CAST(ep.value AS NVARCHAR(4000)) AS description
    FROM INFORMATION_SCHEMA.COLUMNS c
    JOIN sys.schemas s
        ON s.name = c.TABLE_SCHEMA
    JOIN sys.objects o
        ON o.name = c.TABLE_NAME
       AND o.schema_id = s.schema_id
    JOIN sys.columns sc
        ON sc.object_id = o.object_id
       AND sc.name = c.COLUMN_NAME
    JOIN sys.types t
        ON t.user_type_id = sc.user_type_id
    JOIN sys.schemas ts
        ON ts.schema_id = t.schema_id
    LEFT JOIN sys.extended_properties ep
        ON ep.class = 1
       AND ep.major_id = o.object_id
       AND ep.minor_id = sc.column_id
       AND ep.name = 'MS_Description'
    WHERE c.TABLE_SCHEMA = @P1
      AND c.TABLE_NAME = @P2
    ORDER BY c.ORDINAL_POSITION
"#;

/// SQL Server catalog dialect.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CatalogDialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    async fn fetch_schemata(
        &self,
        exec: &dyn CatalogExecutor,
        database: &str,
    ) -> Result<Vec<SchemaDefinition>> {
        let rows = exec.query(SCHEMATA_QUERY, &[]).await?;
        rows.iter()
            .map(|row| {
                Ok(SchemaDefinition::new(database, row.require_text("schema_name")?)
                    .with_comment(row.get_text("description")?))
            })
            .collect()
    }

    async fn fetch_tables(
        &self,
        exec: &dyn CatalogExecutor,
        schema: &str,
    ) -> Result<Vec<TableDefinition>> {
        let rows = exec.query(TABLES_QUERY, &[schema]).await?;
        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut table = TableDefinition::new(schema, row.require_text("table_name")?);
            table.kind = match row.get_text("table_kind")?.as_deref() {
                Some("V") => TableKind::View,
                _ => TableKind::Table,
            };
            table.comment = row.get_text("description")?;
            tables.push(table);
        }

        debug!("Found {} relations in schema {}", tables.len(), schema);
        Ok(tables)
    }

    async fn fetch_columns(
        &self,
        exec: &dyn CatalogExecutor,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>> {
        let rows = exec.query(COLUMNS_QUERY, &[schema, table]).await?;
        rows.iter().map(RawColumn::from_row).collect()
    }

    fn identity_marker(&self) -> &str {
        "next value for"
    }

    /// INFORMATION_SCHEMA reports lengths directly, including -1 for `(max)`.
    fn length_recovery(&self) -> LengthRecovery {
        LengthRecovery::none()
    }

    /// Defaults come back wrapped in parentheses, e.g. `((0))` or
    /// `(NEXT VALUE FOR [dbo].[order_seq])`.
    fn unwrap_default<'a>(&self, default: &'a str) -> &'a str {
        default.trim_start_matches(|c: char| c == '(' || c.is_whitespace())
    }
}
