//! PostgreSQL catalog queries.

use async_trait::async_trait;
use tracing::debug;

use crate::core::schema::{RawColumn, SchemaDefinition, TableDefinition, TableKind};
use crate::core::traits::{CatalogDialect, CatalogExecutor};
use crate::error::Result;
use crate::normalize::{LengthRecovery, LengthRule};

/// Header bytes (VARHDRSZ) included in a varchar `atttypmod`.
pub const VARHDRSZ: i32 = 4;

const SCHEMATA_QUERY: &str = r#"
    SELECT
        n.nspname::text AS schema_name,
        obj_description(n.oid, 'pg_namespace') AS description
    FROM pg_catalog.pg_namespace n
    WHERE n.nspname NOT LIKE 'pg\_%'
      AND n.nspname <> 'information_schema'
    ORDER BY n.nspname
"#;

const TABLES_QUERY: &str = r#"
    SELECT
        c.relname::text AS table_name,
        c.relkind::text AS table_kind,
        obj_description(c.oid, 'pg_class') AS description
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1::text
      AND c.relkind IN ('r', 'p', 'v', 'm', 'f')
    ORDER BY c.relname
"#;

// information_schema.columns reports attnum as ordinal_position, which has
// holes after a column is dropped. The dense row number is the ordinal the
// model exposes; the description join still uses the real attnum.
const COLUMNS_QUERY: &str = r#"
    SELECT
        c.column_name::text AS column_name,
        (ROW_NUMBER() OVER (ORDER BY c.ordinal_position))::int4 AS ordinal_position,
        a.attnum::int4 AS catalog_ordinal,
        c.data_type::text AS declared_type,
        c.udt_name::text AS type_name,
        c.character_maximum_length::int4 AS character_maximum_length,
        a.atttypmod::int4 AS type_modifier,
        c.numeric_precision::int4 AS numeric_precision,
        c.numeric_scale::int4 AS numeric_scale,
        (c.is_nullable = 'YES') AS is_nullable,
        c.column_default::text AS column_default,
        c.udt_schema::text AS udt_schema,
        c.udt_name::text AS udt_name,
        (c.data_type = 'USER-DEFINED'
            OR c.domain_name IS NOT NULL
            OR (c.data_type = 'ARRAY' AND c.udt_schema <> 'pg_catalog')) AS user_defined,
        (a.attidentity IN ('a', 'd')) AS catalog_identity,
        d.description AS description
    FROM information_schema.columns c
    JOIN pg_catalog.pg_namespace n
        ON n.nspname = c.table_schema
    JOIN pg_catalog.pg_class cl
        ON cl.relname = c.table_name
       AND cl.relnamespace = n.oid
    JOIN pg_catalog.pg_attribute a
        ON a.attrelid = cl.oid
       AND a.attname = c.column_name
    LEFT JOIN pg_catalog.pg_description d
        ON d.objoid = cl.oid
       AND d.objsubid = a.attnum
    WHERE c.table_schema = $1::text
      AND c.table_name = $2::text
    ORDER BY c.ordinal_position
"#;

/// PostgreSQL catalog dialect.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CatalogDialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
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
        let tables = rows
            .iter()
            .map(|row| {
                let mut table = TableDefinition::new(schema, row.require_text("table_name")?);
                table.kind = TableKind::from_code(&row.get_text("table_kind")?.unwrap_or_default());
                table.comment = row.get_text("description")?;
                Ok(table)
            })
            .collect::<Result<Vec<_>>>()?;

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
        "nextval"
    }

    fn length_recovery(&self) -> LengthRecovery {
        LengthRecovery::new(vec![LengthRule::new("_varchar", VARHDRSZ)])
    }
}
