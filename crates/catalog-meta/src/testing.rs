//! In-memory executor for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::traits::CatalogExecutor;
use crate::core::value::{CatalogRow, CatalogValue};
use crate::error::{CatalogError, Result};

struct Canned {
    fragment: String,
    params: Vec<String>,
    rows: Vec<CatalogRow>,
}

/// Serves canned rows keyed by a SQL fragment and exact parameters, and
/// counts every execution.
pub struct MockExecutor {
    dialect: String,
    canned: Mutex<Vec<Canned>>,
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Option<Duration>,
}

impl MockExecutor {
    pub fn new(dialect: &str) -> Self {
        Self {
            dialect: dialect.to_string(),
            canned: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep before answering, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer statements containing `fragment` with bound `params`.
    pub fn on(self, fragment: &str, params: &[&str], rows: Vec<CatalogRow>) -> Self {
        self.canned.lock().unwrap().push(Canned {
            fragment: fragment.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            rows,
        });
        self
    }

    /// Fail the next `n` executions with an access error.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Number of executions so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogExecutor for MockExecutor {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CatalogError::access("mock query", "connection reset by peer"));
        }

        let canned = self.canned.lock().unwrap();
        let rows = canned
            .iter()
            .find(|c| sql.contains(&c.fragment) && c.params.iter().map(String::as_str).eq(params.iter().copied()))
            .map(|c| c.rows.clone())
            .unwrap_or_default();
        Ok(rows)
    }

    fn dialect_name(&self) -> &str {
        &self.dialect
    }

    async fn close(&self) {}
}

/// Column row in the shape every dialect's column query produces.
#[allow(clippy::too_many_arguments)]
pub fn column_row(
    name: &str,
    ordinal: i32,
    declared_type: &str,
    type_name: &str,
    length: Option<i32>,
    nullable: bool,
    default: Option<&str>,
    udt: Option<(&str, &str)>,
) -> CatalogRow {
    CatalogRow::new()
        .with("column_name", name)
        .with("ordinal_position", ordinal)
        .with("catalog_ordinal", ordinal)
        .with("declared_type", declared_type)
        .with("type_name", type_name)
        .with("character_maximum_length", length)
        .with("type_modifier", length.map_or(-1, |l| l + 4))
        .with("numeric_precision", CatalogValue::Null)
        .with("numeric_scale", CatalogValue::Null)
        .with("is_nullable", nullable)
        .with("column_default", default.map(str::to_string))
        .with("udt_schema", udt.map(|(s, _)| s.to_string()))
        .with("udt_name", udt.map(|(_, n)| n.to_string()))
        .with("user_defined", declared_type == "USER-DEFINED")
        .with("catalog_identity", false)
        .with("description", CatalogValue::Null)
}

/// The `employees (id serial primary key, name varchar(50) not null, notes text)`
/// table as PostgreSQL's catalog reports it.
pub fn employees_rows() -> Vec<CatalogRow> {
    vec![
        column_row(
            "id",
            1,
            "integer",
            "int4",
            None,
            false,
            Some("nextval('employees_id_seq'::regclass)"),
            Some(("pg_catalog", "int4")),
        )
        .with("numeric_precision", 32)
        .with("numeric_scale", 0),
        column_row(
            "name",
            2,
            "character varying",
            "varchar",
            Some(50),
            false,
            None,
            Some(("pg_catalog", "varchar")),
        ),
        column_row(
            "notes",
            3,
            "text",
            "text",
            None,
            true,
            None,
            Some(("pg_catalog", "text")),
        ),
    ]
}
