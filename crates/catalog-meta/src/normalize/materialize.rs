//! Column materialization.
//!
//! Turns one table's raw catalog rows into [`ColumnDefinition`]s, checking the
//! ordinal invariants and applying the dialect's identity heuristic.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::schema::{ColumnDefinition, RawColumn, SchemaDefinition, TableId};
use crate::core::traits::CatalogDialect;
use crate::error::{CatalogError, Result};

use super::{normalize_type, LengthRecovery};

/// Whether a default expression invokes a sequence.
///
/// The expression is unwrapped by the dialect, lowercased with runs of
/// whitespace collapsed to one space, and compared against `marker`. An
/// absent default is never an identity.
pub fn is_identity_default(
    default: Option<&str>,
    marker: &str,
    unwrap: impl Fn(&str) -> &str,
) -> bool {
    match default {
        Some(text) => unwrap(text)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .starts_with(marker),
        None => false,
    }
}

/// Materialize one table's columns.
///
/// Ordinals must run exactly `1..=n` in row order, catalog column numbers
/// must strictly increase, and names must be unique. Anything else is
/// reported as a `SchemaConsistency` error rather than silently reordered.
pub fn materialize_columns<F>(
    table: &TableId,
    rows: Vec<RawColumn>,
    dialect: &dyn CatalogDialect,
    recovery: &LengthRecovery,
    resolve: F,
) -> Result<Vec<ColumnDefinition>>
where
    F: Fn(&str) -> Option<Arc<SchemaDefinition>>,
{
    let marker = dialect.identity_marker();
    let mut seen = HashSet::with_capacity(rows.len());
    let mut columns = Vec::with_capacity(rows.len());
    let mut last_catalog_ordinal = 0;

    for (idx, raw) in rows.into_iter().enumerate() {
        let expected = idx as i32 + 1;
        if raw.ordinal_position != expected {
            return Err(CatalogError::consistency(
                table.to_string(),
                format!(
                    "column '{}' has ordinal position {}, expected {}",
                    raw.name, raw.ordinal_position, expected
                ),
            ));
        }
        let catalog_ordinal = raw.catalog_ordinal.unwrap_or(raw.ordinal_position);
        if catalog_ordinal <= last_catalog_ordinal {
            return Err(CatalogError::consistency(
                table.to_string(),
                format!(
                    "column '{}' has catalog column number {} after {}",
                    raw.name, catalog_ordinal, last_catalog_ordinal
                ),
            ));
        }
        last_catalog_ordinal = catalog_ordinal;

        if !seen.insert(raw.name.clone()) {
            return Err(CatalogError::consistency(
                table.to_string(),
                format!(
                    "duplicate column name '{}' at position {}",
                    raw.name, raw.ordinal_position
                ),
            ));
        }

        let is_identity = raw.catalog_identity
            || is_identity_default(raw.column_default.as_deref(), marker, |d| {
                dialect.unwrap_default(d)
            });
        let data_type = normalize_type(&raw, recovery, &resolve);

        columns.push(ColumnDefinition {
            table: table.clone(),
            name: raw.name,
            ordinal_position: raw.ordinal_position,
            catalog_ordinal,
            data_type,
            is_identity,
            comment: raw.comment,
        });
    }

    Ok(columns)
}
