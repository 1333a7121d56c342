//! Type normalization.
//!
//! Converts the type-related fields of a [`RawColumn`] into a canonical
//! [`DataTypeDefinition`]. Default expressions are carried through as opaque
//! text; interpreting them is left to the [`materialize`] step.

pub mod materialize;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::identifier::QualifiedName;
use crate::core::schema::{DataTypeDefinition, RawColumn, SchemaDefinition, UdtReference};

pub use materialize::{is_identity_default, materialize_columns};

/// Recover a length from an internal type modifier for one internal type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRule {
    /// Internal type tag the rule applies to (e.g. `_varchar`).
    pub udt_name: String,

    /// Bytes of per-value header included in the modifier.
    pub header_size: i32,
}

impl LengthRule {
    pub fn new(udt_name: impl Into<String>, header_size: i32) -> Self {
        Self {
            udt_name: udt_name.into(),
            header_size,
        }
    }
}

/// Ordered set of length-recovery rules for one dialect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LengthRecovery {
    rules: Vec<LengthRule>,
}

impl LengthRecovery {
    /// No recovery: the standard length is used as-is.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(rules: Vec<LengthRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LengthRule] {
        &self.rules
    }

    /// Effective character length.
    ///
    /// The standard view's value wins when present. Otherwise the first rule
    /// matching `udt_name` yields `modifier - header_size`, provided the
    /// modifier is present and the result is positive (a modifier of -1
    /// means "no modifier"). Anything else is `None`.
    pub fn effective_length(
        &self,
        standard: Option<i32>,
        udt_name: Option<&str>,
        modifier: Option<i32>,
    ) -> Option<i32> {
        if standard.is_some() {
            return standard;
        }

        let udt_name = udt_name?;
        let modifier = modifier?;
        self.rules
            .iter()
            .find(|r| r.udt_name.eq_ignore_ascii_case(udt_name))
            .and_then(|r| modifier.checked_sub(r.header_size))
            .filter(|len| *len > 0)
    }
}

/// Build the canonical data type for one raw column.
///
/// `resolve` looks a schema name up in the database root's registry. A miss
/// yields [`UdtReference::Unresolved`] for a user-defined type, since it may
/// live in a schema that has not been scanned yet. A built-in type whose
/// schema is not registered (PostgreSQL reports `pg_catalog`) stays
/// [`UdtReference::BuiltIn`].
pub fn normalize_type<F>(
    raw: &RawColumn,
    recovery: &LengthRecovery,
    resolve: F,
) -> DataTypeDefinition
where
    F: Fn(&str) -> Option<Arc<SchemaDefinition>>,
{
    let length = recovery.effective_length(
        raw.character_maximum_length,
        raw.udt_name.as_deref(),
        raw.type_modifier,
    );

    let udt = match raw.udt_schema.as_deref().filter(|s| !s.is_empty()) {
        None => UdtReference::BuiltIn,
        Some(schema_name) => match resolve(schema_name) {
            Some(schema) => UdtReference::Resolved { schema },
            None if !raw.user_defined => UdtReference::BuiltIn,
            None => {
                trace!(
                    "Type {} references unscanned schema {}",
                    raw.udt_name.as_deref().unwrap_or(&raw.type_name),
                    schema_name
                );
                UdtReference::Unresolved {
                    schema: schema_name.to_string(),
                }
            }
        },
    };

    let qualified_name = QualifiedName::new(
        raw.udt_schema.clone(),
        raw.udt_name.clone().unwrap_or_else(|| raw.type_name.clone()),
    );

    DataTypeDefinition {
        type_name: raw.type_name.clone(),
        declared_type: raw.declared_type.clone(),
        length,
        precision: raw.numeric_precision,
        scale: raw.numeric_scale,
        nullable: raw.is_nullable,
        default_value: raw.column_default.clone(),
        qualified_name,
        udt,
        user_defined: raw.user_defined,
    }
}
