//! Identifier validation and qualified names.
//!
//! Catalog queries bind schema and table names as parameters, never by
//! string interpolation. Caller-supplied names (configured schemas,
//! `Database::scan_schema`, `Database::columns`) still pass through
//! [`validate_identifier`] first, so malformed input (empty strings, null
//! bytes, oversized names) is rejected with a configuration error instead of
//! an opaque driver failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CatalogError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(CatalogError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(CatalogError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// A `(schema, name)` pair addressing a type or relation.
///
/// Built-in types carry no schema; user-defined types carry the schema that
/// defines them. Both use the same addressing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Defining schema, absent for built-ins.
    pub schema: Option<String>,
    /// Unqualified name.
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.filter(|s| !s.is_empty()),
            name: name.into(),
        }
    }

    /// An unqualified name.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.schema.is_some()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("Order Details").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("bad\0name").is_err());
        assert!(validate_identifier(&"x".repeat(129)).is_err());
        assert!(validate_identifier(&"x".repeat(128)).is_ok());
    }

    #[test]
    fn test_qualified_name_display() {
        let udt = QualifiedName::new(Some("public".into()), "mood");
        assert_eq!(udt.to_string(), "public.mood");
        assert!(udt.is_qualified());

        let builtin = QualifiedName::unqualified("int4");
        assert_eq!(builtin.to_string(), "int4");
        assert!(!builtin.is_qualified());
    }

    #[test]
    fn test_empty_schema_is_unqualified() {
        let name = QualifiedName::new(Some(String::new()), "text");
        assert_eq!(name.schema, None);
    }
}
