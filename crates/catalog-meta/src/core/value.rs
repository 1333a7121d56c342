//! Catalog row values.
//!
//! Drivers convert their native rows into [`CatalogRow`], which addresses
//! values by column name only. Catalog views are administrative objects whose
//! column order can change between server versions, so positional access is
//! deliberately not offered.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// A JSON payload carried as unparsed text.
///
/// A SQL NULL is represented by the *absence* of a `Json` (`Option<Json>::None`),
/// never by a `Json` holding no payload. `Json::new(None)` is a present value
/// with no recorded payload; two such values are equal to each other and
/// distinct from `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Json {
    data: Option<String>,
}

impl Json {
    /// Wrap a payload.
    pub fn new(data: Option<String>) -> Self {
        Self { data }
    }

    /// Wrap a textual payload.
    pub fn value_of(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }

    /// The wrapped payload, if one was recorded.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// True if the payload is absent or blank.
    pub fn is_blank(&self) -> bool {
        self.data.as_deref().map_or(true, |d| d.trim().is_empty())
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(d) => f.write_str(d),
            None => f.write_str("null"),
        }
    }
}

impl From<String> for Json {
    fn from(s: String) -> Self {
        Json::value_of(s)
    }
}

impl From<&str> for Json {
    fn from(s: &str) -> Self {
        Json::value_of(s)
    }
}

/// A single value read from a catalog view.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Json(Json),
}

impl CatalogValue {
    fn type_name(&self) -> &'static str {
        match self {
            CatalogValue::Null => "null",
            CatalogValue::Text(_) => "text",
            CatalogValue::Int(_) => "integer",
            CatalogValue::Bool(_) => "boolean",
            CatalogValue::Json(_) => "json",
        }
    }
}

impl From<Option<String>> for CatalogValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(CatalogValue::Null, CatalogValue::Text)
    }
}

impl From<&str> for CatalogValue {
    fn from(v: &str) -> Self {
        CatalogValue::Text(v.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(v: String) -> Self {
        CatalogValue::Text(v)
    }
}

impl From<i32> for CatalogValue {
    fn from(v: i32) -> Self {
        CatalogValue::Int(v as i64)
    }
}

impl From<Option<i32>> for CatalogValue {
    fn from(v: Option<i32>) -> Self {
        v.map_or(CatalogValue::Null, |v| CatalogValue::Int(v as i64))
    }
}

impl From<i64> for CatalogValue {
    fn from(v: i64) -> Self {
        CatalogValue::Int(v)
    }
}

impl From<bool> for CatalogValue {
    fn from(v: bool) -> Self {
        CatalogValue::Bool(v)
    }
}

impl From<Json> for CatalogValue {
    fn from(v: Json) -> Self {
        CatalogValue::Json(v)
    }
}

/// One row returned by a catalog query, keyed by lowercase column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    values: HashMap<String, CatalogValue>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<CatalogValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<CatalogValue>) {
        self.values.insert(name.to_lowercase(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn value(&self, name: &str) -> Result<&CatalogValue> {
        self.values.get(&name.to_lowercase()).ok_or_else(|| {
            CatalogError::access(
                "decoding catalog row",
                format!("column '{}' missing from result set", name),
            )
        })
    }

    fn mismatch(name: &str, expected: &str, got: &CatalogValue) -> CatalogError {
        CatalogError::access(
            "decoding catalog row",
            format!(
                "column '{}' expected {}, got {}",
                name,
                expected,
                got.type_name()
            ),
        )
    }

    /// Nullable text column.
    pub fn get_text(&self, name: &str) -> Result<Option<String>> {
        match self.value(name)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Text(s) => Ok(Some(s.clone())),
            other => Err(Self::mismatch(name, "text", other)),
        }
    }

    /// Nullable integer column narrowed to i32.
    pub fn get_i32(&self, name: &str) -> Result<Option<i32>> {
        match self.value(name)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Int(v) => i32::try_from(*v).map(Some).map_err(|_| {
                CatalogError::access(
                    "decoding catalog row",
                    format!("column '{}' value {} out of range", name, v),
                )
            }),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    /// Nullable boolean column. Integer 0/1 is accepted for vendors that
    /// report flags numerically.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.value(name)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Bool(b) => Ok(Some(*b)),
            CatalogValue::Int(v) => Ok(Some(*v != 0)),
            CatalogValue::Text(s) => match s.to_uppercase().as_str() {
                "YES" | "TRUE" | "T" => Ok(Some(true)),
                "NO" | "FALSE" | "F" => Ok(Some(false)),
                _ => Err(Self::mismatch(name, "boolean", &CatalogValue::Text(s.clone()))),
            },
            other => Err(Self::mismatch(name, "boolean", other)),
        }
    }

    /// Nullable JSON column. SQL NULL maps to `None`.
    pub fn get_json(&self, name: &str) -> Result<Option<Json>> {
        match self.value(name)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Json(j) => Ok(Some(j.clone())),
            CatalogValue::Text(s) => Ok(Some(Json::value_of(s.clone()))),
            other => Err(Self::mismatch(name, "json", other)),
        }
    }

    /// Non-null text column.
    pub fn require_text(&self, name: &str) -> Result<String> {
        self.get_text(name)?.ok_or_else(|| {
            CatalogError::access(
                "decoding catalog row",
                format!("column '{}' is unexpectedly NULL", name),
            )
        })
    }

    /// Non-null integer column.
    pub fn require_i32(&self, name: &str) -> Result<i32> {
        self.get_i32(name)?.ok_or_else(|| {
            CatalogError::access(
                "decoding catalog row",
                format!("column '{}' is unexpectedly NULL", name),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_json_null_differs_from_blank() {
        let null: Option<Json> = None;
        let blank = Some(Json::new(None));
        let empty = Some(Json::value_of(""));

        assert_ne!(null, blank);
        assert_ne!(null, empty);
        assert_ne!(blank, empty);
        assert!(blank.as_ref().unwrap().is_blank());
        assert!(empty.as_ref().unwrap().is_blank());
    }

    #[test]
    fn test_json_structural_eq_and_hash() {
        let mut set = HashSet::new();
        set.insert(Json::new(None));
        set.insert(Json::new(None));
        set.insert(Json::value_of("{\"a\":1}"));
        set.insert(Json::value_of("{\"a\":1}"));
        assert_eq!(set.len(), 2);
        assert_eq!(Json::new(None).to_string(), "null");
    }

    #[test]
    fn test_row_named_access_is_case_insensitive() {
        let row = CatalogRow::new()
            .with("COLUMN_NAME", "id")
            .with("ordinal_position", 1)
            .with("is_nullable", CatalogValue::Null);

        assert_eq!(row.get_text("column_name").unwrap().as_deref(), Some("id"));
        assert_eq!(row.require_i32("ORDINAL_POSITION").unwrap(), 1);
        assert_eq!(row.get_bool("is_nullable").unwrap(), None);
    }

    #[test]
    fn test_row_missing_column_is_access_error() {
        let row = CatalogRow::new().with("a", 1);
        let err = row.get_text("b").unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_row_type_mismatch() {
        let row = CatalogRow::new().with("a", "text");
        assert!(row.get_i32("a").is_err());
        assert!(row.require_text("missing").is_err());
    }

    #[test]
    fn test_row_bool_from_int_and_text() {
        let row = CatalogRow::new()
            .with("flag_int", 1)
            .with("flag_text", "YES")
            .with("flag_no", "NO");
        assert_eq!(row.get_bool("flag_int").unwrap(), Some(true));
        assert_eq!(row.get_bool("flag_text").unwrap(), Some(true));
        assert_eq!(row.get_bool("flag_no").unwrap(), Some(false));
    }

    #[test]
    fn test_row_json_null_is_none() {
        let row = CatalogRow::new()
            .with("payload", CatalogValue::Null)
            .with("blank", Json::new(None));
        assert_eq!(row.get_json("payload").unwrap(), None);
        assert_eq!(row.get_json("blank").unwrap(), Some(Json::new(None)));
    }

    #[test]
    fn test_row_i32_out_of_range() {
        let row = CatalogRow::new().with("big", i64::MAX);
        assert!(row.get_i32("big").is_err());
    }
}
