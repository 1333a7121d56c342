//! Definition types for schemas, tables, columns, and data types.
//!
//! These types form the dialect-independent model handed to downstream
//! consumers. Ownership runs database → schema → table → column → data type;
//! the only cross-edge is a data type's reference to the schema defining a
//! user-defined type, which is a shared handle resolved by name against the
//! database root rather than an ownership edge.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::identifier::QualifiedName;
use super::value::CatalogRow;
use crate::error::Result;

/// A named namespace within a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDefinition {
    /// Owning database name.
    pub database: String,

    /// Schema name.
    pub name: String,

    /// Schema comment, if any.
    pub comment: Option<String>,
}

impl SchemaDefinition {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

/// Kind of relation a table definition describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Table,
    View,
    MaterializedView,
    Foreign,
    Partitioned,
}

impl TableKind {
    /// Parse the kind code reported by the catalog queries.
    ///
    /// Accepts PostgreSQL `relkind` letters and SQL Server `sys.objects.type`
    /// codes. Unknown codes map to `Table`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "v" | "V" => TableKind::View,
            "m" => TableKind::MaterializedView,
            "f" => TableKind::Foreign,
            "p" => TableKind::Partitioned,
            _ => TableKind::Table,
        }
    }
}

/// Identity of a table: the cache key for its column list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableId {
    pub schema: String,
    pub name: String,
}

impl TableId {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A named relation within a schema.
///
/// Column lists are not stored here; they are computed on demand and cached
/// by the [`Database`](crate::database::Database) keyed by [`TableId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    /// Owning schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Relation kind.
    pub kind: TableKind,

    /// Table comment, if any.
    pub comment: Option<String>,
}

impl TableDefinition {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind: TableKind::Table,
            comment: None,
        }
    }

    pub fn id(&self) -> TableId {
        TableId::new(&self.schema, &self.name)
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// How a data type's defining schema was resolved.
///
/// `Unresolved` is a notice, not an error: the type names a schema that has
/// not been scanned, and the consumer decides how to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UdtReference {
    /// No defining schema was reported (built-in type).
    BuiltIn,
    /// The defining schema is part of the scanned model.
    Resolved { schema: Arc<SchemaDefinition> },
    /// The defining schema was reported but has not been scanned.
    Unresolved { schema: String },
}

impl UdtReference {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, UdtReference::Unresolved { .. })
    }

    /// The resolved schema, if any.
    pub fn schema(&self) -> Option<&Arc<SchemaDefinition>> {
        match self {
            UdtReference::Resolved { schema } => Some(schema),
            _ => None,
        }
    }
}

/// Canonical type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTypeDefinition {
    /// Dialect-native type token (e.g. `varchar`, `int4`, `nvarchar`).
    pub type_name: String,

    /// Declared type as reported by the standard metadata view
    /// (e.g. `character varying`, `ARRAY`, `USER-DEFINED`).
    pub declared_type: String,

    /// Effective character length.
    pub length: Option<i32>,

    /// Numeric precision.
    pub precision: Option<i32>,

    /// Numeric scale.
    pub scale: Option<i32>,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Default-value expression as raw text.
    pub default_value: Option<String>,

    /// Uniform `(schema, name)` address of the type.
    pub qualified_name: QualifiedName,

    /// Resolution of the type's defining schema.
    pub udt: UdtReference,

    /// Whether the catalog marks the type as user-defined (enum, composite,
    /// domain, alias type).
    pub user_defined: bool,
}

impl DataTypeDefinition {
    pub fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    pub fn is_array(&self) -> bool {
        self.declared_type.eq_ignore_ascii_case("ARRAY")
    }

    /// Render the type with its length or precision, e.g. `varchar(50)`.
    pub fn display_type(&self) -> String {
        match (self.length, self.precision, self.scale) {
            (Some(len), _, _) if len > 0 => format!("{}({})", self.type_name, len),
            (Some(-1), _, _) => format!("{}(max)", self.type_name),
            (_, Some(p), Some(s)) if is_exact_numeric(&self.type_name) => {
                format!("{}({},{})", self.type_name, p, s)
            }
            _ => self.type_name.clone(),
        }
    }
}

fn is_exact_numeric(type_name: &str) -> bool {
    matches!(
        type_name.to_lowercase().as_str(),
        "numeric" | "decimal"
    )
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// Owning table.
    pub table: TableId,

    /// Column name.
    pub name: String,

    /// Ordinal position (1-based, gapless).
    pub ordinal_position: i32,

    /// Column number as stored by the catalog (`attnum`, `column_id`). Keeps
    /// the holes left by dropped columns.
    pub catalog_ordinal: i32,

    /// Column type.
    pub data_type: DataTypeDefinition,

    /// Whether the column is an identity/auto-increment column.
    pub is_identity: bool,

    /// Column comment. `None` means no comment is recorded, which differs
    /// from an empty comment.
    pub comment: Option<String>,
}

/// One column as read from a dialect's catalog, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawColumn {
    pub name: String,
    pub ordinal_position: i32,
    /// Catalog column number, when the dialect reports one.
    pub catalog_ordinal: Option<i32>,
    pub declared_type: String,
    pub type_name: String,
    /// Length reported by the standard metadata view.
    pub character_maximum_length: Option<i32>,
    /// Vendor-internal type modifier (PostgreSQL `atttypmod`,
    /// SQL Server `sys.columns.max_length`).
    pub type_modifier: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub udt_schema: Option<String>,
    pub udt_name: Option<String>,
    pub user_defined: bool,
    /// Identity flag reported directly by the catalog, when the vendor has one.
    pub catalog_identity: bool,
    pub comment: Option<String>,
}

impl RawColumn {
    /// Decode a row produced by a dialect's column query.
    ///
    /// Every dialect aliases its result columns to the same names, so a
    /// single decoder serves all of them.
    pub fn from_row(row: &CatalogRow) -> Result<Self> {
        let declared_type = row.require_text("declared_type")?;
        let type_name = row
            .get_text("type_name")?
            .unwrap_or_else(|| declared_type.clone());

        Ok(Self {
            name: row.require_text("column_name")?,
            ordinal_position: row.require_i32("ordinal_position")?,
            catalog_ordinal: row.get_i32("catalog_ordinal")?,
            declared_type,
            type_name,
            character_maximum_length: row.get_i32("character_maximum_length")?,
            type_modifier: row.get_i32("type_modifier")?,
            numeric_precision: row.get_i32("numeric_precision")?,
            numeric_scale: row.get_i32("numeric_scale")?,
            is_nullable: row.get_bool("is_nullable")?.unwrap_or(true),
            column_default: row.get_text("column_default")?,
            udt_schema: row.get_text("udt_schema")?,
            udt_name: row.get_text("udt_name")?,
            user_defined: row.get_bool("user_defined")?.unwrap_or(false),
            catalog_identity: row.get_bool("catalog_identity")?.unwrap_or(false),
            comment: row.get_text("description")?,
        })
    }
}
