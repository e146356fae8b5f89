//! Dialect-neutral row shapes.
//!
//! Every catalog query set maps its vendor catalogs onto these shapes, one
//! per definition kind, so the graph builder stays dialect-agnostic. Fetches
//! return rows ordered by schema, then object name, then ordinal; the
//! builder relies on that ordering for reproducible output.

use super::defs::{RoutineKind, TableKind};

/// One discovered catalog namespace.
#[derive(Debug, Clone)]
pub struct SchemaRow {
    pub name: String,
}

/// One table-like object (table, view, materialized view, table function).
#[derive(Debug, Clone)]
pub struct TableRow {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
    /// View/materialized-view source SQL, where the catalog exposes it.
    pub source: Option<String>,
    pub comment: Option<String>,
}

/// One inheritance edge (child inherits from parent). Postgres only.
#[derive(Debug, Clone)]
pub struct InheritRow {
    pub schema: String,
    pub table: String,
    pub parent_schema: String,
    pub parent_table: String,
}

/// One column of a table-like object.
#[derive(Debug, Clone)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Catalog-reported position. May contain gaps (dropped attributes);
    /// the builder renumbers densely while preserving order.
    pub ordinal: i32,
    pub type_name: String,
    pub length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: bool,
    /// Default literal, already rendered in the source dialect.
    pub default: Option<String>,
    /// Identity / auto-increment column.
    pub identity: bool,
    /// Qualified custom-type name when the column type is a domain, enum,
    /// or UDT.
    pub udt_schema: Option<String>,
    pub udt_name: Option<String>,
    pub comment: Option<String>,
}

/// One column of a primary or unique key.
#[derive(Debug, Clone)]
pub struct KeyColumnRow {
    pub schema: String,
    pub table: String,
    pub key: String,
    pub column: String,
    pub ordinal: i32,
}

/// One referencing column of a foreign key, carrying the referenced key's
/// qualified name for resolution.
#[derive(Debug, Clone)]
pub struct ForeignKeyColumnRow {
    pub schema: String,
    pub table: String,
    pub key: String,
    pub column: String,
    pub ordinal: i32,
    pub ref_key_schema: String,
    pub ref_key: String,
}

/// One table-level check constraint.
#[derive(Debug, Clone)]
pub struct CheckRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Raw predicate text, dialect-specific.
    pub clause: String,
}

/// One column (or expression slot) of an index.
#[derive(Debug, Clone)]
pub struct IndexColumnRow {
    pub schema: String,
    pub table: String,
    pub index: String,
    pub unique: bool,
    /// `None` when the indexed element is an expression rather than a plain
    /// column. The builder skips such indexes.
    pub column: Option<String>,
    pub ordinal: i32,
    pub descending: bool,
}

/// One sequence.
#[derive(Debug, Clone)]
pub struct SequenceRow {
    pub schema: String,
    pub name: String,
    pub type_name: String,
    pub precision: Option<i32>,
    pub start: Option<i128>,
    pub increment: Option<i128>,
    pub min: Option<i128>,
    pub max: Option<i128>,
    pub cycle: bool,
}

/// One enum label. Label order within a type is semantically significant.
#[derive(Debug, Clone)]
pub struct EnumLabelRow {
    pub schema: String,
    pub name: String,
    pub label: String,
    pub sort: i32,
}

/// One domain, or one (domain, check clause) pair for domains with multiple
/// check constraints.
#[derive(Debug, Clone)]
pub struct DomainRow {
    pub schema: String,
    pub name: String,
    pub type_name: String,
    pub length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: bool,
    pub default: Option<String>,
    pub check_clause: Option<String>,
}

/// One attribute of a user-defined (composite) type.
#[derive(Debug, Clone)]
pub struct UdtAttributeRow {
    pub schema: String,
    pub udt: String,
    pub attribute: String,
    pub ordinal: i32,
    pub type_name: String,
    pub length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: bool,
}

/// One routine (function, procedure, or aggregate).
#[derive(Debug, Clone)]
pub struct RoutineRow {
    pub schema: String,
    pub name: String,
    /// Disambiguates overloads; also the overload-order tie-break.
    pub specific_name: String,
    pub kind: RoutineKind,
    pub aggregate: bool,
    pub return_type: Option<String>,
    pub return_precision: Option<i32>,
    pub return_scale: Option<i32>,
}
