//! Definition entities.
//!
//! These types are the dialect-neutral representation of one resolved schema
//! object each. They form the contract between introspection (produces) and
//! code generation (consumes, out of scope here). The whole set is owned by
//! a [`DefinitionGraph`](super::graph::DefinitionGraph) and is read-only
//! after the builder finishes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::graph::TableId;

/// Definition kinds, used for error context, cache keys, and per-kind
/// filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Schema,
    Table,
    Column,
    PrimaryKey,
    UniqueKey,
    ForeignKey,
    CheckConstraint,
    Index,
    Sequence,
    Enum,
    Domain,
    Udt,
    Routine,
    Inheritance,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DefinitionKind::Schema => "schemas",
            DefinitionKind::Table => "tables",
            DefinitionKind::Column => "columns",
            DefinitionKind::PrimaryKey => "primary keys",
            DefinitionKind::UniqueKey => "unique keys",
            DefinitionKind::ForeignKey => "foreign keys",
            DefinitionKind::CheckConstraint => "check constraints",
            DefinitionKind::Index => "indexes",
            DefinitionKind::Sequence => "sequences",
            DefinitionKind::Enum => "enums",
            DefinitionKind::Domain => "domains",
            DefinitionKind::Udt => "UDTs",
            DefinitionKind::Routine => "routines",
            DefinitionKind::Inheritance => "inheritance",
        };
        f.write_str(s)
    }
}

/// A (schema, object) name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.schema, self.name)
        }
    }
}

/// What kind of table-like object a [`TableDef`](super::graph::TableDef) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    View,
    MaterializedView,
    TableFunction,
}

impl TableKind {
    /// Tie-break priority when catalogs report the same object under more
    /// than one kind. Lower wins.
    pub(crate) fn priority(self) -> u8 {
        match self {
            TableKind::Table => 0,
            TableKind::View => 1,
            TableKind::MaterializedView => 2,
            TableKind::TableFunction => 3,
        }
    }
}

/// A resolved data type reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeDef {
    /// Type name as reported by the catalog (e.g. "varchar", "numeric").
    pub name: String,
    pub length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: bool,
    /// Default literal, already rendered in the source dialect.
    pub default: Option<String>,
    /// Qualified name of the underlying custom type for domains, enums,
    /// and UDTs.
    pub udt: Option<QualifiedName>,
}

impl DataTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            default: None,
            udt: None,
        }
    }

    /// Type equivalence as used for host-language type mapping downstream:
    /// name, length, precision, and scale must match. Nullability, defaults,
    /// and custom-type linkage are deliberately ignored.
    pub fn equivalent_to(&self, other: &DataTypeDef) -> bool {
        self.name == other.name
            && self.length == other.length
            && self.precision == other.precision
            && self.scale == other.scale
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// 1-based position, unique and gapless within the owning table,
    /// following catalog-reported physical order.
    pub ordinal: i32,
    pub data_type: DataTypeDef,
    pub nullable: bool,
    pub default: Option<String>,
    /// Identity / auto-increment column.
    pub identity: bool,
    pub comment: Option<String>,
}

/// A primary or unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueKeyDef {
    pub name: String,
    /// Owning table.
    pub table: TableId,
    /// Key column names in key order.
    pub columns: Vec<String>,
    pub is_primary: bool,
    /// Foreign keys that reference this key. Back-reference only; the
    /// foreign keys themselves live on their referencing tables.
    pub referencing_foreign_keys: Vec<ForeignKeyRef>,
}

/// Locator for a foreign key: owning table plus position in that table's
/// foreign-key list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: TableId,
    pub index: usize,
}

/// A foreign key, resolved against the unique key it references. Dangling
/// references never reach the graph; the builder drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    pub name: String,
    /// Owning (referencing) table.
    pub table: TableId,
    /// Referencing column names, in key order.
    pub columns: Vec<String>,
    pub referenced_table: TableId,
    /// Name of the referenced unique key on `referenced_table`.
    pub referenced_key: String,
    /// Referenced column names, element-wise matching `columns`.
    pub referenced_columns: Vec<String>,
}

/// Sort direction of one index column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One column of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexColumnDef {
    pub column: String,
    /// 1-based position within the index.
    pub ordinal: i32,
    pub order: SortOrder,
}

/// An index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub table: TableId,
    pub unique: bool,
    pub columns: Vec<IndexColumnDef>,
}

/// A table-level check constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConstraintDef {
    pub name: String,
    /// Raw predicate text, dialect-specific.
    pub clause: String,
}

/// A sequence.
///
/// Bounds are `None` when the catalog value is the database default for the
/// sequence's data type: downstream DDL generation needs no override there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDef {
    pub name: String,
    pub schema: super::graph::SchemaId,
    pub data_type: DataTypeDef,
    pub start: Option<i128>,
    pub increment: Option<i128>,
    pub min: Option<i128>,
    pub max: Option<i128>,
    pub cycle: bool,
}

/// An enum type. Label order encodes the enum's comparison semantics in the
/// source database and is preserved exactly as the catalog reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub schema: super::graph::SchemaId,
    pub labels: Vec<String>,
}

/// A domain: a named, constrained alias for a base type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDef {
    pub name: String,
    pub schema: super::graph::SchemaId,
    pub data_type: DataTypeDef,
    /// Check-constraint clause texts, in catalog order.
    pub checks: Vec<String>,
}

/// One attribute of a user-defined (composite) type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdtAttributeDef {
    pub name: String,
    pub ordinal: i32,
    pub data_type: DataTypeDef,
}

/// A user-defined (composite) type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdtDef {
    pub name: String,
    pub schema: super::graph::SchemaId,
    pub attributes: Vec<UdtAttributeDef>,
}

/// Function or procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Function,
    Procedure,
}

/// A routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDef {
    pub schema: super::graph::SchemaId,
    pub name: String,
    /// Disambiguates overloads.
    pub specific_name: String,
    pub kind: RoutineKind,
    /// Return type; `None` for procedures.
    pub return_type: Option<DataTypeDef>,
    /// 1-based index among same-named routines, assigned in specific-name
    /// string order. `None` when the name is not overloaded. Generated
    /// accessor names downstream depend on this exact ordering.
    pub overload: Option<i32>,
    pub aggregate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equivalence() {
        let mut a = DataTypeDef::new("varchar");
        a.length = Some(255);
        let mut b = DataTypeDef::new("varchar");
        b.length = Some(255);
        b.nullable = false;
        b.default = Some("'x'".to_string());
        assert!(a.equivalent_to(&b));

        b.length = Some(100);
        assert!(!a.equivalent_to(&b));
    }

    #[test]
    fn test_qualified_name_display() {
        assert_eq!(QualifiedName::new("public", "author").to_string(), "public.author");
        assert_eq!(QualifiedName::new("", "author").to_string(), "author");
    }

    #[test]
    fn test_table_kind_priority() {
        assert!(TableKind::Table.priority() < TableKind::View.priority());
        assert!(TableKind::View.priority() < TableKind::MaterializedView.priority());
        assert!(TableKind::MaterializedView.priority() < TableKind::TableFunction.priority());
    }
}
