//! The definition graph: one introspection pass's complete, cross-referenced
//! result.
//!
//! Entities reference each other through index-based ids ([`SchemaId`],
//! [`TableId`]) owned by the graph, so back-references (key → referencing
//! foreign keys, table → children) are lookups rather than ownership cycles.
//! The graph is built once per pass, immutable afterward, and safe to hand
//! to any number of downstream readers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

use super::defs::{
    CheckConstraintDef, ColumnDef, DomainDef, EnumDef, ForeignKeyDef, IndexDef, RoutineDef,
    SequenceDef, TableKind, UdtDef, UniqueKeyDef,
};

/// Index of a schema within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(pub(crate) usize);

/// Index of a table within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub(crate) usize);

/// A discovered catalog namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
}

/// A table-like object with everything resolved onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub schema: SchemaId,
    pub kind: TableKind,
    /// View/materialized-view source SQL.
    pub source: Option<String>,
    pub comment: Option<String>,
    /// Single-inheritance parent edge. Multi-parent inheritance is not
    /// modeled; the builder drops such edges with a diagnostic.
    pub parent: Option<TableId>,
    /// Child back-references. Lookup only, not ownership.
    pub children: Vec<TableId>,
    /// Columns sorted by ordinal.
    pub columns: Vec<ColumnDef>,
    /// Primary and unique keys.
    pub keys: Vec<UniqueKeyDef>,
    pub foreign_keys: Vec<ForeignKeyDef>,
    pub indexes: Vec<IndexDef>,
    pub checks: Vec<CheckConstraintDef>,
}

impl TableDef {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The table's primary key, if it has one.
    pub fn primary_key(&self) -> Option<&UniqueKeyDef> {
        self.keys.iter().find(|k| k.is_primary)
    }

    /// Look up a primary/unique key by name.
    pub fn key(&self, name: &str) -> Option<&UniqueKeyDef> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// Look up a foreign key by name.
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKeyDef> {
        self.foreign_keys.iter().find(|k| k.name == name)
    }
}

/// The complete result of one introspection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionGraph {
    pub(crate) dialect: Dialect,
    pub(crate) schemas: Vec<SchemaDef>,
    pub(crate) tables: Vec<TableDef>,
    pub(crate) sequences: Vec<SequenceDef>,
    pub(crate) enums: Vec<EnumDef>,
    pub(crate) domains: Vec<DomainDef>,
    pub(crate) udts: Vec<UdtDef>,
    pub(crate) routines: Vec<RoutineDef>,
}

impl DefinitionGraph {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            schemas: Vec::new(),
            tables: Vec::new(),
            sequences: Vec::new(),
            enums: Vec::new(),
            domains: Vec::new(),
            udts: Vec::new(),
            routines: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Schemas in the order they were requested (or discovered).
    pub fn schemas(&self) -> &[SchemaDef] {
        &self.schemas
    }

    pub fn schema(&self, id: SchemaId) -> &SchemaDef {
        &self.schemas[id.0]
    }

    pub fn schema_by_name(&self, name: &str) -> Option<SchemaId> {
        self.schemas.iter().position(|s| s.name == name).map(SchemaId)
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> &TableDef {
        &self.tables[id.0]
    }

    /// Look up a table id by qualified name.
    pub fn table_id(&self, schema: &str, name: &str) -> Option<TableId> {
        let schema = self.schema_by_name(schema)?;
        self.tables
            .iter()
            .position(|t| t.schema == schema && t.name == name)
            .map(TableId)
    }

    /// Look up a table by qualified name.
    pub fn table_by_name(&self, schema: &str, name: &str) -> Option<&TableDef> {
        self.table_id(schema, name).map(|id| self.table(id))
    }

    /// Tables belonging to one schema, in graph order.
    pub fn tables_in(&self, schema: SchemaId) -> impl Iterator<Item = &TableDef> {
        self.tables.iter().filter(move |t| t.schema == schema)
    }

    pub fn sequences(&self) -> &[SequenceDef] {
        &self.sequences
    }

    pub fn enums(&self) -> &[EnumDef] {
        &self.enums
    }

    pub fn domains(&self) -> &[DomainDef] {
        &self.domains
    }

    pub fn udts(&self) -> &[UdtDef] {
        &self.udts
    }

    pub fn routines(&self) -> &[RoutineDef] {
        &self.routines
    }

    /// Foreign keys referencing the given key, resolved from its
    /// back-references.
    pub fn referencing_foreign_keys<'a>(
        &'a self,
        key: &UniqueKeyDef,
    ) -> Vec<&'a ForeignKeyDef> {
        key.referencing_foreign_keys
            .iter()
            .map(|r| &self.table(r.table).foreign_keys[r.index])
            .collect()
    }

    /// Number of distinct foreign-key names within `fk`'s referencing table
    /// that target the same referenced table. Downstream generators use a
    /// count above one to decide that accessor names need disambiguating
    /// suffixes.
    pub fn count_similar_references(&self, fk: &ForeignKeyDef) -> usize {
        let names: BTreeSet<&str> = self
            .table(fk.table)
            .foreign_keys
            .iter()
            .filter(|other| other.referenced_table == fk.referenced_table)
            .map(|other| other.name.as_str())
            .collect();
        names.len()
    }
}
