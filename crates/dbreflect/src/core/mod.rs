//! Core abstractions for dialect-agnostic schema introspection.
//!
//! - [`connection`]: the externally supplied connection seam
//! - [`row`]: tabular catalog results with typed access
//! - [`rows`]: dialect-neutral row shapes, one per definition kind
//! - [`defs`]: resolved definition entities
//! - [`graph`]: the cross-referenced, immutable result aggregate
//!
//! Dialect modules (`crate::dialect`) map vendor catalogs onto the [`rows`]
//! shapes; the builder (`crate::builder`) assembles those rows into a
//! [`graph::DefinitionGraph`]. Nothing in this module issues SQL.

pub mod connection;
pub mod defs;
pub mod graph;
pub mod row;
pub mod rows;

// Re-export commonly used types for convenience
pub use connection::Connection;
pub use defs::{
    CheckConstraintDef, ColumnDef, DataTypeDef, DefinitionKind, DomainDef, EnumDef,
    ForeignKeyDef, ForeignKeyRef, IndexColumnDef, IndexDef, QualifiedName, RoutineDef,
    RoutineKind, SequenceDef, SortOrder, TableKind, UdtAttributeDef, UdtDef, UniqueKeyDef,
};
pub use graph::{DefinitionGraph, SchemaDef, SchemaId, TableDef, TableId};
pub use row::{CatalogRow, CatalogValue};
