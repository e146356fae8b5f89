//! # dbreflect
//!
//! Reverse-engineers a live database schema into a dialect-neutral,
//! cross-referenced definition graph.
//!
//! One introspection pass reads a database's catalogs — schemas, tables,
//! columns, keys, indexes, sequences, enums, domains, UDTs, routines —
//! through an externally supplied [`Connection`] and assembles them into an
//! immutable [`DefinitionGraph`], typically consumed by a code-generation
//! stage. Five catalog query bundles are included (PostgreSQL, H2, HSQLDB,
//! Derby, Firebird); each maps its vendor catalogs onto one common row
//! shape per definition kind, so the graph builder is dialect-agnostic.
//!
//! Version-dependent catalog features are detected at runtime by probing
//! (not by parsing version strings) and degrade to slower or empty results
//! rather than failing. Within one pass, repeated lookups are memoized and
//! every fetch is ordered deterministically, so re-running introspection
//! against an unchanged schema produces a structurally equal graph.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbreflect::{Introspector, IntrospectConfig};
//!
//! # async fn demo(conn: &mut (dyn dbreflect::Connection + Send)) -> dbreflect::Result<()> {
//! let config = IntrospectConfig::load("introspect.yaml")?;
//! let introspector = Introspector::new(config)?;
//! let graph = introspector.introspect(conn).await?;
//! for table in graph.tables() {
//!     println!("{} ({} columns)", table.name, table.columns.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod core;
pub mod dialect;
pub mod error;
pub mod probe;

// Re-exports for convenient access
pub use builder::Introspector;
pub use config::{CompiledFilters, FilterConfig, FilterRule, IntrospectConfig};
pub use core::connection::Connection;
pub use core::defs::{
    CheckConstraintDef, ColumnDef, DataTypeDef, DefinitionKind, DomainDef, EnumDef,
    ForeignKeyDef, IndexColumnDef, IndexDef, QualifiedName, RoutineDef, RoutineKind,
    SequenceDef, SortOrder, TableKind, UdtAttributeDef, UdtDef, UniqueKeyDef,
};
pub use core::graph::{DefinitionGraph, SchemaDef, SchemaId, TableDef, TableId};
pub use core::row::{CatalogRow, CatalogValue};
pub use dialect::{CatalogQueries, CatalogSet, Dialect, Session};
pub use error::{BoxError, ReflectError, Result};
pub use probe::{Capability, CapabilityProber};
