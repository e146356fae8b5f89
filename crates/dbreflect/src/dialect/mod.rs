//! Catalog query sets, one per database family.
//!
//! Each dialect module maps its vendor catalogs onto the common row shapes
//! in [`crate::core::rows`]:
//!
//! - [`postgres`]: pg_catalog / information_schema
//! - [`h2`]: H2 information schema (2.x, with 1.x fallbacks)
//! - [`hsqldb`]: HSQLDB information schema
//! - [`derby`]: Derby SYS.* tables
//! - [`firebird`]: Firebird RDB$* tables
//!
//! # Dispatch
//!
//! Dialects are selected through the [`CatalogSet`] enum rather than trait
//! objects: the compiler generates a match instead of a vtable, and adding a
//! dialect means adding one module plus one enum arm.
//!
//! # Adding a dialect
//!
//! 1. Create a module under `dialect/` implementing [`CatalogQueries`]
//! 2. Add an enum variant to [`Dialect`] and [`CatalogSet`]
//! 3. Wire it up in [`CatalogSet::for_dialect`]

pub mod derby;
pub mod firebird;
pub mod h2;
pub mod hsqldb;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::connection::Connection;
use crate::core::defs::DefinitionKind;
use crate::core::row::CatalogRow;
use crate::core::rows::{
    CheckRow, ColumnRow, DomainRow, EnumLabelRow, ForeignKeyColumnRow, IndexColumnRow,
    InheritRow, KeyColumnRow, RoutineRow, SchemaRow, SequenceRow, TableRow, UdtAttributeRow,
};
use crate::error::{ReflectError, Result};
use crate::probe::{Capability, CapabilityProber};

pub use derby::DerbyCatalog;
pub use firebird::FirebirdCatalog;
pub use h2::H2Catalog;
pub use hsqldb::HsqldbCatalog;
pub use postgres::PostgresCatalog;

/// A supported database family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    H2,
    Hsqldb,
    Derby,
    Firebird,
}

impl Dialect {
    /// Parse a dialect identifier from configuration.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "h2" => Ok(Dialect::H2),
            "hsqldb" | "hsql" => Ok(Dialect::Hsqldb),
            "derby" => Ok(Dialect::Derby),
            "firebird" => Ok(Dialect::Firebird),
            other => Err(ReflectError::Config(format!(
                "Unknown dialect: '{}'. Supported dialects: postgres, h2, hsqldb, derby, firebird",
                other
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::H2 => "h2",
            Dialect::Hsqldb => "hsqldb",
            Dialect::Derby => "derby",
            Dialect::Firebird => "firebird",
        }
    }

    /// Positional parameter placeholder for the given 1-based index.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            _ => "?".to_string(),
        }
    }

    /// Comma-separated placeholder list for an IN predicate, starting at the
    /// given 1-based index.
    pub(crate) fn placeholders(self, count: usize, start: usize) -> String {
        (0..count)
            .map(|i| self.placeholder(start + i))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One introspection pass's query context: the connection, the effective
/// ordered schema filter, and the capability prober.
pub struct Session<'a> {
    conn: &'a mut (dyn Connection + Send),
    dialect: Dialect,
    schemas: Vec<String>,
    prober: CapabilityProber,
}

impl<'a> Session<'a> {
    pub fn new(
        conn: &'a mut (dyn Connection + Send),
        dialect: Dialect,
        schemas: Vec<String>,
    ) -> Self {
        Self {
            conn,
            dialect,
            schemas,
            prober: CapabilityProber::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The ordered schema filter this pass is restricted to.
    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    /// Replace the schema filter once the effective schema list is resolved.
    pub(crate) fn set_schemas(&mut self, schemas: Vec<String>) {
        self.schemas = schemas;
    }

    /// Execute a catalog query, wrapping any connection error with dialect
    /// and definition-kind context. Fatal: a rejected catalog query fails
    /// the whole pass.
    pub async fn query(
        &mut self,
        kind: DefinitionKind,
        sql: &str,
        params: &[&str],
    ) -> Result<Vec<CatalogRow>> {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| ReflectError::catalog(self.dialect, kind, e.to_string()))
    }

    /// Execute a catalog query whose parameters are exactly the schema
    /// filter, in order. The SQL must contain one placeholder per schema.
    pub async fn query_in_schemas(
        &mut self,
        kind: DefinitionKind,
        sql: &str,
    ) -> Result<Vec<CatalogRow>> {
        let params: Vec<&str> = self.schemas.iter().map(String::as_str).collect();
        self.conn
            .query(sql, &params)
            .await
            .map_err(|e| ReflectError::catalog(self.dialect, kind, e.to_string()))
    }

    /// Probe one capability through the session's memoizing prober.
    pub async fn probe(&mut self, capability: Capability, canary: &str) -> bool {
        self.prober.probe(&mut *self.conn, capability, canary).await
    }

    /// Placeholder list covering the schema filter, starting at parameter 1.
    pub(crate) fn schema_placeholders(&self) -> String {
        self.dialect.placeholders(self.schemas.len(), 1)
    }
}

/// Parse a numeric catalog value rendered as text. Catalogs that store
/// bounds as NUMERIC render them textually to avoid driver-side precision
/// loss; unparseable text degrades to "no override".
pub(crate) fn parse_big(v: Option<String>) -> Option<i128> {
    v.and_then(|s| s.trim().parse::<i128>().ok())
}

/// One catalog query bundle.
///
/// Every fetch returns rows shaped identically across dialects and ordered
/// deterministically (schema, then object name, then ordinal). Dialects that
/// lack a catalog for some kind return a typed empty result; the trait
/// defaults cover the kinds most engines don't have.
#[async_trait]
pub trait CatalogQueries: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Discover catalog namespaces. Called with the configured filter still
    /// in place; when the filter is empty this returns all user schemas.
    async fn schemas(&self, session: &mut Session<'_>) -> Result<Vec<SchemaRow>>;

    async fn tables(&self, session: &mut Session<'_>) -> Result<Vec<TableRow>>;

    /// Table inheritance edges. Postgres only.
    async fn inherits(&self, _session: &mut Session<'_>) -> Result<Vec<InheritRow>> {
        Ok(Vec::new())
    }

    async fn columns(&self, session: &mut Session<'_>) -> Result<Vec<ColumnRow>>;

    async fn primary_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>>;

    async fn unique_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>>;

    async fn foreign_keys(&self, session: &mut Session<'_>) -> Result<Vec<ForeignKeyColumnRow>>;

    async fn check_constraints(&self, session: &mut Session<'_>) -> Result<Vec<CheckRow>>;

    async fn indexes(&self, session: &mut Session<'_>) -> Result<Vec<IndexColumnRow>>;

    async fn sequences(&self, session: &mut Session<'_>) -> Result<Vec<SequenceRow>>;

    /// Enum types with per-type label ordering preserved.
    async fn enums(&self, _session: &mut Session<'_>) -> Result<Vec<EnumLabelRow>> {
        Ok(Vec::new())
    }

    async fn domains(&self, _session: &mut Session<'_>) -> Result<Vec<DomainRow>> {
        Ok(Vec::new())
    }

    /// Composite-type attributes. Postgres only.
    async fn udts(&self, _session: &mut Session<'_>) -> Result<Vec<UdtAttributeRow>> {
        Ok(Vec::new())
    }

    async fn routines(&self, session: &mut Session<'_>) -> Result<Vec<RoutineRow>>;
}

/// Enum-based static dispatch over the bundled catalog query sets.
///
/// Note: manual impl instead of a dispatch macro keeps the delegation
/// readable and the dependency set small. The generated code is the same
/// match the macro would produce.
pub enum CatalogSet {
    Postgres(PostgresCatalog),
    H2(H2Catalog),
    Hsqldb(HsqldbCatalog),
    Derby(DerbyCatalog),
    Firebird(FirebirdCatalog),
}

impl CatalogSet {
    /// Create the query set for a dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Postgres => CatalogSet::Postgres(PostgresCatalog),
            Dialect::H2 => CatalogSet::H2(H2Catalog),
            Dialect::Hsqldb => CatalogSet::Hsqldb(HsqldbCatalog),
            Dialect::Derby => CatalogSet::Derby(DerbyCatalog),
            Dialect::Firebird => CatalogSet::Firebird(FirebirdCatalog),
        }
    }
}

macro_rules! delegate {
    ($self:ident, $method:ident) => {
        match $self {
            CatalogSet::Postgres(d) => d.$method(),
            CatalogSet::H2(d) => d.$method(),
            CatalogSet::Hsqldb(d) => d.$method(),
            CatalogSet::Derby(d) => d.$method(),
            CatalogSet::Firebird(d) => d.$method(),
        }
    };
    // Each arm awaits its own future: the per-dialect futures are distinct
    // types and cannot share one await point.
    ($self:ident, $method:ident, $session:expr) => {
        match $self {
            CatalogSet::Postgres(d) => d.$method($session).await,
            CatalogSet::H2(d) => d.$method($session).await,
            CatalogSet::Hsqldb(d) => d.$method($session).await,
            CatalogSet::Derby(d) => d.$method($session).await,
            CatalogSet::Firebird(d) => d.$method($session).await,
        }
    };
}

#[async_trait]
impl CatalogQueries for CatalogSet {
    fn dialect(&self) -> Dialect {
        delegate!(self, dialect)
    }

    async fn schemas(&self, session: &mut Session<'_>) -> Result<Vec<SchemaRow>> {
        delegate!(self, schemas, session)
    }

    async fn tables(&self, session: &mut Session<'_>) -> Result<Vec<TableRow>> {
        delegate!(self, tables, session)
    }

    async fn inherits(&self, session: &mut Session<'_>) -> Result<Vec<InheritRow>> {
        delegate!(self, inherits, session)
    }

    async fn columns(&self, session: &mut Session<'_>) -> Result<Vec<ColumnRow>> {
        delegate!(self, columns, session)
    }

    async fn primary_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        delegate!(self, primary_keys, session)
    }

    async fn unique_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        delegate!(self, unique_keys, session)
    }

    async fn foreign_keys(&self, session: &mut Session<'_>) -> Result<Vec<ForeignKeyColumnRow>> {
        delegate!(self, foreign_keys, session)
    }

    async fn check_constraints(&self, session: &mut Session<'_>) -> Result<Vec<CheckRow>> {
        delegate!(self, check_constraints, session)
    }

    async fn indexes(&self, session: &mut Session<'_>) -> Result<Vec<IndexColumnRow>> {
        delegate!(self, indexes, session)
    }

    async fn sequences(&self, session: &mut Session<'_>) -> Result<Vec<SequenceRow>> {
        delegate!(self, sequences, session)
    }

    async fn enums(&self, session: &mut Session<'_>) -> Result<Vec<EnumLabelRow>> {
        delegate!(self, enums, session)
    }

    async fn domains(&self, session: &mut Session<'_>) -> Result<Vec<DomainRow>> {
        delegate!(self, domains, session)
    }

    async fn udts(&self, session: &mut Session<'_>) -> Result<Vec<UdtAttributeRow>> {
        delegate!(self, udts, session)
    }

    async fn routines(&self, session: &mut Session<'_>) -> Result<Vec<RoutineRow>> {
        delegate!(self, routines, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_name() {
        assert_eq!(Dialect::from_name("postgres").unwrap(), Dialect::Postgres);
        assert_eq!(Dialect::from_name("postgresql").unwrap(), Dialect::Postgres);
        assert_eq!(Dialect::from_name("pg").unwrap(), Dialect::Postgres);
        assert_eq!(Dialect::from_name("H2").unwrap(), Dialect::H2);
        assert_eq!(Dialect::from_name("hsql").unwrap(), Dialect::Hsqldb);
        assert!(Dialect::from_name("oracle").is_err());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Derby.placeholder(1), "?");
        assert_eq!(Dialect::Postgres.placeholders(3, 1), "$1, $2, $3");
        assert_eq!(Dialect::Firebird.placeholders(2, 1), "?, ?");
    }
}
