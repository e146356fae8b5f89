//! Definition graph assembly.
//!
//! One [`Introspector::introspect`] call runs a complete pass against one
//! connection, strictly sequentially: schemas first, then tables,
//! inheritance, columns, keys, foreign keys, checks, indexes, and finally
//! the standalone kinds (sequences, enums, domains, UDTs, routines). Later
//! steps resolve names against earlier ones through the session's
//! [`ResolutionCache`].
//!
//! Failure semantics: a rejected catalog query or inconsistent key metadata
//! aborts the pass — no partial graph is ever returned. References that
//! cannot be resolved because their target was filtered out of the pass are
//! expected; the referencing object is dropped with a warning.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, trace, warn};

use crate::cache::{KeyHandle, ResolutionCache};
use crate::config::{validation, CompiledFilters, IntrospectConfig};
use crate::core::connection::Connection;
use crate::core::defs::{
    CheckConstraintDef, ColumnDef, DataTypeDef, DefinitionKind, DomainDef, EnumDef,
    ForeignKeyDef, ForeignKeyRef, IndexColumnDef, IndexDef, QualifiedName, RoutineDef,
    SequenceDef, SortOrder, UdtAttributeDef, UdtDef, UniqueKeyDef,
};
use crate::core::graph::{DefinitionGraph, SchemaDef, TableDef, TableId};
use crate::core::rows::{ColumnRow, KeyColumnRow};
use crate::dialect::{CatalogQueries, CatalogSet, Dialect, Session};
use crate::error::{ReflectError, Result};

/// Reverse-engineers a live database into a [`DefinitionGraph`].
///
/// The introspector owns the validated configuration and compiled filters;
/// each [`introspect`](Self::introspect) call creates a fresh session
/// (capability prober + resolution cache) and builds one immutable graph.
pub struct Introspector {
    config: IntrospectConfig,
    filters: CompiledFilters,
    dialect: Dialect,
}

impl Introspector {
    /// Validate the configuration and compile its filters.
    pub fn new(config: IntrospectConfig) -> Result<Self> {
        validation::validate(&config)?;
        let dialect = Dialect::from_name(&config.dialect)?;
        let filters = CompiledFilters::compile(&config.filters)?;
        Ok(Self {
            config,
            filters,
            dialect,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Run one complete introspection pass.
    pub async fn introspect(
        &self,
        conn: &mut (dyn Connection + Send),
    ) -> Result<DefinitionGraph> {
        let queries = CatalogSet::for_dialect(self.dialect);
        let mut session = Session::new(conn, self.dialect, self.config.schemas.clone());
        let mut graph = DefinitionGraph::new(self.dialect);
        let mut cache = ResolutionCache::new();

        info!("Starting introspection pass on {}", self.dialect);

        self.resolve_schemas(&queries, &mut session, &mut graph).await?;
        self.resolve_tables(&queries, &mut session, &mut graph).await?;
        self.resolve_inheritance(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_columns(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_keys(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_foreign_keys(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_checks(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_indexes(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_sequences(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_enums(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_domains(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_udts(&queries, &mut session, &mut graph, &mut cache)
            .await?;
        self.resolve_routines(&queries, &mut session, &mut graph, &mut cache)
            .await?;

        info!(
            "Introspection complete: {} schemas, {} tables, {} sequences, {} enums, {} domains, {} routines",
            graph.schemas.len(),
            graph.tables.len(),
            graph.sequences.len(),
            graph.enums.len(),
            graph.domains.len(),
            graph.routines.len()
        );

        Ok(graph)
    }

    /// Step 1: resolve the effective ordered schema list. Every later
    /// lookup by name must succeed against this set or the referencing
    /// object is skipped.
    async fn resolve_schemas(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
    ) -> Result<()> {
        let discovered = queries.schemas(session).await?;
        let discovered: Vec<String> = discovered.into_iter().map(|r| r.name).collect();

        let effective: Vec<String> = if self.config.schemas.is_empty() {
            discovered
        } else {
            let known: HashSet<&str> = discovered.iter().map(String::as_str).collect();
            self.config
                .schemas
                .iter()
                .filter(|requested| {
                    let found = known.contains(requested.as_str());
                    if !found {
                        warn!("Requested schema '{}' not found in catalog, skipping", requested);
                    }
                    found
                })
                .cloned()
                .collect()
        };

        session.set_schemas(effective.clone());
        for name in effective {
            graph.schemas.push(SchemaDef { name });
        }
        debug!("Resolved {} schemas", graph.schemas.len());
        Ok(())
    }

    /// Step 2: resolve table-like objects. Duplicate (schema, name) rows are
    /// tie-broken by kind priority: table > view > materialized view >
    /// table function.
    async fn resolve_tables(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
    ) -> Result<()> {
        let rows = queries.tables(session).await?;
        let mut seen: HashMap<(String, String), TableId> = HashMap::new();

        for row in rows {
            let Some(schema_id) = graph.schema_by_name(&row.schema) else {
                trace!("Table {}.{} outside the schema filter", row.schema, row.name);
                continue;
            };
            if !self.filters.includes(DefinitionKind::Table, &row.name) {
                debug!("Table {}.{} excluded by filter", row.schema, row.name);
                continue;
            }

            let key = (row.schema.clone(), row.name.clone());
            if let Some(&existing) = seen.get(&key) {
                let existing_def = &mut graph.tables[existing.0];
                if row.kind.priority() < existing_def.kind.priority() {
                    warn!(
                        "Catalog reports {}.{} as both {:?} and {:?}; keeping {:?}",
                        row.schema, row.name, existing_def.kind, row.kind, row.kind
                    );
                    existing_def.kind = row.kind;
                    existing_def.source = row.source;
                    existing_def.comment = row.comment;
                } else {
                    warn!(
                        "Catalog reports {}.{} as both {:?} and {:?}; keeping {:?}",
                        row.schema, row.name, existing_def.kind, row.kind, existing_def.kind
                    );
                }
                continue;
            }

            let id = TableId(graph.tables.len());
            graph.tables.push(TableDef {
                name: row.name,
                schema: schema_id,
                kind: row.kind,
                source: row.source,
                comment: row.comment,
                parent: None,
                children: Vec::new(),
                columns: Vec::new(),
                keys: Vec::new(),
                foreign_keys: Vec::new(),
                indexes: Vec::new(),
                checks: Vec::new(),
            });
            seen.insert(key, id);
        }

        info!("Resolved {} tables", graph.tables.len());
        Ok(())
    }

    /// Step 3: resolve inheritance edges. Single inheritance only; a table
    /// with several catalog-reported parents keeps none of them.
    async fn resolve_inheritance(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.inherits(session).await?;
        if rows.is_empty() {
            return Ok(());
        }

        let mut by_child: BTreeMap<(String, String), Vec<(String, String)>> = BTreeMap::new();
        for row in rows {
            by_child
                .entry((row.schema, row.table))
                .or_default()
                .push((row.parent_schema, row.parent_table));
        }

        for ((schema, table), parents) in by_child {
            if parents.len() > 1 {
                warn!(
                    "Table {}.{} inherits from {} parents; inheritance edges skipped",
                    schema,
                    table,
                    parents.len()
                );
                continue;
            }
            let Some(child) = cache.table(graph, &schema, &table) else {
                continue;
            };
            let (parent_schema, parent_table) = &parents[0];
            let Some(parent) = cache.table(graph, parent_schema, parent_table) else {
                warn!(
                    "Parent table {}.{} of {}.{} is outside the pass; inheritance edge skipped",
                    parent_schema, parent_table, schema, table
                );
                continue;
            };
            graph.tables[child.0].parent = Some(parent);
            graph.tables[parent.0].children.push(child);
        }
        Ok(())
    }

    /// Step 4: resolve columns, renumbering ordinals densely (1..n) while
    /// preserving catalog-reported order.
    async fn resolve_columns(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.columns(session).await?;
        let mut per_table: HashMap<TableId, Vec<ColumnRow>> = HashMap::new();
        for row in rows {
            let Some(table) = cache.table(graph, &row.schema, &row.table) else {
                trace!("Column {}.{}.{} outside the pass", row.schema, row.table, row.name);
                continue;
            };
            per_table.entry(table).or_default().push(row);
        }

        for (table, mut rows) in per_table {
            rows.sort_by_key(|r| r.ordinal);
            let columns: Vec<ColumnDef> = rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| ColumnDef {
                    ordinal: (i + 1) as i32,
                    data_type: data_type_from_parts(
                        row.type_name,
                        row.length,
                        row.precision,
                        row.scale,
                        row.nullable,
                        row.default.clone(),
                        row.udt_schema,
                        row.udt_name,
                    ),
                    name: row.name,
                    nullable: row.nullable,
                    default: row.default,
                    identity: row.identity,
                    comment: row.comment,
                })
                .collect();
            graph.tables[table.0].columns = columns;
        }
        Ok(())
    }

    /// Step 5: resolve primary and unique keys. Keys come before foreign
    /// keys, which bind to them by (schema, key name).
    async fn resolve_keys(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let pk_rows = queries.primary_keys(session).await?;
        self.attach_keys(graph, cache, pk_rows, true);
        let uk_rows = queries.unique_keys(session).await?;
        self.attach_keys(graph, cache, uk_rows, false);
        Ok(())
    }

    fn attach_keys(
        &self,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
        rows: Vec<KeyColumnRow>,
        is_primary: bool,
    ) {
        let mut grouped: BTreeMap<(String, String, String), Vec<KeyColumnRow>> = BTreeMap::new();
        for row in rows {
            grouped
                .entry((row.schema.clone(), row.table.clone(), row.key.clone()))
                .or_default()
                .push(row);
        }

        for ((schema, table_name, key_name), mut rows) in grouped {
            let Some(table) = cache.table(graph, &schema, &table_name) else {
                trace!("Key {} on {}.{} outside the pass", key_name, schema, table_name);
                continue;
            };
            rows.sort_by_key(|r| r.ordinal);
            let columns: Vec<String> = rows.into_iter().map(|r| r.column).collect();

            let missing = {
                let def = graph.table(table);
                columns.iter().find(|c| def.column(c.as_str()).is_none()).cloned()
            };
            if let Some(column) = missing {
                warn!(
                    "Key {} on {}.{} references unknown column {}; key skipped",
                    key_name, schema, table_name, column
                );
                continue;
            }

            let index = graph.tables[table.0].keys.len();
            graph.tables[table.0].keys.push(UniqueKeyDef {
                name: key_name.clone(),
                table,
                columns,
                is_primary,
                referencing_foreign_keys: Vec::new(),
            });
            cache.register_key(&schema, &key_name, KeyHandle { table, index });
        }
    }

    /// Step 6: resolve foreign keys, binding each to its referenced unique
    /// key. Dangling references across excluded schemas are expected and
    /// dropped; column-count mismatches are fatal.
    async fn resolve_foreign_keys(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.foreign_keys(session).await?;
        let mut grouped: BTreeMap<(String, String, String), Vec<crate::core::rows::ForeignKeyColumnRow>> =
            BTreeMap::new();
        for row in rows {
            grouped
                .entry((row.schema.clone(), row.table.clone(), row.key.clone()))
                .or_default()
                .push(row);
        }

        for ((schema, table_name, key_name), mut rows) in grouped {
            let Some(table) = cache.table(graph, &schema, &table_name) else {
                trace!(
                    "Foreign key {} on {}.{} outside the pass",
                    key_name,
                    schema,
                    table_name
                );
                continue;
            };
            rows.sort_by_key(|r| r.ordinal);
            let ref_key_schema = rows[0].ref_key_schema.clone();
            let ref_key_name = rows[0].ref_key.clone();
            let columns: Vec<String> = rows.into_iter().map(|r| r.column).collect();

            let missing = {
                let def = graph.table(table);
                columns.iter().find(|c| def.column(c.as_str()).is_none()).cloned()
            };
            if let Some(column) = missing {
                warn!(
                    "Foreign key {} on {}.{} references unknown column {}; key dropped",
                    key_name, schema, table_name, column
                );
                continue;
            }

            let Some(handle) = cache.key(&ref_key_schema, &ref_key_name) else {
                warn!(
                    "Foreign key {} on {}.{} references key {} outside the pass; key dropped",
                    key_name, schema, table_name, ref_key_name
                );
                continue;
            };

            let referenced_columns = graph.table(handle.table).keys[handle.index]
                .columns
                .clone();
            if referenced_columns.len() != columns.len() {
                return Err(ReflectError::structural(format!(
                    "foreign key {} on {}.{} has {} referencing columns but its \
                     referenced key {} has {}",
                    key_name,
                    schema,
                    table_name,
                    columns.len(),
                    ref_key_name,
                    referenced_columns.len()
                )));
            }

            let fk_index = graph.tables[table.0].foreign_keys.len();
            graph.tables[table.0].foreign_keys.push(ForeignKeyDef {
                name: key_name,
                table,
                columns,
                referenced_table: handle.table,
                referenced_key: ref_key_name,
                referenced_columns,
            });
            graph.tables[handle.table.0].keys[handle.index]
                .referencing_foreign_keys
                .push(ForeignKeyRef {
                    table,
                    index: fk_index,
                });
        }
        Ok(())
    }

    async fn resolve_checks(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.check_constraints(session).await?;
        for row in rows {
            let Some(table) = cache.table(graph, &row.schema, &row.table) else {
                continue;
            };
            graph.tables[table.0].checks.push(CheckConstraintDef {
                name: row.name,
                clause: row.clause,
            });
        }
        Ok(())
    }

    /// Step 7: resolve indexes, materialized eagerly as plain data. An
    /// index with any element the column model cannot represent (expression
    /// elements, columns missing from the table) is skipped whole.
    async fn resolve_indexes(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.indexes(session).await?;
        let mut grouped: BTreeMap<(String, String, String), Vec<crate::core::rows::IndexColumnRow>> =
            BTreeMap::new();
        for row in rows {
            grouped
                .entry((row.schema.clone(), row.table.clone(), row.index.clone()))
                .or_default()
                .push(row);
        }

        'indexes: for ((schema, table_name, index_name), mut rows) in grouped {
            let Some(table) = cache.table(graph, &schema, &table_name) else {
                continue;
            };
            rows.sort_by_key(|r| r.ordinal);

            let unique = rows[0].unique;
            let mut columns = Vec::with_capacity(rows.len());
            for (i, row) in rows.into_iter().enumerate() {
                let Some(column) = row.column else {
                    warn!(
                        "Index {} on {}.{} contains an expression element; index skipped",
                        index_name, schema, table_name
                    );
                    continue 'indexes;
                };
                if graph.table(table).column(&column).is_none() {
                    warn!(
                        "Index {} on {}.{} references unknown column {}; index skipped",
                        index_name, schema, table_name, column
                    );
                    continue 'indexes;
                }
                columns.push(IndexColumnDef {
                    column,
                    ordinal: (i + 1) as i32,
                    order: if row.descending {
                        SortOrder::Desc
                    } else {
                        SortOrder::Asc
                    },
                });
            }

            graph.tables[table.0].indexes.push(IndexDef {
                name: index_name,
                table,
                unique,
                columns,
            });
        }
        Ok(())
    }

    async fn resolve_sequences(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.sequences(session).await?;
        for row in rows {
            let Some(schema) = cache.schema(graph, &row.schema) else {
                continue;
            };
            if !self.filters.includes(DefinitionKind::Sequence, &row.name) {
                debug!("Sequence {} excluded by filter", row.name);
                continue;
            }
            let (start, increment, min, max) = normalize_sequence_bounds(
                &row.type_name,
                row.precision,
                row.start,
                row.increment,
                row.min,
                row.max,
            );
            let mut data_type = DataTypeDef::new(row.type_name);
            data_type.precision = row.precision;
            graph.sequences.push(SequenceDef {
                name: row.name,
                schema,
                data_type,
                start,
                increment,
                min,
                max,
                cycle: row.cycle,
            });
        }
        Ok(())
    }

    /// Enum label order is semantically significant and preserved exactly as
    /// the catalog emitted it.
    async fn resolve_enums(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.enums(session).await?;
        for row in rows {
            let Some(schema) = cache.schema(graph, &row.schema) else {
                continue;
            };
            if !self.filters.includes(DefinitionKind::Enum, &row.name) {
                continue;
            }
            match graph
                .enums
                .iter_mut()
                .find(|e| e.schema == schema && e.name == row.name)
            {
                Some(existing) => existing.labels.push(row.label),
                None => graph.enums.push(EnumDef {
                    name: row.name,
                    schema,
                    labels: vec![row.label],
                }),
            }
        }
        Ok(())
    }

    async fn resolve_domains(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.domains(session).await?;
        for row in rows {
            let Some(schema) = cache.schema(graph, &row.schema) else {
                continue;
            };
            if !self.filters.includes(DefinitionKind::Domain, &row.name) {
                continue;
            }
            match graph
                .domains
                .iter_mut()
                .find(|d| d.schema == schema && d.name == row.name)
            {
                Some(existing) => {
                    if let Some(clause) = row.check_clause {
                        existing.checks.push(clause);
                    }
                }
                None => {
                    let mut data_type = DataTypeDef::new(row.type_name);
                    data_type.length = row.length;
                    data_type.precision = row.precision;
                    data_type.scale = row.scale;
                    data_type.nullable = row.nullable;
                    data_type.default = row.default;
                    graph.domains.push(DomainDef {
                        name: row.name,
                        schema,
                        data_type,
                        checks: row.check_clause.into_iter().collect(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn resolve_udts(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.udts(session).await?;
        let mut grouped: BTreeMap<(String, String), Vec<crate::core::rows::UdtAttributeRow>> =
            BTreeMap::new();
        for row in rows {
            grouped
                .entry((row.schema.clone(), row.udt.clone()))
                .or_default()
                .push(row);
        }

        for ((schema_name, udt_name), mut rows) in grouped {
            let Some(schema) = cache.schema(graph, &schema_name) else {
                continue;
            };
            if !self.filters.includes(DefinitionKind::Udt, &udt_name) {
                continue;
            }
            rows.sort_by_key(|r| r.ordinal);
            let attributes = rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| {
                    let mut data_type = DataTypeDef::new(row.type_name);
                    data_type.length = row.length;
                    data_type.precision = row.precision;
                    data_type.scale = row.scale;
                    data_type.nullable = row.nullable;
                    UdtAttributeDef {
                        name: row.attribute,
                        ordinal: (i + 1) as i32,
                        data_type,
                    }
                })
                .collect();
            graph.udts.push(UdtDef {
                name: udt_name,
                schema,
                attributes,
            });
        }
        Ok(())
    }

    /// Routines are grouped by name; overload indexes are assigned 1-based
    /// in specific-name string order. That tie-break is deliberate:
    /// downstream generated accessor names depend on this exact ordering.
    async fn resolve_routines(
        &self,
        queries: &CatalogSet,
        session: &mut Session<'_>,
        graph: &mut DefinitionGraph,
        cache: &mut ResolutionCache,
    ) -> Result<()> {
        let rows = queries.routines(session).await?;
        let mut grouped: BTreeMap<(String, String), Vec<crate::core::rows::RoutineRow>> =
            BTreeMap::new();
        for row in rows {
            if !self.filters.includes(DefinitionKind::Routine, &row.name) {
                continue;
            }
            grouped
                .entry((row.schema.clone(), row.name.clone()))
                .or_default()
                .push(row);
        }

        for ((schema_name, _), mut rows) in grouped {
            let Some(schema) = cache.schema(graph, &schema_name) else {
                continue;
            };
            rows.sort_by(|a, b| a.specific_name.cmp(&b.specific_name));
            let overloaded = rows.len() > 1;
            for (i, row) in rows.into_iter().enumerate() {
                let return_type = row.return_type.map(|name| {
                    let mut data_type = DataTypeDef::new(name);
                    data_type.precision = row.return_precision;
                    data_type.scale = row.return_scale;
                    data_type
                });
                graph.routines.push(RoutineDef {
                    schema,
                    name: row.name,
                    specific_name: row.specific_name,
                    kind: row.kind,
                    return_type,
                    overload: overloaded.then(|| (i + 1) as i32),
                    aggregate: row.aggregate,
                });
            }
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn data_type_from_parts(
    name: String,
    length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
    nullable: bool,
    default: Option<String>,
    udt_schema: Option<String>,
    udt_name: Option<String>,
) -> DataTypeDef {
    DataTypeDef {
        name,
        length,
        precision,
        scale,
        nullable,
        default,
        udt: match (udt_schema, udt_name) {
            (Some(schema), Some(name)) => Some(QualifiedName::new(schema, name)),
            _ => None,
        },
    }
}

/// Map catalog-reported sequence bounds to overrides: a bound equal to the
/// database default for the sequence's data type becomes `None`.
fn normalize_sequence_bounds(
    type_name: &str,
    precision: Option<i32>,
    start: Option<i128>,
    increment: Option<i128>,
    min: Option<i128>,
    max: Option<i128>,
) -> (Option<i128>, Option<i128>, Option<i128>, Option<i128>) {
    let type_max = default_max_value(type_name, precision);
    (
        start.filter(|v| *v != 1),
        increment.filter(|v| *v != 1),
        min.filter(|v| *v != 1),
        max.filter(|v| Some(*v) != type_max),
    )
}

fn default_max_value(type_name: &str, precision: Option<i32>) -> Option<i128> {
    match type_name.to_lowercase().as_str() {
        "smallint" | "int2" => Some(i16::MAX as i128),
        "integer" | "int" | "int4" => Some(i32::MAX as i128),
        "bigint" | "int8" => Some(i64::MAX as i128),
        "numeric" | "decimal" => precision
            .filter(|p| (1..=38).contains(p))
            .map(|p| 10i128.pow(p as u32) - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sequence_bounds_defaults() {
        let (start, increment, min, max) = normalize_sequence_bounds(
            "bigint",
            None,
            Some(1),
            Some(1),
            Some(1),
            Some(i64::MAX as i128),
        );
        assert_eq!(start, None);
        assert_eq!(increment, None);
        assert_eq!(min, None);
        assert_eq!(max, None);
    }

    #[test]
    fn test_normalize_sequence_bounds_overrides() {
        let (start, increment, min, max) =
            normalize_sequence_bounds("integer", None, Some(100), Some(5), Some(10), Some(5000));
        assert_eq!(start, Some(100));
        assert_eq!(increment, Some(5));
        assert_eq!(min, Some(10));
        assert_eq!(max, Some(5000));
    }

    #[test]
    fn test_default_max_value_numeric() {
        assert_eq!(default_max_value("numeric", Some(3)), Some(999));
        assert_eq!(default_max_value("numeric", None), None);
        assert_eq!(default_max_value("varchar", Some(3)), None);
    }
}
