//! PostgreSQL catalog query set.
//!
//! Mixes `information_schema` views (portable shapes for columns, keys,
//! domains) with `pg_catalog` tables where the information schema is too
//! lossy (indexes, enums, inheritance, composite types, routines). Catalog
//! shapes that changed across major versions are gated by capability probes
//! rather than version-string parsing.

use async_trait::async_trait;

use crate::core::defs::{DefinitionKind, RoutineKind, TableKind};
use crate::core::rows::{
    CheckRow, ColumnRow, DomainRow, EnumLabelRow, ForeignKeyColumnRow, IndexColumnRow,
    InheritRow, KeyColumnRow, RoutineRow, SchemaRow, SequenceRow, TableRow, UdtAttributeRow,
};
use crate::error::Result;
use crate::probe::Capability;

use super::{parse_big, CatalogQueries, Dialect, Session};

/// Schemas Postgres owns; never part of an introspection pass.
const SYSTEM_SCHEMAS: &str = "('pg_catalog', 'pg_toast', 'information_schema')";

const CANARY_MATVIEWS: &str = "select schemaname from pg_catalog.pg_matviews limit 1";
const CANARY_PG_SEQUENCE: &str = "select seqrelid from pg_catalog.pg_sequence limit 1";
const CANARY_PROKIND: &str = "select prokind from pg_catalog.pg_proc limit 1";
const CANARY_UNNEST_ORDINALITY: &str =
    "select * from unnest(array[1]) with ordinality as t(v, o)";

pub struct PostgresCatalog;

#[async_trait]
impl CatalogQueries for PostgresCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn schemas(&self, session: &mut Session<'_>) -> Result<Vec<SchemaRow>> {
        let sql = if session.schemas().is_empty() {
            format!(
                r#"
                SELECT n.nspname
                FROM pg_catalog.pg_namespace n
                WHERE n.nspname NOT IN {SYSTEM_SCHEMAS}
                  AND n.nspname NOT LIKE 'pg_temp%'
                  AND n.nspname NOT LIKE 'pg_toast_temp%'
                ORDER BY n.nspname
                "#
            )
        } else {
            format!(
                r#"
                SELECT n.nspname
                FROM pg_catalog.pg_namespace n
                WHERE n.nspname IN ({})
                ORDER BY n.nspname
                "#,
                session.schema_placeholders()
            )
        };

        let rows = session.query_in_schemas(DefinitionKind::Schema, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(SchemaRow { name: row.text(0)? });
        }
        Ok(out)
    }

    async fn tables(&self, session: &mut Session<'_>) -> Result<Vec<TableRow>> {
        // pg_matviews appeared in 9.3; on older servers relkind 'm' cannot
        // occur, so the degraded query simply leaves it out of the filter.
        let matviews = session
            .probe(Capability::MaterializedViews, CANARY_MATVIEWS)
            .await;
        let relkinds = if matviews {
            "('r', 'p', 'v', 'm')"
        } else {
            "('r', 'p', 'v')"
        };

        let sql = format!(
            r#"
            SELECT
                n.nspname,
                c.relname,
                c.relkind::text,
                CASE WHEN c.relkind IN ('v', 'm')
                     THEN pg_catalog.pg_get_viewdef(c.oid) END,
                pg_catalog.obj_description(c.oid, 'pg_class')
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE c.relkind IN {relkinds}
              AND n.nspname IN ({})
            ORDER BY n.nspname, c.relname
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Table, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind = match row.text(2)?.as_str() {
                "v" => TableKind::View,
                "m" => TableKind::MaterializedView,
                _ => TableKind::Table,
            };
            out.push(TableRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                kind,
                source: row.opt_text(3)?,
                comment: row.opt_text(4)?,
            });
        }

        // Set-returning functions surface as table-valued functions. Their
        // column sets are not modeled; the builder records the object only.
        let sql = format!(
            r#"
            SELECT n.nspname, p.proname,
                   pg_catalog.obj_description(p.oid, 'pg_proc')
            FROM pg_catalog.pg_proc p
            JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
            WHERE p.proretset
              AND n.nspname IN ({})
            ORDER BY n.nspname, p.proname
            "#,
            session.schema_placeholders()
        );
        let rows = session.query_in_schemas(DefinitionKind::Table, &sql).await?;
        for row in &rows {
            out.push(TableRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                kind: TableKind::TableFunction,
                source: None,
                comment: row.opt_text(2)?,
            });
        }

        Ok(out)
    }

    async fn inherits(&self, session: &mut Session<'_>) -> Result<Vec<InheritRow>> {
        let sql = format!(
            r#"
            SELECT cn.nspname, c.relname, pn.nspname, p.relname
            FROM pg_catalog.pg_inherits i
            JOIN pg_catalog.pg_class c ON c.oid = i.inhrelid
            JOIN pg_catalog.pg_namespace cn ON cn.oid = c.relnamespace
            JOIN pg_catalog.pg_class p ON p.oid = i.inhparent
            JOIN pg_catalog.pg_namespace pn ON pn.oid = p.relnamespace
            WHERE cn.nspname IN ({})
            ORDER BY cn.nspname, c.relname, i.inhseqno
            "#,
            session.schema_placeholders()
        );

        let rows = session
            .query_in_schemas(DefinitionKind::Inheritance, &sql)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(InheritRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                parent_schema: row.text(2)?,
                parent_table: row.text(3)?,
            });
        }
        Ok(out)
    }

    async fn columns(&self, session: &mut Session<'_>) -> Result<Vec<ColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                c.table_schema,
                c.table_name,
                c.column_name,
                c.ordinal_position::int4,
                c.udt_name,
                c.character_maximum_length::int4,
                c.numeric_precision::int4,
                c.numeric_scale::int4,
                c.is_nullable,
                c.column_default,
                CASE WHEN c.is_identity = 'YES'
                       OR c.column_default LIKE 'nextval(%'
                     THEN true ELSE false END,
                c.domain_schema,
                c.domain_name,
                c.udt_schema,
                pg_catalog.col_description(
                    (pg_catalog.quote_ident(c.table_schema) || '.' ||
                     pg_catalog.quote_ident(c.table_name))::regclass::oid,
                    c.ordinal_position::int4)
            FROM information_schema.columns c
            WHERE c.table_schema IN ({})
            ORDER BY c.table_schema, c.table_name, c.ordinal_position
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Column, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let domain_schema = row.opt_text(11)?;
            let domain_name = row.opt_text(12)?;
            let udt_schema = row.opt_text(13)?;
            let type_name = row.text(4)?;

            // Custom-type linkage: a domain wins; otherwise any type owned
            // by a non-system schema (enum, composite) qualifies.
            let (udt_schema, udt_name) = if domain_name.is_some() {
                (domain_schema, domain_name)
            } else {
                match udt_schema {
                    Some(s)
                        if s != "pg_catalog" && s != "information_schema" =>
                    {
                        (Some(s), Some(type_name.clone()))
                    }
                    _ => (None, None),
                }
            };

            out.push(ColumnRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                name: row.text(2)?,
                ordinal: row.int(3)? as i32,
                type_name,
                length: row.opt_int(5)?.map(|v| v as i32),
                precision: row.opt_int(6)?.map(|v| v as i32),
                scale: row.opt_int(7)?.map(|v| v as i32),
                nullable: row.boolean(8)?,
                default: row.opt_text(9)?,
                identity: row.boolean(10)?,
                udt_schema,
                udt_name,
                comment: row.opt_text(14)?,
            });
        }
        Ok(out)
    }

    async fn primary_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        let rows = self
            .key_columns(session, DefinitionKind::PrimaryKey, "PRIMARY KEY")
            .await?;
        Ok(rows)
    }

    async fn unique_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        let rows = self
            .key_columns(session, DefinitionKind::UniqueKey, "UNIQUE")
            .await?;
        Ok(rows)
    }

    async fn foreign_keys(&self, session: &mut Session<'_>) -> Result<Vec<ForeignKeyColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                tc.table_schema,
                tc.table_name,
                tc.constraint_name,
                kcu.column_name,
                kcu.ordinal_position::int4,
                rc.unique_constraint_schema,
                rc.unique_constraint_name
            FROM information_schema.referential_constraints rc
            JOIN information_schema.table_constraints tc
              ON tc.constraint_schema = rc.constraint_schema
             AND tc.constraint_name = rc.constraint_name
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = rc.constraint_schema
             AND kcu.constraint_name = rc.constraint_name
            WHERE tc.table_schema IN ({})
            ORDER BY tc.table_schema, tc.table_name, tc.constraint_name,
                     kcu.ordinal_position
            "#,
            session.schema_placeholders()
        );

        let rows = session
            .query_in_schemas(DefinitionKind::ForeignKey, &sql)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(ForeignKeyColumnRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                key: row.text(2)?,
                column: row.text(3)?,
                ordinal: row.int(4)? as i32,
                ref_key_schema: row.text(5)?,
                ref_key: row.text(6)?,
            });
        }
        Ok(out)
    }

    async fn check_constraints(&self, session: &mut Session<'_>) -> Result<Vec<CheckRow>> {
        // Postgres materializes NOT NULL as synthetic checks named
        // "<oid>_<attnum>_not_null"; those are column metadata, not
        // user-declared constraints.
        let sql = format!(
            r#"
            SELECT
                tc.table_schema,
                tc.table_name,
                tc.constraint_name,
                cc.check_clause
            FROM information_schema.table_constraints tc
            JOIN information_schema.check_constraints cc
              ON cc.constraint_schema = tc.constraint_schema
             AND cc.constraint_name = tc.constraint_name
            WHERE tc.constraint_type = 'CHECK'
              AND tc.constraint_name NOT LIKE '%not_null'
              AND tc.table_schema IN ({})
            ORDER BY tc.table_schema, tc.table_name, tc.constraint_name
            "#,
            session.schema_placeholders()
        );

        let rows = session
            .query_in_schemas(DefinitionKind::CheckConstraint, &sql)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(CheckRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                name: row.text(2)?,
                clause: row.text(3)?,
            });
        }
        Ok(out)
    }

    async fn indexes(&self, session: &mut Session<'_>) -> Result<Vec<IndexColumnRow>> {
        // indkey is an int2vector; element 0 marks an expression rather than
        // a column, which the LEFT JOIN turns into a NULL attname. int2vector
        // subscripts are 0-based, unlike regular arrays.
        let ordinality = session
            .probe(Capability::UnnestOrdinality, CANARY_UNNEST_ORDINALITY)
            .await;

        let sql = if ordinality {
            format!(
                r#"
                SELECT
                    n.nspname,
                    t.relname,
                    i.relname,
                    ix.indisunique,
                    a.attname,
                    k.ord::int4,
                    (ix.indoption[k.ord - 1] & 1) = 1
                FROM pg_catalog.pg_index ix
                JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid
                JOIN pg_catalog.pg_class t ON t.oid = ix.indrelid
                JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
                CROSS JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord)
                LEFT JOIN pg_catalog.pg_attribute a
                  ON a.attrelid = t.oid AND a.attnum = k.attnum AND k.attnum <> 0
                WHERE n.nspname IN ({})
                  AND NOT ix.indisprimary
                ORDER BY n.nspname, t.relname, i.relname, k.ord
                "#,
                session.schema_placeholders()
            )
        } else {
            tracing::warn!(
                "capability {} unavailable, using generate_subscripts for index columns",
                Capability::UnnestOrdinality.id()
            );
            format!(
                r#"
                SELECT
                    n.nspname,
                    t.relname,
                    i.relname,
                    ix.indisunique,
                    a.attname,
                    (s.i + 1)::int4,
                    (ix.indoption[s.i] & 1) = 1
                FROM pg_catalog.pg_index ix
                JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid
                JOIN pg_catalog.pg_class t ON t.oid = ix.indrelid
                JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
                CROSS JOIN LATERAL generate_subscripts(ix.indkey, 1) AS s(i)
                LEFT JOIN pg_catalog.pg_attribute a
                  ON a.attrelid = t.oid AND a.attnum = ix.indkey[s.i]
                 AND ix.indkey[s.i] <> 0
                WHERE n.nspname IN ({})
                  AND NOT ix.indisprimary
                ORDER BY n.nspname, t.relname, i.relname, s.i
                "#,
                session.schema_placeholders()
            )
        };

        let rows = session.query_in_schemas(DefinitionKind::Index, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(IndexColumnRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                index: row.text(2)?,
                unique: row.boolean(3)?,
                column: row.opt_text(4)?,
                ordinal: row.int(5)? as i32,
                descending: row.boolean(6)?,
            });
        }
        Ok(out)
    }

    async fn sequences(&self, session: &mut Session<'_>) -> Result<Vec<SequenceRow>> {
        let pg_sequence = session
            .probe(Capability::SequenceCatalog, CANARY_PG_SEQUENCE)
            .await;

        let sql = if pg_sequence {
            format!(
                r#"
                SELECT
                    n.nspname,
                    c.relname,
                    pg_catalog.format_type(s.seqtypid, NULL),
                    s.seqstart::text,
                    s.seqincrement::text,
                    s.seqmin::text,
                    s.seqmax::text,
                    s.seqcycle
                FROM pg_catalog.pg_sequence s
                JOIN pg_catalog.pg_class c ON c.oid = s.seqrelid
                JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
                WHERE n.nspname IN ({})
                ORDER BY n.nspname, c.relname
                "#,
                session.schema_placeholders()
            )
        } else {
            // Pre-10 servers have no pg_sequence; the information schema
            // carries the same logical columns, more slowly.
            tracing::warn!(
                "capability {} unavailable, reading sequences from information_schema",
                Capability::SequenceCatalog.id()
            );
            format!(
                r#"
                SELECT
                    sequence_schema,
                    sequence_name,
                    data_type,
                    start_value,
                    increment,
                    minimum_value,
                    maximum_value,
                    cycle_option
                FROM information_schema.sequences
                WHERE sequence_schema IN ({})
                ORDER BY sequence_schema, sequence_name
                "#,
                session.schema_placeholders()
            )
        };

        let rows = session
            .query_in_schemas(DefinitionKind::Sequence, &sql)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(SequenceRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                type_name: row.text(2)?,
                precision: None,
                start: parse_big(row.opt_text(3)?),
                increment: parse_big(row.opt_text(4)?),
                min: parse_big(row.opt_text(5)?),
                max: parse_big(row.opt_text(6)?),
                cycle: row.boolean(7)?,
            });
        }
        Ok(out)
    }

    async fn enums(&self, session: &mut Session<'_>) -> Result<Vec<EnumLabelRow>> {
        // enumsortorder is a float (labels added between existing ones get
        // fractional sort keys); the emitted sort is the arrival index.
        let sql = format!(
            r#"
            SELECT n.nspname, t.typname, e.enumlabel
            FROM pg_catalog.pg_type t
            JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
            WHERE n.nspname IN ({})
            ORDER BY n.nspname, t.typname, e.enumsortorder
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Enum, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            out.push(EnumLabelRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                label: row.text(2)?,
                sort: i as i32,
            });
        }
        Ok(out)
    }

    async fn domains(&self, session: &mut Session<'_>) -> Result<Vec<DomainRow>> {
        let sql = format!(
            r#"
            SELECT
                d.domain_schema,
                d.domain_name,
                d.udt_name,
                d.character_maximum_length::int4,
                d.numeric_precision::int4,
                d.numeric_scale::int4,
                d.domain_default,
                cc.check_clause
            FROM information_schema.domains d
            LEFT JOIN information_schema.domain_constraints dc
              ON dc.domain_schema = d.domain_schema
             AND dc.domain_name = d.domain_name
            LEFT JOIN information_schema.check_constraints cc
              ON cc.constraint_schema = dc.constraint_schema
             AND cc.constraint_name = dc.constraint_name
            WHERE d.domain_schema IN ({})
            ORDER BY d.domain_schema, d.domain_name, dc.constraint_name
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Domain, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(DomainRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                type_name: row.text(2)?,
                length: row.opt_int(3)?.map(|v| v as i32),
                precision: row.opt_int(4)?.map(|v| v as i32),
                scale: row.opt_int(5)?.map(|v| v as i32),
                nullable: true,
                default: row.opt_text(6)?,
                check_clause: row.opt_text(7)?,
            });
        }
        Ok(out)
    }

    async fn udts(&self, session: &mut Session<'_>) -> Result<Vec<UdtAttributeRow>> {
        let sql = format!(
            r#"
            SELECT
                n.nspname,
                t.typname,
                a.attname,
                a.attnum::int4,
                pg_catalog.format_type(a.atttypid, a.atttypmod),
                NOT a.attnotnull
            FROM pg_catalog.pg_type t
            JOIN pg_catalog.pg_class c ON c.oid = t.typrelid AND c.relkind = 'c'
            JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = c.oid AND a.attnum > 0 AND NOT a.attisdropped
            WHERE n.nspname IN ({})
            ORDER BY n.nspname, t.typname, a.attnum
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Udt, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(UdtAttributeRow {
                schema: row.text(0)?,
                udt: row.text(1)?,
                attribute: row.text(2)?,
                ordinal: row.int(3)? as i32,
                type_name: row.text(4)?,
                length: None,
                precision: None,
                scale: None,
                nullable: row.boolean(5)?,
            });
        }
        Ok(out)
    }

    async fn routines(&self, session: &mut Session<'_>) -> Result<Vec<RoutineRow>> {
        // prokind replaced proisagg in Postgres 11. Window functions ('w')
        // are excluded either way; they are not callable routines for
        // generation purposes.
        let prokind = session
            .probe(Capability::RoutineKindColumn, CANARY_PROKIND)
            .await;

        let sql = if prokind {
            format!(
                r#"
                SELECT
                    n.nspname,
                    p.proname,
                    p.proname || '_' || p.oid,
                    p.prokind::text,
                    CASE WHEN p.prokind = 'p' THEN NULL
                         ELSE pg_catalog.format_type(p.prorettype, NULL) END
                FROM pg_catalog.pg_proc p
                JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
                WHERE n.nspname IN ({})
                  AND p.prokind <> 'w'
                ORDER BY n.nspname, p.proname, p.proname || '_' || p.oid
                "#,
                session.schema_placeholders()
            )
        } else {
            tracing::warn!(
                "capability {} unavailable, classifying routines via proisagg",
                Capability::RoutineKindColumn.id()
            );
            format!(
                r#"
                SELECT
                    n.nspname,
                    p.proname,
                    p.proname || '_' || p.oid,
                    CASE WHEN p.proisagg THEN 'a' ELSE 'f' END,
                    pg_catalog.format_type(p.prorettype, NULL)
                FROM pg_catalog.pg_proc p
                JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
                WHERE n.nspname IN ({})
                ORDER BY n.nspname, p.proname, p.proname || '_' || p.oid
                "#,
                session.schema_placeholders()
            )
        };

        let rows = session.query_in_schemas(DefinitionKind::Routine, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let tag = row.text(3)?;
            let kind = match tag.as_str() {
                "p" => RoutineKind::Procedure,
                _ => RoutineKind::Function,
            };
            out.push(RoutineRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                specific_name: row.text(2)?,
                kind,
                aggregate: tag == "a",
                return_type: row.opt_text(4)?,
                return_precision: None,
                return_scale: None,
            });
        }
        Ok(out)
    }
}

impl PostgresCatalog {
    /// Shared shape for primary- and unique-key column fetches.
    async fn key_columns(
        &self,
        session: &mut Session<'_>,
        kind: DefinitionKind,
        constraint_type: &str,
    ) -> Result<Vec<KeyColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                tc.table_schema,
                tc.table_name,
                tc.constraint_name,
                kcu.column_name,
                kcu.ordinal_position::int4
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_schema = tc.table_schema
             AND kcu.table_name = tc.table_name
            WHERE tc.constraint_type = '{constraint_type}'
              AND tc.table_schema IN ({})
            ORDER BY tc.table_schema, tc.table_name, tc.constraint_name,
                     kcu.ordinal_position
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(kind, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(KeyColumnRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                key: row.text(2)?,
                column: row.text(3)?,
                ordinal: row.int(4)? as i32,
            });
        }
        Ok(out)
    }
}
