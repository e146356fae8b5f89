//! H2 catalog query set.
//!
//! Targets the H2 2.x information schema, which is close to the SQL
//! standard. The 1.x engine shipped a different, JDBC-flavored schema; where
//! the two diverge (per-column index catalog, routine catalog) the 2.x
//! catalog is probed and the query degrades — to the 1.x `INDEXES` table for
//! index columns, and to a typed empty result for routines.

use async_trait::async_trait;

use crate::core::defs::{DefinitionKind, RoutineKind, TableKind};
use crate::core::rows::{
    CheckRow, ColumnRow, DomainRow, ForeignKeyColumnRow, IndexColumnRow, KeyColumnRow,
    RoutineRow, SchemaRow, SequenceRow, TableRow,
};
use crate::error::Result;
use crate::probe::Capability;

use super::{CatalogQueries, Dialect, Session};

const CANARY_INDEX_COLUMNS: &str =
    "select column_name from information_schema.index_columns limit 1";
const CANARY_ROUTINES: &str =
    "select routine_type from information_schema.routines limit 1";

pub struct H2Catalog;

#[async_trait]
impl CatalogQueries for H2Catalog {
    fn dialect(&self) -> Dialect {
        Dialect::H2
    }

    async fn schemas(&self, session: &mut Session<'_>) -> Result<Vec<SchemaRow>> {
        let sql = if session.schemas().is_empty() {
            r#"
            SELECT schema_name
            FROM information_schema.schemata
            WHERE schema_name <> 'INFORMATION_SCHEMA'
            ORDER BY schema_name
            "#
            .to_string()
        } else {
            format!(
                r#"
                SELECT schema_name
                FROM information_schema.schemata
                WHERE schema_name IN ({})
                ORDER BY schema_name
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
        let sql = format!(
            r#"
            SELECT
                t.table_schema,
                t.table_name,
                t.table_type,
                v.view_definition,
                t.remarks
            FROM information_schema.tables t
            LEFT JOIN information_schema.views v
              ON v.table_schema = t.table_schema
             AND v.table_name = t.table_name
            WHERE t.table_schema IN ({})
            ORDER BY t.table_schema, t.table_name
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Table, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind = match row.text(2)?.as_str() {
                "VIEW" => TableKind::View,
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
        Ok(out)
    }

    async fn columns(&self, session: &mut Session<'_>) -> Result<Vec<ColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                c.table_schema,
                c.table_name,
                c.column_name,
                c.ordinal_position,
                c.data_type,
                c.character_maximum_length,
                c.numeric_precision,
                c.numeric_scale,
                c.is_nullable,
                c.column_default,
                c.is_identity,
                c.domain_schema,
                c.domain_name,
                c.remarks
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
            out.push(ColumnRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                name: row.text(2)?,
                ordinal: row.int(3)? as i32,
                type_name: row.text(4)?,
                length: row.opt_int(5)?.map(|v| v as i32),
                precision: row.opt_int(6)?.map(|v| v as i32),
                scale: row.opt_int(7)?.map(|v| v as i32),
                nullable: row.boolean(8)?,
                default: row.opt_text(9)?,
                identity: row.boolean(10)?,
                udt_schema: domain_schema,
                udt_name: domain_name,
                comment: row.opt_text(13)?,
            });
        }
        Ok(out)
    }

    async fn primary_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        self.key_columns(session, DefinitionKind::PrimaryKey, "PRIMARY KEY")
            .await
    }

    async fn unique_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        self.key_columns(session, DefinitionKind::UniqueKey, "UNIQUE")
            .await
    }

    async fn foreign_keys(&self, session: &mut Session<'_>) -> Result<Vec<ForeignKeyColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                tc.table_schema,
                tc.table_name,
                tc.constraint_name,
                kcu.column_name,
                kcu.ordinal_position,
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
        let v2 = session
            .probe(Capability::IndexColumnCatalog, CANARY_INDEX_COLUMNS)
            .await;

        let sql = if v2 {
            format!(
                r#"
                SELECT
                    ic.table_schema,
                    ic.table_name,
                    ic.index_name,
                    CASE WHEN i.index_type_name IN ('UNIQUE INDEX', 'PRIMARY KEY')
                         THEN TRUE ELSE FALSE END,
                    ic.column_name,
                    ic.ordinal_position,
                    ic.ordering_specification = 'DESC'
                FROM information_schema.index_columns ic
                JOIN information_schema.indexes i
                  ON i.index_schema = ic.index_schema
                 AND i.index_name = ic.index_name
                WHERE ic.table_schema IN ({})
                  AND i.index_type_name <> 'PRIMARY KEY'
                ORDER BY ic.table_schema, ic.table_name, ic.index_name,
                         ic.ordinal_position
                "#,
                session.schema_placeholders()
            )
        } else {
            // 1.x keeps one row per index column in INDEXES directly.
            tracing::warn!(
                "capability {} unavailable, using the 1.x index catalog",
                Capability::IndexColumnCatalog.id()
            );
            format!(
                r#"
                SELECT
                    i.table_schema,
                    i.table_name,
                    i.index_name,
                    NOT i.non_unique,
                    i.column_name,
                    i.ordinal_position,
                    FALSE
                FROM information_schema.indexes i
                WHERE i.table_schema IN ({})
                  AND i.primary_key = FALSE
                ORDER BY i.table_schema, i.table_name, i.index_name,
                         i.ordinal_position
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
        let sql = format!(
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
        );

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
                start: row.opt_big(3)?,
                increment: row.opt_big(4)?,
                min: row.opt_big(5)?,
                max: row.opt_big(6)?,
                cycle: row.boolean(7)?,
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
                d.data_type,
                d.character_maximum_length,
                d.numeric_precision,
                d.numeric_scale,
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

    async fn routines(&self, session: &mut Session<'_>) -> Result<Vec<RoutineRow>> {
        // 1.x has FUNCTION_ALIASES instead; its shape carries no specific
        // names, so on old engines routines degrade to an empty kind.
        let v2 = session
            .probe(Capability::RoutineKindColumn, CANARY_ROUTINES)
            .await;
        if !v2 {
            tracing::warn!(
                "capability {} unavailable, returning no routines",
                Capability::RoutineKindColumn.id()
            );
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT
                r.routine_schema,
                r.routine_name,
                r.specific_name,
                r.routine_type,
                r.data_type
            FROM information_schema.routines r
            WHERE r.routine_schema IN ({})
            ORDER BY r.routine_schema, r.routine_name, r.specific_name
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Routine, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let routine_type = row.text(3)?;
            let kind = match routine_type.as_str() {
                "PROCEDURE" => RoutineKind::Procedure,
                _ => RoutineKind::Function,
            };
            out.push(RoutineRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                specific_name: row.text(2)?,
                kind,
                aggregate: routine_type == "AGGREGATE",
                return_type: row.opt_text(4)?,
                return_precision: None,
                return_scale: None,
            });
        }
        Ok(out)
    }
}

impl H2Catalog {
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
                kcu.ordinal_position
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
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
