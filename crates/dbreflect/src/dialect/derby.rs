//! Apache Derby catalog query set.
//!
//! Derby's SYS.* tables store several things as typed Java objects rather
//! than SQL values: column types render as strings like
//! `VARCHAR(30) NOT NULL`, and key column lists hide inside conglomerate
//! descriptors like `UNIQUE BTREE (2, 1)`. Both are CAST to VARCHAR in the
//! catalog SQL and parsed here; key column numbers are mapped back to names
//! through a per-fetch column-number lookup.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::defs::{DefinitionKind, RoutineKind, TableKind};
use crate::core::rows::{
    CheckRow, ColumnRow, ForeignKeyColumnRow, IndexColumnRow, KeyColumnRow, RoutineRow,
    SchemaRow, SequenceRow, TableRow,
};
use crate::error::Result;
use crate::probe::Capability;

use super::{CatalogQueries, Dialect, Session};

const CANARY_SYSSEQUENCES: &str =
    "select sequencename from sys.syssequences fetch first 1 rows only";

pub struct DerbyCatalog;

#[async_trait]
impl CatalogQueries for DerbyCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::Derby
    }

    async fn schemas(&self, session: &mut Session<'_>) -> Result<Vec<SchemaRow>> {
        let sql = if session.schemas().is_empty() {
            r#"
            SELECT schemaname
            FROM sys.sysschemas
            WHERE schemaname NOT LIKE 'SYS%'
              AND schemaname NOT IN ('SQLJ', 'NULLID')
            ORDER BY schemaname
            "#
            .to_string()
        } else {
            format!(
                r#"
                SELECT schemaname
                FROM sys.sysschemas
                WHERE schemaname IN ({})
                ORDER BY schemaname
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
                s.schemaname,
                t.tablename,
                t.tabletype,
                CAST(v.viewdefinition AS VARCHAR(32672))
            FROM sys.systables t
            JOIN sys.sysschemas s ON t.schemaid = s.schemaid
            LEFT JOIN sys.sysviews v ON v.tableid = t.tableid
            WHERE t.tabletype IN ('T', 'V')
              AND s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Table, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind = match row.text(2)?.as_str() {
                "V" => TableKind::View,
                _ => TableKind::Table,
            };
            out.push(TableRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                kind,
                source: row.opt_text(3)?,
                comment: None,
            });
        }
        Ok(out)
    }

    async fn columns(&self, session: &mut Session<'_>) -> Result<Vec<ColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                t.tablename,
                c.columnname,
                c.columnnumber,
                CAST(c.columndatatype AS VARCHAR(254)),
                CAST(c.columndefault AS VARCHAR(32672)),
                CASE WHEN c.autoincrementvalue IS NOT NULL THEN 1 ELSE 0 END
            FROM sys.syscolumns c
            JOIN sys.systables t ON c.referenceid = t.tableid
            JOIN sys.sysschemas s ON t.schemaid = s.schemaid
            WHERE t.tabletype IN ('T', 'V')
              AND s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename, c.columnnumber
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Column, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let parsed = parse_type_descriptor(&row.text(4)?);
            out.push(ColumnRow {
                schema: row.text(0)?,
                table: row.text(1)?,
                name: row.text(2)?,
                ordinal: row.int(3)? as i32,
                type_name: parsed.name,
                length: parsed.length,
                precision: parsed.precision,
                scale: parsed.scale,
                nullable: parsed.nullable,
                default: row.opt_text(5)?,
                identity: row.boolean(6)?,
                udt_schema: None,
                udt_name: None,
                comment: None,
            });
        }
        Ok(out)
    }

    async fn primary_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        self.key_columns(session, DefinitionKind::PrimaryKey, "P")
            .await
    }

    async fn unique_keys(&self, session: &mut Session<'_>) -> Result<Vec<KeyColumnRow>> {
        self.key_columns(session, DefinitionKind::UniqueKey, "U")
            .await
    }

    async fn foreign_keys(&self, session: &mut Session<'_>) -> Result<Vec<ForeignKeyColumnRow>> {
        let names = self.column_names(session, DefinitionKind::ForeignKey).await?;

        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                t.tablename,
                co.constraintname,
                CAST(cg.descriptor AS VARCHAR(254)),
                rs.schemaname,
                rco.constraintname
            FROM sys.sysforeignkeys fk
            JOIN sys.sysconstraints co ON co.constraintid = fk.constraintid
            JOIN sys.systables t ON co.tableid = t.tableid
            JOIN sys.sysschemas s ON co.schemaid = s.schemaid
            JOIN sys.sysconglomerates cg ON cg.conglomerateid = fk.conglomerateid
            JOIN sys.sysconstraints rco ON rco.constraintid = fk.keyconstraintid
            JOIN sys.sysschemas rs ON rco.schemaid = rs.schemaid
            WHERE s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename, co.constraintname
            "#,
            session.schema_placeholders()
        );

        let rows = session
            .query_in_schemas(DefinitionKind::ForeignKey, &sql)
            .await?;
        let mut out = Vec::new();
        for row in &rows {
            let schema = row.text(0)?;
            let table = row.text(1)?;
            let key = row.text(2)?;
            let (_, numbers) = parse_conglomerate_descriptor(&row.text(3)?);
            let ref_key_schema = row.text(4)?;
            let ref_key = row.text(5)?;
            for (i, number) in numbers.iter().enumerate() {
                let Some(column) = names.get(&(schema.clone(), table.clone(), *number)) else {
                    continue;
                };
                out.push(ForeignKeyColumnRow {
                    schema: schema.clone(),
                    table: table.clone(),
                    key: key.clone(),
                    column: column.clone(),
                    ordinal: (i + 1) as i32,
                    ref_key_schema: ref_key_schema.clone(),
                    ref_key: ref_key.clone(),
                });
            }
        }
        Ok(out)
    }

    async fn check_constraints(&self, session: &mut Session<'_>) -> Result<Vec<CheckRow>> {
        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                t.tablename,
                co.constraintname,
                CAST(ch.checkdefinition AS VARCHAR(32672))
            FROM sys.syschecks ch
            JOIN sys.sysconstraints co ON co.constraintid = ch.constraintid
            JOIN sys.systables t ON co.tableid = t.tableid
            JOIN sys.sysschemas s ON co.schemaid = s.schemaid
            WHERE s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename, co.constraintname
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
        let names = self.column_names(session, DefinitionKind::Index).await?;

        // Conglomerates backing key or foreign-key constraints are covered
        // by the key fetches already.
        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                t.tablename,
                cg.conglomeratename,
                CAST(cg.descriptor AS VARCHAR(254))
            FROM sys.sysconglomerates cg
            JOIN sys.systables t ON cg.tableid = t.tableid
            JOIN sys.sysschemas s ON t.schemaid = s.schemaid
            LEFT JOIN sys.syskeys k ON k.conglomerateid = cg.conglomerateid
            LEFT JOIN sys.sysforeignkeys fk ON fk.conglomerateid = cg.conglomerateid
            WHERE cg.isindex
              AND k.conglomerateid IS NULL
              AND fk.conglomerateid IS NULL
              AND s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename, cg.conglomeratename
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Index, &sql).await?;
        let mut out = Vec::new();
        for row in &rows {
            let schema = row.text(0)?;
            let table = row.text(1)?;
            let index = row.text(2)?;
            let (unique, numbers) = parse_conglomerate_descriptor(&row.text(3)?);
            for (i, number) in numbers.iter().enumerate() {
                out.push(IndexColumnRow {
                    schema: schema.clone(),
                    table: table.clone(),
                    index: index.clone(),
                    unique,
                    column: names
                        .get(&(schema.clone(), table.clone(), *number))
                        .cloned(),
                    ordinal: (i + 1) as i32,
                    descending: false,
                });
            }
        }
        Ok(out)
    }

    async fn sequences(&self, session: &mut Session<'_>) -> Result<Vec<SequenceRow>> {
        // SYS.SYSSEQUENCES only exists from Derby 10.6.
        let available = session
            .probe(Capability::SequenceCatalog, CANARY_SYSSEQUENCES)
            .await;
        if !available {
            tracing::warn!(
                "capability {} unavailable, returning no sequences",
                Capability::SequenceCatalog.id()
            );
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                sq.sequencename,
                CAST(sq.sequencedatatype AS VARCHAR(254)),
                sq.startvalue,
                sq.increment,
                sq.minimumvalue,
                sq.maximumvalue,
                sq.cycleoption
            FROM sys.syssequences sq
            JOIN sys.sysschemas s ON sq.schemaid = s.schemaid
            WHERE s.schemaname IN ({})
            ORDER BY s.schemaname, sq.sequencename
            "#,
            session.schema_placeholders()
        );

        let rows = session
            .query_in_schemas(DefinitionKind::Sequence, &sql)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let parsed = parse_type_descriptor(&row.text(2)?);
            out.push(SequenceRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                type_name: parsed.name,
                precision: parsed.precision,
                start: row.opt_big(3)?,
                increment: row.opt_big(4)?,
                min: row.opt_big(5)?,
                max: row.opt_big(6)?,
                cycle: row.boolean(7)?,
            });
        }
        Ok(out)
    }

    async fn routines(&self, session: &mut Session<'_>) -> Result<Vec<RoutineRow>> {
        // ALIASTYPE: 'F' function, 'P' procedure, 'G' user-defined
        // aggregate. Return types hide inside the ALIASINFO object and are
        // not modeled.
        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                a.alias,
                a.specificname,
                a.aliastype
            FROM sys.sysaliases a
            JOIN sys.sysschemas s ON a.schemaid = s.schemaid
            WHERE a.aliastype IN ('F', 'P', 'G')
              AND NOT a.systemalias
              AND s.schemaname IN ({})
            ORDER BY s.schemaname, a.alias, a.specificname
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(DefinitionKind::Routine, &sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let alias_type = row.text(3)?;
            let kind = match alias_type.as_str() {
                "P" => RoutineKind::Procedure,
                _ => RoutineKind::Function,
            };
            out.push(RoutineRow {
                schema: row.text(0)?,
                name: row.text(1)?,
                specific_name: row.text(2)?,
                kind,
                aggregate: alias_type == "G",
                return_type: None,
                return_precision: None,
                return_scale: None,
            });
        }
        Ok(out)
    }
}

impl DerbyCatalog {
    /// (schema, table, column number) → column name, for descriptor
    /// resolution.
    async fn column_names(
        &self,
        session: &mut Session<'_>,
        kind: DefinitionKind,
    ) -> Result<HashMap<(String, String, i32), String>> {
        let sql = format!(
            r#"
            SELECT s.schemaname, t.tablename, c.columnname, c.columnnumber
            FROM sys.syscolumns c
            JOIN sys.systables t ON c.referenceid = t.tableid
            JOIN sys.sysschemas s ON t.schemaid = s.schemaid
            WHERE s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename, c.columnnumber
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(kind, &sql).await?;
        let mut map = HashMap::with_capacity(rows.len());
        for row in &rows {
            map.insert(
                (row.text(0)?, row.text(1)?, row.int(3)? as i32),
                row.text(2)?,
            );
        }
        Ok(map)
    }

    async fn key_columns(
        &self,
        session: &mut Session<'_>,
        kind: DefinitionKind,
        constraint_type: &str,
    ) -> Result<Vec<KeyColumnRow>> {
        let names = self.column_names(session, kind).await?;

        let sql = format!(
            r#"
            SELECT
                s.schemaname,
                t.tablename,
                co.constraintname,
                CAST(cg.descriptor AS VARCHAR(254))
            FROM sys.sysconstraints co
            JOIN sys.systables t ON co.tableid = t.tableid
            JOIN sys.sysschemas s ON co.schemaid = s.schemaid
            JOIN sys.syskeys k ON k.constraintid = co.constraintid
            JOIN sys.sysconglomerates cg ON cg.conglomerateid = k.conglomerateid
            WHERE co.type = '{constraint_type}'
              AND s.schemaname IN ({})
            ORDER BY s.schemaname, t.tablename, co.constraintname
            "#,
            session.schema_placeholders()
        );

        let rows = session.query_in_schemas(kind, &sql).await?;
        let mut out = Vec::new();
        for row in &rows {
            let schema = row.text(0)?;
            let table = row.text(1)?;
            let key = row.text(2)?;
            let (_, numbers) = parse_conglomerate_descriptor(&row.text(3)?);
            for (i, number) in numbers.iter().enumerate() {
                let Some(column) = names.get(&(schema.clone(), table.clone(), *number)) else {
                    continue;
                };
                out.push(KeyColumnRow {
                    schema: schema.clone(),
                    table: table.clone(),
                    key: key.clone(),
                    column: column.clone(),
                    ordinal: (i + 1) as i32,
                });
            }
        }
        Ok(out)
    }
}

/// Parsed Derby column type descriptor.
struct ParsedType {
    name: String,
    length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
    nullable: bool,
}

/// Parse strings like `INTEGER NOT NULL`, `VARCHAR(30)`, `DECIMAL(10,2)`.
fn parse_type_descriptor(s: &str) -> ParsedType {
    let trimmed = s.trim();
    let nullable = !trimmed.ends_with("NOT NULL");
    let base = trimmed.trim_end_matches("NOT NULL").trim();

    let (name, args) = match (base.find('('), base.rfind(')')) {
        (Some(open), Some(close)) if close > open => {
            let args: Vec<i32> = base[open + 1..close]
                .split(',')
                .filter_map(|p| p.trim().parse().ok())
                .collect();
            (base[..open].trim().to_string(), args)
        }
        _ => (base.to_string(), Vec::new()),
    };

    let upper = name.to_uppercase();
    let is_char = upper.contains("CHAR") || upper.contains("BLOB") || upper.contains("CLOB");
    ParsedType {
        length: if is_char { args.first().copied() } else { None },
        precision: if !is_char { args.first().copied() } else { None },
        scale: if !is_char { args.get(1).copied() } else { None },
        name,
        nullable,
    }
}

/// Parse conglomerate descriptors like `BTREE (1, 2)` or
/// `UNIQUE BTREE (2)`. Returns the unique flag and 1-based column numbers.
fn parse_conglomerate_descriptor(s: &str) -> (bool, Vec<i32>) {
    let trimmed = s.trim();
    let unique = trimmed.starts_with("UNIQUE");
    let numbers = match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if close > open => trimmed[open + 1..close]
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect(),
        _ => Vec::new(),
    };
    (unique, numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_descriptor() {
        let t = parse_type_descriptor("INTEGER NOT NULL");
        assert_eq!(t.name, "INTEGER");
        assert!(!t.nullable);
        assert_eq!(t.length, None);

        let t = parse_type_descriptor("VARCHAR(30)");
        assert_eq!(t.name, "VARCHAR");
        assert!(t.nullable);
        assert_eq!(t.length, Some(30));

        let t = parse_type_descriptor("DECIMAL(10,2) NOT NULL");
        assert_eq!(t.name, "DECIMAL");
        assert_eq!(t.precision, Some(10));
        assert_eq!(t.scale, Some(2));
        assert!(!t.nullable);
    }

    #[test]
    fn test_parse_conglomerate_descriptor() {
        assert_eq!(parse_conglomerate_descriptor("BTREE (1, 2)"), (false, vec![1, 2]));
        assert_eq!(parse_conglomerate_descriptor("UNIQUE BTREE (2)"), (true, vec![2]));
        assert_eq!(parse_conglomerate_descriptor("HEAP"), (false, vec![]));
    }
}
