//! Firebird catalog query set.
//!
//! Firebird has no schema namespaces; the bundle reports one unnamed schema
//! and ignores the schema filter. Object names live in space-padded CHAR
//! columns, so every name is TRIMmed at the source. Column types are numeric
//! codes in RDB$FIELDS, decoded here; scales are stored negated.

use async_trait::async_trait;

use crate::core::defs::{DefinitionKind, RoutineKind, TableKind};
use crate::core::rows::{
    CheckRow, ColumnRow, DomainRow, ForeignKeyColumnRow, IndexColumnRow, KeyColumnRow,
    RoutineRow, SchemaRow, SequenceRow, TableRow,
};
use crate::error::Result;
use crate::probe::Capability;

use super::{CatalogQueries, Dialect, Session};

/// Firebird 3 marker: identity columns and generator bounds arrived
/// together.
const CANARY_GENERATOR_BOUNDS: &str =
    "select rdb$initial_value from rdb$generators rows 1";

pub struct FirebirdCatalog;

#[async_trait]
impl CatalogQueries for FirebirdCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::Firebird
    }

    async fn schemas(&self, _session: &mut Session<'_>) -> Result<Vec<SchemaRow>> {
        // Single anonymous namespace.
        Ok(vec![SchemaRow {
            name: String::new(),
        }])
    }

    async fn tables(&self, session: &mut Session<'_>) -> Result<Vec<TableRow>> {
        let sql = r#"
            SELECT
                TRIM(r.rdb$relation_name),
                CASE WHEN r.rdb$view_blr IS NULL THEN 'T' ELSE 'V' END,
                r.rdb$view_source,
                r.rdb$description
            FROM rdb$relations r
            WHERE COALESCE(r.rdb$system_flag, 0) = 0
            ORDER BY r.rdb$relation_name
        "#;

        let rows = session.query(DefinitionKind::Table, sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind = match row.text(1)?.as_str() {
                "V" => TableKind::View,
                _ => TableKind::Table,
            };
            out.push(TableRow {
                schema: String::new(),
                name: row.text(0)?,
                kind,
                source: row.opt_text(2)?,
                comment: row.opt_text(3)?,
            });
        }
        Ok(out)
    }

    async fn columns(&self, session: &mut Session<'_>) -> Result<Vec<ColumnRow>> {
        let fb3 = session
            .probe(Capability::GeneratorBounds, CANARY_GENERATOR_BOUNDS)
            .await;

        // rdb$identity_type does not exist before Firebird 3; the degraded
        // query pins the column to NULL.
        let identity_column = if fb3 {
            "rf.rdb$identity_type"
        } else {
            "CAST(NULL AS SMALLINT)"
        };

        let sql = format!(
            r#"
            SELECT
                TRIM(rf.rdb$relation_name),
                TRIM(rf.rdb$field_name),
                rf.rdb$field_position,
                f.rdb$field_type,
                f.rdb$field_sub_type,
                f.rdb$field_precision,
                f.rdb$field_scale,
                f.rdb$character_length,
                rf.rdb$null_flag,
                COALESCE(rf.rdb$default_source, f.rdb$default_source),
                {identity_column},
                CASE WHEN f.rdb$field_name NOT LIKE 'RDB$%'
                     THEN TRIM(f.rdb$field_name) END,
                rf.rdb$description
            FROM rdb$relation_fields rf
            JOIN rdb$fields f ON f.rdb$field_name = rf.rdb$field_source
            JOIN rdb$relations r ON r.rdb$relation_name = rf.rdb$relation_name
            WHERE COALESCE(r.rdb$system_flag, 0) = 0
            ORDER BY rf.rdb$relation_name, rf.rdb$field_position
            "#
        );

        let rows = session.query(DefinitionKind::Column, &sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let decoded = decode_field_type(
                row.int(3)?,
                row.opt_int(4)?,
                row.opt_int(5)?,
                row.opt_int(6)?,
                row.opt_int(7)?,
            );
            out.push(ColumnRow {
                schema: String::new(),
                table: row.text(0)?,
                name: row.text(1)?,
                ordinal: row.int(2)? as i32 + 1,
                type_name: decoded.name,
                length: decoded.length,
                precision: decoded.precision,
                scale: decoded.scale,
                nullable: row.opt_int(8)?.unwrap_or(0) == 0,
                default: row.opt_text(9)?.map(|d| strip_default_keyword(&d)),
                identity: row.opt_int(10)?.is_some(),
                udt_schema: row.opt_text(11)?.map(|_| String::new()),
                udt_name: row.opt_text(11)?,
                comment: row.opt_text(12)?,
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
        // rdb$ref_constraints names the referenced key constraint directly.
        let sql = r#"
            SELECT
                TRIM(rc.rdb$relation_name),
                TRIM(rc.rdb$constraint_name),
                TRIM(seg.rdb$field_name),
                seg.rdb$field_position,
                TRIM(ref.rdb$const_name_uq)
            FROM rdb$relation_constraints rc
            JOIN rdb$ref_constraints ref
              ON ref.rdb$constraint_name = rc.rdb$constraint_name
            JOIN rdb$index_segments seg
              ON seg.rdb$index_name = rc.rdb$index_name
            WHERE rc.rdb$constraint_type = 'FOREIGN KEY'
            ORDER BY rc.rdb$relation_name, rc.rdb$constraint_name,
                     seg.rdb$field_position
        "#;

        let rows = session.query(DefinitionKind::ForeignKey, sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(ForeignKeyColumnRow {
                schema: String::new(),
                table: row.text(0)?,
                key: row.text(1)?,
                column: row.text(2)?,
                ordinal: row.int(3)? as i32 + 1,
                ref_key_schema: String::new(),
                ref_key: row.text(4)?,
            });
        }
        Ok(out)
    }

    async fn check_constraints(&self, session: &mut Session<'_>) -> Result<Vec<CheckRow>> {
        // Every check owns a pair of system triggers; type 1 (before insert)
        // carries the source once.
        let sql = r#"
            SELECT
                TRIM(rc.rdb$relation_name),
                TRIM(rc.rdb$constraint_name),
                t.rdb$trigger_source
            FROM rdb$relation_constraints rc
            JOIN rdb$check_constraints cc
              ON cc.rdb$constraint_name = rc.rdb$constraint_name
            JOIN rdb$triggers t ON t.rdb$trigger_name = cc.rdb$trigger_name
            WHERE rc.rdb$constraint_type = 'CHECK'
              AND t.rdb$trigger_type = 1
            ORDER BY rc.rdb$relation_name, rc.rdb$constraint_name
        "#;

        let rows = session
            .query(DefinitionKind::CheckConstraint, sql, &[])
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(CheckRow {
                schema: String::new(),
                table: row.text(0)?,
                name: row.text(1)?,
                clause: row.text(2)?,
            });
        }
        Ok(out)
    }

    async fn indexes(&self, session: &mut Session<'_>) -> Result<Vec<IndexColumnRow>> {
        // Constraint-backed indexes are covered by the key fetches;
        // expression indexes have no segments and fall out of the join.
        let sql = r#"
            SELECT
                TRIM(i.rdb$relation_name),
                TRIM(i.rdb$index_name),
                COALESCE(i.rdb$unique_flag, 0),
                TRIM(seg.rdb$field_name),
                seg.rdb$field_position,
                COALESCE(i.rdb$index_type, 0)
            FROM rdb$indices i
            JOIN rdb$index_segments seg
              ON seg.rdb$index_name = i.rdb$index_name
            LEFT JOIN rdb$relation_constraints rc
              ON rc.rdb$index_name = i.rdb$index_name
            WHERE COALESCE(i.rdb$system_flag, 0) = 0
              AND rc.rdb$index_name IS NULL
            ORDER BY i.rdb$relation_name, i.rdb$index_name,
                     seg.rdb$field_position
        "#;

        let rows = session.query(DefinitionKind::Index, sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(IndexColumnRow {
                schema: String::new(),
                table: row.text(0)?,
                index: row.text(1)?,
                unique: row.boolean(2)?,
                column: row.opt_text(3)?,
                ordinal: row.int(4)? as i32 + 1,
                descending: row.int(5)? == 1,
            });
        }
        Ok(out)
    }

    async fn sequences(&self, session: &mut Session<'_>) -> Result<Vec<SequenceRow>> {
        let fb3 = session
            .probe(Capability::GeneratorBounds, CANARY_GENERATOR_BOUNDS)
            .await;

        let sql = if fb3 {
            r#"
            SELECT
                TRIM(g.rdb$generator_name),
                g.rdb$initial_value,
                g.rdb$generator_increment
            FROM rdb$generators g
            WHERE COALESCE(g.rdb$system_flag, 0) = 0
            ORDER BY g.rdb$generator_name
            "#
        } else {
            r#"
            SELECT
                TRIM(g.rdb$generator_name),
                CAST(NULL AS BIGINT),
                CAST(NULL AS INTEGER)
            FROM rdb$generators g
            WHERE COALESCE(g.rdb$system_flag, 0) = 0
            ORDER BY g.rdb$generator_name
            "#
        };

        let rows = session.query(DefinitionKind::Sequence, sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(SequenceRow {
                schema: String::new(),
                name: row.text(0)?,
                type_name: "bigint".to_string(),
                precision: None,
                start: row.opt_big(1)?,
                increment: row.opt_big(2)?,
                min: None,
                max: None,
                cycle: false,
            });
        }
        Ok(out)
    }

    async fn domains(&self, session: &mut Session<'_>) -> Result<Vec<DomainRow>> {
        // User domains are the named entries of rdb$fields; generated
        // per-column fields carry RDB$/SEC$/MON$ prefixes.
        let sql = r#"
            SELECT
                TRIM(f.rdb$field_name),
                f.rdb$field_type,
                f.rdb$field_sub_type,
                f.rdb$field_precision,
                f.rdb$field_scale,
                f.rdb$character_length,
                f.rdb$null_flag,
                f.rdb$default_source,
                f.rdb$validation_source
            FROM rdb$fields f
            WHERE COALESCE(f.rdb$system_flag, 0) = 0
              AND f.rdb$field_name NOT LIKE 'RDB$%'
              AND f.rdb$field_name NOT LIKE 'SEC$%'
              AND f.rdb$field_name NOT LIKE 'MON$%'
            ORDER BY f.rdb$field_name
        "#;

        let rows = session.query(DefinitionKind::Domain, sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let decoded = decode_field_type(
                row.int(1)?,
                row.opt_int(2)?,
                row.opt_int(3)?,
                row.opt_int(4)?,
                row.opt_int(5)?,
            );
            out.push(DomainRow {
                schema: String::new(),
                name: row.text(0)?,
                type_name: decoded.name,
                length: decoded.length,
                precision: decoded.precision,
                scale: decoded.scale,
                nullable: row.opt_int(6)?.unwrap_or(0) == 0,
                default: row.opt_text(7)?.map(|d| strip_default_keyword(&d)),
                check_clause: row.opt_text(8)?,
            });
        }
        Ok(out)
    }

    async fn routines(&self, session: &mut Session<'_>) -> Result<Vec<RoutineRow>> {
        let sql = r#"
            SELECT TRIM(p.rdb$procedure_name)
            FROM rdb$procedures p
            WHERE COALESCE(p.rdb$system_flag, 0) = 0
            ORDER BY p.rdb$procedure_name
        "#;
        let rows = session.query(DefinitionKind::Routine, sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = row.text(0)?;
            out.push(RoutineRow {
                schema: String::new(),
                specific_name: name.clone(),
                name,
                kind: RoutineKind::Procedure,
                aggregate: false,
                return_type: None,
                return_precision: None,
                return_scale: None,
            });
        }

        let sql = r#"
            SELECT TRIM(f.rdb$function_name)
            FROM rdb$functions f
            WHERE COALESCE(f.rdb$system_flag, 0) = 0
            ORDER BY f.rdb$function_name
        "#;
        let rows = session.query(DefinitionKind::Routine, sql, &[]).await?;
        for row in &rows {
            let name = row.text(0)?;
            out.push(RoutineRow {
                schema: String::new(),
                specific_name: name.clone(),
                name,
                kind: RoutineKind::Function,
                aggregate: false,
                return_type: None,
                return_precision: None,
                return_scale: None,
            });
        }
        Ok(out)
    }
}

impl FirebirdCatalog {
    async fn key_columns(
        &self,
        session: &mut Session<'_>,
        kind: DefinitionKind,
        constraint_type: &str,
    ) -> Result<Vec<KeyColumnRow>> {
        let sql = format!(
            r#"
            SELECT
                TRIM(rc.rdb$relation_name),
                TRIM(rc.rdb$constraint_name),
                TRIM(seg.rdb$field_name),
                seg.rdb$field_position
            FROM rdb$relation_constraints rc
            JOIN rdb$index_segments seg
              ON seg.rdb$index_name = rc.rdb$index_name
            WHERE rc.rdb$constraint_type = '{constraint_type}'
            ORDER BY rc.rdb$relation_name, rc.rdb$constraint_name,
                     seg.rdb$field_position
            "#
        );

        let rows = session.query(kind, &sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(KeyColumnRow {
                schema: String::new(),
                table: row.text(0)?,
                key: row.text(1)?,
                column: row.text(2)?,
                ordinal: row.int(3)? as i32 + 1,
            });
        }
        Ok(out)
    }
}

struct DecodedType {
    name: String,
    length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
}

/// Decode RDB$FIELDS numeric type codes. Scales are stored negated; a
/// sub_type of 1 (numeric) or 2 (decimal) on an integer base marks an exact
/// numeric type.
fn decode_field_type(
    field_type: i64,
    sub_type: Option<i64>,
    precision: Option<i64>,
    scale: Option<i64>,
    char_length: Option<i64>,
) -> DecodedType {
    let scale = scale.map(|s| -s as i32).filter(|s| *s != 0);
    let sub_type = sub_type.unwrap_or(0);

    if matches!(field_type, 7 | 8 | 16) && (sub_type == 1 || sub_type == 2 || scale.is_some()) {
        let name = if sub_type == 2 { "decimal" } else { "numeric" };
        let default_precision = match field_type {
            7 => 4,
            8 => 9,
            _ => 18,
        };
        return DecodedType {
            name: name.to_string(),
            length: None,
            precision: Some(precision.map(|p| p as i32).unwrap_or(default_precision)),
            scale: Some(scale.unwrap_or(0)),
        };
    }

    let (name, length) = match field_type {
        7 => ("smallint", None),
        8 => ("integer", None),
        10 => ("float", None),
        12 => ("date", None),
        13 => ("time", None),
        14 => ("char", char_length),
        16 => ("bigint", None),
        23 => ("boolean", None),
        27 => ("double precision", None),
        35 => ("timestamp", None),
        37 => ("varchar", char_length),
        261 => {
            if sub_type == 1 {
                ("blob sub_type text", None)
            } else {
                ("blob", None)
            }
        }
        _ => ("unknown", None),
    };
    DecodedType {
        name: name.to_string(),
        length: length.map(|l| l as i32),
        precision: None,
        scale: None,
    }
}

/// Default sources read `DEFAULT <literal>`; only the literal is kept.
fn strip_default_keyword(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 8 && trimmed[..7].eq_ignore_ascii_case("default") {
        trimmed[7..].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer_types() {
        let t = decode_field_type(8, None, None, None, None);
        assert_eq!(t.name, "integer");
        let t = decode_field_type(16, Some(0), None, None, None);
        assert_eq!(t.name, "bigint");
    }

    #[test]
    fn test_decode_numeric() {
        let t = decode_field_type(16, Some(1), Some(10), Some(-2), None);
        assert_eq!(t.name, "numeric");
        assert_eq!(t.precision, Some(10));
        assert_eq!(t.scale, Some(2));

        let t = decode_field_type(8, Some(2), None, Some(-3), None);
        assert_eq!(t.name, "decimal");
        assert_eq!(t.precision, Some(9));
        assert_eq!(t.scale, Some(3));
    }

    #[test]
    fn test_decode_varchar() {
        let t = decode_field_type(37, Some(0), None, None, Some(50));
        assert_eq!(t.name, "varchar");
        assert_eq!(t.length, Some(50));
    }

    #[test]
    fn test_strip_default_keyword() {
        assert_eq!(strip_default_keyword("DEFAULT 0"), "0");
        assert_eq!(strip_default_keyword("default 'x'"), "'x'");
        assert_eq!(strip_default_keyword("0"), "0");
    }
}
