//! Tabular catalog results with typed column access.
//!
//! Catalog queries return [`CatalogRow`]s, a driver-neutral row shape. The
//! value set is intentionally small: catalogs only ever hand back names,
//! flags, ordinals, bounds, and rendered SQL text.

use thiserror::Error;

use crate::error::ReflectError;

/// A single value in a catalog result row.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    /// SQL NULL.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer (ordinals, flags, lengths).
    Int(i64),
    /// Wide integer (sequence bounds can exceed i64 on NUMERIC-backed
    /// sequences).
    BigInt(i128),
    /// Floating point. Rare in catalogs; kept for completeness.
    Float(f64),
    /// Text (names, type strings, rendered defaults, source SQL).
    Text(String),
}

impl CatalogValue {
    fn type_name(&self) -> &'static str {
        match self {
            CatalogValue::Null => "null",
            CatalogValue::Bool(_) => "bool",
            CatalogValue::Int(_) => "int",
            CatalogValue::BigInt(_) => "bigint",
            CatalogValue::Float(_) => "float",
            CatalogValue::Text(_) => "text",
        }
    }
}

impl From<&str> for CatalogValue {
    fn from(v: &str) -> Self {
        CatalogValue::Text(v.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(v: String) -> Self {
        CatalogValue::Text(v)
    }
}

impl From<i64> for CatalogValue {
    fn from(v: i64) -> Self {
        CatalogValue::Int(v)
    }
}

impl From<i32> for CatalogValue {
    fn from(v: i32) -> Self {
        CatalogValue::Int(v as i64)
    }
}

impl From<bool> for CatalogValue {
    fn from(v: bool) -> Self {
        CatalogValue::Bool(v)
    }
}

impl<T> From<Option<T>> for CatalogValue
where
    T: Into<CatalogValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => CatalogValue::Null,
        }
    }
}

/// Access error for a catalog row.
///
/// A shape mismatch means the dialect's catalog query and its row mapping
/// disagree, which downstream code cannot recover from.
#[derive(Error, Debug)]
pub enum RowAccessError {
    #[error("column index {0} out of bounds (row has {1} columns)")]
    OutOfBounds(usize, usize),
    #[error("column {index} is {found}, expected {expected}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("column {0} is NULL, expected {1}")]
    UnexpectedNull(usize, &'static str),
}

impl From<RowAccessError> for ReflectError {
    fn from(e: RowAccessError) -> Self {
        ReflectError::Structural(format!("catalog row access: {e}"))
    }
}

/// One row of a catalog query result.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    values: Vec<CatalogValue>,
}

impl CatalogRow {
    pub fn new(values: Vec<CatalogValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn value(&self, index: usize) -> Result<&CatalogValue, RowAccessError> {
        self.values
            .get(index)
            .ok_or(RowAccessError::OutOfBounds(index, self.values.len()))
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> RowAccessError {
        match self.values.get(index) {
            Some(CatalogValue::Null) => RowAccessError::UnexpectedNull(index, expected),
            Some(v) => RowAccessError::TypeMismatch {
                index,
                expected,
                found: v.type_name(),
            },
            None => RowAccessError::OutOfBounds(index, self.values.len()),
        }
    }

    /// Non-null text column.
    pub fn text(&self, index: usize) -> Result<String, RowAccessError> {
        match self.value(index)? {
            CatalogValue::Text(s) => Ok(s.clone()),
            _ => Err(self.mismatch(index, "text")),
        }
    }

    /// Nullable text column. Empty strings are preserved, not nulled.
    pub fn opt_text(&self, index: usize) -> Result<Option<String>, RowAccessError> {
        match self.value(index)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Text(s) => Ok(Some(s.clone())),
            _ => Err(self.mismatch(index, "text")),
        }
    }

    /// Non-null integer column.
    pub fn int(&self, index: usize) -> Result<i64, RowAccessError> {
        match self.value(index)? {
            CatalogValue::Int(v) => Ok(*v),
            _ => Err(self.mismatch(index, "int")),
        }
    }

    /// Nullable integer column.
    pub fn opt_int(&self, index: usize) -> Result<Option<i64>, RowAccessError> {
        match self.value(index)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Int(v) => Ok(Some(*v)),
            _ => Err(self.mismatch(index, "int")),
        }
    }

    /// Nullable wide integer column; plain integers widen transparently.
    pub fn opt_big(&self, index: usize) -> Result<Option<i128>, RowAccessError> {
        match self.value(index)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Int(v) => Ok(Some(*v as i128)),
            CatalogValue::BigInt(v) => Ok(Some(*v)),
            _ => Err(self.mismatch(index, "bigint")),
        }
    }

    /// Boolean column.
    ///
    /// Catalogs disagree on how to spell a flag: native booleans
    /// (pg_catalog), 0/1 smallints (RDB$ tables), or 'YES'/'NO' text
    /// (information_schema). All three are accepted here so dialect queries
    /// don't need CASE expressions just to normalize flags.
    pub fn boolean(&self, index: usize) -> Result<bool, RowAccessError> {
        match self.value(index)? {
            CatalogValue::Null => Ok(false),
            CatalogValue::Bool(v) => Ok(*v),
            CatalogValue::Int(v) => Ok(*v != 0),
            CatalogValue::Text(s) => Ok(matches!(
                s.to_ascii_uppercase().as_str(),
                "YES" | "Y" | "TRUE" | "T" | "1"
            )),
            _ => Err(self.mismatch(index, "bool")),
        }
    }
}

impl From<Vec<CatalogValue>> for CatalogRow {
    fn from(values: Vec<CatalogValue>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: Vec<CatalogValue>) -> CatalogRow {
        CatalogRow::new(values)
    }

    #[test]
    fn test_text_access() {
        let r = row(vec!["users".into(), CatalogValue::Null]);
        assert_eq!(r.text(0).unwrap(), "users");
        assert_eq!(r.opt_text(1).unwrap(), None);
        assert!(r.text(1).is_err());
        assert!(r.text(2).is_err());
    }

    #[test]
    fn test_boolean_spellings() {
        let r = row(vec![
            CatalogValue::Bool(true),
            CatalogValue::Int(1),
            CatalogValue::Int(0),
            "YES".into(),
            "NO".into(),
            CatalogValue::Null,
        ]);
        assert!(r.boolean(0).unwrap());
        assert!(r.boolean(1).unwrap());
        assert!(!r.boolean(2).unwrap());
        assert!(r.boolean(3).unwrap());
        assert!(!r.boolean(4).unwrap());
        assert!(!r.boolean(5).unwrap());
    }

    #[test]
    fn test_big_widens_int() {
        let r = row(vec![CatalogValue::Int(42), CatalogValue::BigInt(1 << 100)]);
        assert_eq!(r.opt_big(0).unwrap(), Some(42));
        assert_eq!(r.opt_big(1).unwrap(), Some(1 << 100));
    }
}
