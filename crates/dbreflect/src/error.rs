//! Error types for the introspection library.

use thiserror::Error;

use crate::core::defs::DefinitionKind;
use crate::dialect::Dialect;

/// Main error type for introspection operations.
///
/// Only two conditions are fatal to a pass: a rejected catalog query and
/// structurally inconsistent key metadata. Everything else (missing optional
/// catalogs, references into filtered-out schemas, failed capability probes)
/// is absorbed by the builder and logged.
#[derive(Error, Debug)]
pub enum ReflectError {
    /// Configuration error (invalid YAML, bad regex, unknown dialect, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The connection rejected a catalog query. Fatal to the whole pass;
    /// no partial graph is returned.
    #[error("Catalog query for {kind} failed on {dialect}: {message}")]
    Catalog {
        dialect: Dialect,
        kind: DefinitionKind,
        message: String,
    },

    /// The catalog reported metadata downstream consumers cannot safely use
    /// (e.g. a foreign key whose column counts mismatch).
    #[error("Inconsistent catalog metadata: {0}")]
    Structural(String),

    /// IO error (config file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error (config file operations)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ReflectError {
    /// Create a Catalog error with dialect and query-kind context.
    pub fn catalog(
        dialect: Dialect,
        kind: DefinitionKind,
        message: impl Into<String>,
    ) -> Self {
        ReflectError::Catalog {
            dialect,
            kind,
            message: message.into(),
        }
    }

    /// Create a Structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        ReflectError::Structural(message.into())
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, ReflectError>;

/// Boxed error type produced by [`Connection`](crate::core::Connection)
/// implementations. Driver crates live outside this library, so their error
/// types cross the seam type-erased.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
