//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root configuration for one introspection pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectConfig {
    /// Dialect identifier (e.g. "postgres", "derby").
    pub dialect: String,

    /// Ordered schema names to restrict introspection to. Empty means all
    /// user schemas; the order is preserved in the resulting graph.
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Include/exclude regex filters per definition kind.
    #[serde(default)]
    pub filters: FilterConfig,
}

impl IntrospectConfig {
    /// Create a config with default filters.
    pub fn new(dialect: impl Into<String>, schemas: Vec<String>) -> Self {
        Self {
            dialect: dialect.into(),
            schemas,
            filters: FilterConfig::default(),
        }
    }

    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Per-kind object name filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub tables: FilterRule,
    #[serde(default)]
    pub sequences: FilterRule,
    #[serde(default)]
    pub enums: FilterRule,
    #[serde(default)]
    pub domains: FilterRule,
    #[serde(default)]
    pub udts: FilterRule,
    #[serde(default)]
    pub routines: FilterRule,
}

/// One include/exclude regex pair. Patterns match the whole object name;
/// a missing include means "everything", a missing exclude means "nothing".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_minimal() {
        let config = IntrospectConfig::from_yaml("dialect: postgres\n").unwrap();
        assert_eq!(config.dialect, "postgres");
        assert!(config.schemas.is_empty());
        assert!(config.filters.tables.include.is_none());
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = r#"
dialect: h2
schemas:
  - PUBLIC
  - AUDIT
filters:
  tables:
    include: "APP_.*"
    exclude: "APP_TMP_.*"
  routines:
    exclude: "INTERNAL_.*"
"#;
        let config = IntrospectConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.schemas, vec!["PUBLIC", "AUDIT"]);
        assert_eq!(config.filters.tables.include.as_deref(), Some("APP_.*"));
        assert_eq!(
            config.filters.routines.exclude.as_deref(),
            Some("INTERNAL_.*")
        );
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(IntrospectConfig::from_yaml("dialect: [nested]").is_err());
    }
}
