//! Configuration validation.

use std::collections::HashSet;

use crate::dialect::Dialect;
use crate::error::{ReflectError, Result};

use super::IntrospectConfig;

/// Validate the configuration. Regex compilation is handled separately by
/// [`CompiledFilters`](super::CompiledFilters).
pub fn validate(config: &IntrospectConfig) -> Result<()> {
    if config.dialect.is_empty() {
        return Err(ReflectError::Config("dialect is required".into()));
    }
    Dialect::from_name(&config.dialect)?;

    let mut seen = HashSet::new();
    for schema in &config.schemas {
        if schema.is_empty() {
            return Err(ReflectError::Config(
                "schemas must not contain empty names".into(),
            ));
        }
        if !seen.insert(schema.as_str()) {
            return Err(ReflectError::Config(format!(
                "schema '{}' is listed more than once",
                schema
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntrospectConfig;

    fn valid_config() -> IntrospectConfig {
        IntrospectConfig::new("postgres", vec!["public".to_string()])
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_dialect() {
        let mut config = valid_config();
        config.dialect = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_dialect() {
        let mut config = valid_config();
        config.dialect = "oracle".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_schema_name() {
        let mut config = valid_config();
        config.schemas.push("".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_schema() {
        let mut config = valid_config();
        config.schemas.push("public".to_string());
        assert!(validate(&config).is_err());
    }
}
