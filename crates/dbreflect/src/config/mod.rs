//! Configuration loading, validation, and filter compilation.

pub mod types;
pub mod validation;

pub use types::{FilterConfig, FilterRule, IntrospectConfig};

use regex::Regex;

use crate::core::defs::DefinitionKind;
use crate::error::{ReflectError, Result};

/// Compiled per-kind filters. Patterns are anchored: they must match the
/// whole object name, not a substring.
#[derive(Debug)]
pub struct CompiledFilters {
    tables: CompiledRule,
    sequences: CompiledRule,
    enums: CompiledRule,
    domains: CompiledRule,
    udts: CompiledRule,
    routines: CompiledRule,
}

#[derive(Debug, Default)]
struct CompiledRule {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl CompiledRule {
    fn compile(kind: &str, rule: &FilterRule) -> Result<Self> {
        Ok(Self {
            include: compile_anchored(kind, "include", rule.include.as_deref())?,
            exclude: compile_anchored(kind, "exclude", rule.exclude.as_deref())?,
        })
    }

    fn matches(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(name) {
                return false;
            }
        }
        true
    }
}

fn compile_anchored(kind: &str, side: &str, pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(p) => Regex::new(&format!("^(?:{p})$"))
            .map(Some)
            .map_err(|e| {
                ReflectError::Config(format!("invalid {kind} {side} pattern '{p}': {e}"))
            }),
    }
}

impl CompiledFilters {
    /// Compile all filter rules, failing on the first invalid pattern.
    pub fn compile(config: &FilterConfig) -> Result<Self> {
        Ok(Self {
            tables: CompiledRule::compile("tables", &config.tables)?,
            sequences: CompiledRule::compile("sequences", &config.sequences)?,
            enums: CompiledRule::compile("enums", &config.enums)?,
            domains: CompiledRule::compile("domains", &config.domains)?,
            udts: CompiledRule::compile("udts", &config.udts)?,
            routines: CompiledRule::compile("routines", &config.routines)?,
        })
    }

    /// Whether an object of the given kind passes its filter. Kinds without
    /// a configured filter (columns, keys, indexes) always pass; they follow
    /// their owning object.
    pub fn includes(&self, kind: DefinitionKind, name: &str) -> bool {
        let rule = match kind {
            DefinitionKind::Table => &self.tables,
            DefinitionKind::Sequence => &self.sequences,
            DefinitionKind::Enum => &self.enums,
            DefinitionKind::Domain => &self.domains,
            DefinitionKind::Udt => &self.udts,
            DefinitionKind::Routine => &self.routines,
            _ => return true,
        };
        rule.matches(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_include_everything() {
        let filters = CompiledFilters::compile(&FilterConfig::default()).unwrap();
        assert!(filters.includes(DefinitionKind::Table, "anything"));
        assert!(filters.includes(DefinitionKind::Column, "anything"));
    }

    #[test]
    fn test_include_exclude() {
        let mut config = FilterConfig::default();
        config.tables.include = Some("app_.*".to_string());
        config.tables.exclude = Some("app_tmp_.*".to_string());
        let filters = CompiledFilters::compile(&config).unwrap();

        assert!(filters.includes(DefinitionKind::Table, "app_users"));
        assert!(!filters.includes(DefinitionKind::Table, "app_tmp_users"));
        assert!(!filters.includes(DefinitionKind::Table, "other"));
        // Other kinds are untouched by the tables rule.
        assert!(filters.includes(DefinitionKind::Sequence, "other"));
    }

    #[test]
    fn test_patterns_are_anchored() {
        let mut config = FilterConfig::default();
        config.tables.include = Some("users".to_string());
        let filters = CompiledFilters::compile(&config).unwrap();

        assert!(filters.includes(DefinitionKind::Table, "users"));
        assert!(!filters.includes(DefinitionKind::Table, "app_users_audit"));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut config = FilterConfig::default();
        config.tables.include = Some("(".to_string());
        assert!(matches!(
            CompiledFilters::compile(&config),
            Err(ReflectError::Config(_))
        ));
    }
}
