//! Per-session resolution cache.
//!
//! The same lookup is requested by several resolvers during one pass — a
//! table is resolved while attaching its own columns and again while binding
//! a foreign key that references it. The cache memoizes both hits and
//! misses (a "not found" sentinel) over the partially built graph, so
//! repeated lookups cost a map probe instead of a scan. Scope ends with the
//! session; the schema is assumed immutable for the duration of one pass,
//! so there is no invalidation.

use std::collections::HashMap;

use crate::core::graph::{DefinitionGraph, SchemaId, TableId};

/// Locator for a primary/unique key: owning table plus position in that
/// table's key list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHandle {
    pub table: TableId,
    pub index: usize,
}

/// Memoized (kind, qualified name) → id lookups for one pass.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    schemas: HashMap<String, Option<SchemaId>>,
    tables: HashMap<(String, String), Option<TableId>>,
    /// Key names are schema-scoped in SQL, so (schema, key name) is enough
    /// to identify the referenced key without knowing its table.
    keys: HashMap<(String, String), Option<KeyHandle>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a schema by name.
    pub fn schema(&mut self, graph: &DefinitionGraph, name: &str) -> Option<SchemaId> {
        if let Some(hit) = self.schemas.get(name) {
            return *hit;
        }
        let found = graph.schema_by_name(name);
        self.schemas.insert(name.to_string(), found);
        found
    }

    /// Resolve a table by qualified name.
    pub fn table(&mut self, graph: &DefinitionGraph, schema: &str, name: &str) -> Option<TableId> {
        if let Some(hit) = self.tables.get(&(schema.to_string(), name.to_string())) {
            return *hit;
        }
        let found = graph
            .schema_by_name(schema)
            .and_then(|sid| {
                graph
                    .tables()
                    .iter()
                    .position(|t| t.schema == sid && t.name == name)
            })
            .map(TableId);
        self.tables
            .insert((schema.to_string(), name.to_string()), found);
        found
    }

    /// Record a freshly built key so later foreign-key binding finds it
    /// without scanning.
    pub fn register_key(&mut self, schema: &str, key: &str, handle: KeyHandle) {
        self.keys
            .insert((schema.to_string(), key.to_string()), Some(handle));
    }

    /// Resolve a primary/unique key by (schema, key name). Misses are
    /// memoized: a foreign key referencing a filtered-out schema asks for
    /// the same absent key once per referencing column otherwise.
    pub fn key(&mut self, schema: &str, key: &str) -> Option<KeyHandle> {
        match self.keys.get(&(schema.to_string(), key.to_string())) {
            Some(hit) => *hit,
            None => {
                self.keys
                    .insert((schema.to_string(), key.to_string()), None);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::DefinitionGraph;
    use crate::dialect::Dialect;

    #[test]
    fn test_schema_miss_is_memoized() {
        let graph = DefinitionGraph::new(Dialect::Postgres);
        let mut cache = ResolutionCache::new();
        assert_eq!(cache.schema(&graph, "missing"), None);
        // Second lookup hits the sentinel, not the graph.
        assert_eq!(cache.schema(&graph, "missing"), None);
        assert_eq!(cache.schemas.len(), 1);
    }

    #[test]
    fn test_key_registration() {
        let mut cache = ResolutionCache::new();
        let handle = KeyHandle {
            table: TableId(0),
            index: 0,
        };
        cache.register_key("public", "author_pkey", handle);
        assert_eq!(cache.key("public", "author_pkey"), Some(handle));
        assert_eq!(cache.key("public", "other_key"), None);
    }
}
