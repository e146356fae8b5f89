//! Runtime capability detection.
//!
//! Catalog shapes vary with server version: `pg_sequence` only exists from
//! Postgres 10, `pg_proc.prokind` from 11, H2 2.x replaced the 1.x
//! information schema wholesale, Firebird 3 added generator bounds. Rather
//! than parsing version strings, the query sets probe for the feature itself
//! with a minimal canary query and branch on the verdict.
//!
//! The prober is a session-scoped struct passed into the builder; verdicts
//! are memoized per pass, never shared across sessions, and never retried.
//! A failed canary records `false` — absence of an optional feature is
//! expected on older servers, not an error.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::core::connection::Connection;

/// Identifies one optional catalog feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Window functions (`COUNT(*) OVER ()`).
    WindowFunctions,
    /// Row-value (tuple) predicates.
    TuplePredicates,
    /// A dedicated sequence catalog with bounds (`pg_sequence`).
    SequenceCatalog,
    /// Routine-kind discriminator column (`pg_proc.prokind`).
    RoutineKindColumn,
    /// Materialized-view catalog.
    MaterializedViews,
    /// `unnest(..) WITH ORDINALITY` for array-backed catalogs.
    UnnestOrdinality,
    /// Per-column index catalog (H2 2.x `information_schema.index_columns`).
    IndexColumnCatalog,
    /// Generator start/increment columns (Firebird 3).
    GeneratorBounds,
}

impl Capability {
    /// Stable identifier for diagnostics.
    pub fn id(self) -> &'static str {
        match self {
            Capability::WindowFunctions => "window-functions",
            Capability::TuplePredicates => "tuple-predicates",
            Capability::SequenceCatalog => "sequence-catalog",
            Capability::RoutineKindColumn => "routine-kind-column",
            Capability::MaterializedViews => "materialized-views",
            Capability::UnnestOrdinality => "unnest-ordinality",
            Capability::IndexColumnCatalog => "index-column-catalog",
            Capability::GeneratorBounds => "generator-bounds",
        }
    }
}

/// Session-scoped feature-detection cache.
#[derive(Debug, Default)]
pub struct CapabilityProber {
    verdicts: HashMap<Capability, bool>,
}

impl CapabilityProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe one capability, executing `canary` at most once per session.
    ///
    /// The canary's result set is discarded; only success or failure
    /// matters. Failure downgrades the verdict to `false` permanently for
    /// this session and is never surfaced to the caller.
    pub async fn probe(
        &mut self,
        conn: &mut (dyn Connection + Send),
        capability: Capability,
        canary: &str,
    ) -> bool {
        if let Some(verdict) = self.verdicts.get(&capability) {
            trace!("capability {} cached: {}", capability.id(), verdict);
            return *verdict;
        }

        let verdict = match conn.query(canary, &[]).await {
            Ok(_) => true,
            Err(e) => {
                debug!(
                    "capability {} probe failed ({}), recording as unavailable",
                    capability.id(),
                    e
                );
                false
            }
        };

        self.verdicts.insert(capability, verdict);
        debug!("capability {} detected: {}", capability.id(), verdict);
        verdict
    }

    /// Cached verdict, if this capability has been probed.
    pub fn verdict(&self, capability: Capability) -> Option<bool> {
        self.verdicts.get(&capability).copied()
    }
}
