//! The connection seam.
//!
//! All catalog access is mediated by an externally supplied [`Connection`].
//! The library never opens sockets, pools connections, or manages
//! transactions; it only issues read-only catalog SQL through this trait and
//! consumes the tabular results. Statement and result-set lifecycle is the
//! implementor's responsibility behind this seam.

use async_trait::async_trait;

use crate::error::BoxError;

use super::row::CatalogRow;

/// A live database connection capable of executing SQL text and returning
/// tabular results.
///
/// Parameters are positional and always textual: catalog queries filter by
/// schema and object names only. Placeholder syntax is dialect-specific and
/// is rendered by the catalog query set, not by implementors.
///
/// One introspection pass issues strictly sequential queries; implementations
/// do not need to support pipelining. A caller wanting to abort a pass closes
/// the underlying connection, which surfaces as an error on the in-flight
/// call and fails the pass.
#[async_trait]
pub trait Connection: Send {
    /// Execute `sql` with the given positional parameters and return all
    /// result rows.
    async fn query(
        &mut self,
        sql: &str,
        params: &[&str],
    ) -> std::result::Result<Vec<CatalogRow>, BoxError>;
}
