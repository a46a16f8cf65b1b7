//! Storage interface for the statistics catalog.

use std::fmt::Debug;

use crate::entry::StatisticsEntry;
use crate::errors::Result;
use crate::Oid;

/// Transactional storage for statistics-object rows.
///
/// Implementations provide the usual catalog guarantees: inserts and deletes
/// are atomic within the caller's ambient transaction, and a uniqueness
/// constraint on `(schema_id, name)` is the final arbiter for concurrent
/// creates racing past the caller's own existence check.
pub trait StatisticsStore: Debug + Send + Sync {
    /// Insert a new row, assigning and returning a fresh object id.
    ///
    /// The `id` on the passed entry is ignored.
    fn insert(&self, entry: StatisticsEntry) -> Result<Oid>;

    /// Delete the row with the given id.
    ///
    /// The row must exist; callers look it up first.
    fn delete(&self, id: Oid) -> Result<()>;

    /// Find a row by name within a schema.
    fn find_by_name(&self, schema_id: Oid, name: &str) -> Result<Option<StatisticsEntry>>;

    /// Find a row by object id.
    fn find_by_id(&self, id: Oid) -> Result<Option<StatisticsEntry>>;
}
