//! Cached-plan invalidation.

use std::fmt::Debug;

use crate::Oid;

/// Marks cached query plans as stale.
///
/// Invalidation is broadcast by table identity rather than per statistics
/// object; any change to a table's statistics objects can affect planning
/// for that table. Implementations queue messages until the ambient
/// transaction commits; within the transaction the catalog itself is the
/// source of truth.
pub trait PlanCache: Debug + Send + Sync {
    /// Mark every cached plan referencing `table_id` as stale.
    fn invalidate_table(&self, table_id: Oid);
}
