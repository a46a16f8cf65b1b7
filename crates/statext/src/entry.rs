//! The persisted form of a statistics object.

use serde::{Deserialize, Serialize};

use crate::columns::ColumnList;
use crate::kinds::StatsKindSet;
use crate::Oid;

/// A single extended-statistics object, one row in the statistics catalog.
///
/// The computed payloads stay `None` until the statistics build machinery
/// fills them in out-of-band; this crate never writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsEntry {
    /// Object identifier, assigned by the statistics store on insert.
    pub id: Oid,
    /// Object name, unique within `schema_id` while the object exists.
    pub name: String,
    /// Schema owning the object.
    pub schema_id: Oid,
    /// Role that created the object.
    pub owner_id: Oid,
    /// Table the statistics are defined over.
    pub table_id: Oid,
    /// Canonical (sorted, deduplicated) attribute numbers.
    pub columns: ColumnList,
    /// Requested statistics kinds. Never empty.
    pub kinds: StatsKindSet,
    /// Computed joint-distinctness payload, opaque to this crate.
    pub ndistinct: Option<Vec<u8>>,
    /// Computed functional-dependencies payload, opaque to this crate.
    pub dependencies: Option<Vec<u8>>,
}
