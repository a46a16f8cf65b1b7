//! Interface to the external relation and attribute catalogs.

use std::fmt::Debug;

use crate::columns::AttrNum;
use crate::errors::Result;
use crate::Oid;

/// Lock strength taken on a table.
///
/// Creating a statistics definition influences future plans only, never
/// in-flight ones, so it takes `ShareUpdateExclusive`: conflicting with
/// statistics maintenance and other schema-affecting DDL while letting
/// ordinary reads and writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    AccessShare,
    ShareUpdateExclusive,
    AccessExclusive,
}

/// What kind of relation an oid refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    View,
    MaterializedView,
    ForeignTable,
    PartitionedTable,
}

impl RelationKind {
    /// Whether extended statistics may be defined on this kind of relation.
    pub const fn supports_statistics(&self) -> bool {
        matches!(
            self,
            RelationKind::Table
                | RelationKind::MaterializedView
                | RelationKind::ForeignTable
                | RelationKind::PartitionedTable
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Table => "table",
            RelationKind::View => "view",
            RelationKind::MaterializedView => "materialized view",
            RelationKind::ForeignTable => "foreign table",
            RelationKind::PartitionedTable => "partitioned table",
        }
    }
}

/// Descriptor for an opened (locked) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDesc {
    pub id: Oid,
    /// Schema containing the table.
    pub schema_id: Oid,
    pub name: String,
    pub kind: RelationKind,
}

/// Descriptor for a single attribute of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDesc {
    pub num: AttrNum,
    pub name: String,
    /// Whether the attribute's type has a registered less-than comparison.
    pub has_ordering_operator: bool,
}

/// Read access to the relation and attribute catalogs.
///
/// Implementations resolve against the ambient transaction's snapshot; this
/// crate never caches descriptors across operations.
pub trait RelationCatalog: Debug + Send + Sync {
    /// Open a table by oid, taking `mode` on it for the remainder of the
    /// ambient transaction.
    fn open_table(&self, table_id: Oid, mode: LockMode) -> Result<TableDesc>;

    /// Look up an attribute of `table_id` by column name.
    ///
    /// Returns `Ok(None)` if the table has no such column.
    fn attribute_by_name(&self, table_id: Oid, name: &str) -> Result<Option<AttributeDesc>>;

    /// Names of the table's user columns.
    fn attribute_names(&self, table_id: Oid) -> Result<Vec<String>>;
}
