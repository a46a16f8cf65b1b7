//! Dependency edges between catalog objects.

use std::fmt::Debug;

use crate::errors::Result;
use crate::Oid;

/// How a dependency behaves when the referenced object is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// The dependent blocks dropping the referenced object unless the drop
    /// cascades explicitly.
    Normal,
    /// The dependent is dropped automatically along with the referenced
    /// object, no confirmation required.
    Auto,
}

/// A single recorded dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependent: Oid,
    pub referenced: Oid,
    pub kind: DependencyKind,
}

/// Append-only store of dependency edges.
///
/// Cascade execution belongs to the store's owner, not to this crate: when a
/// referenced object is dropped, the owner walks [`dependents_of`] and
/// routes each auto dependent to the matching remove operation. The same
/// machinery cleans up an object's own outgoing edges once it is gone.
///
/// [`dependents_of`]: DependencyGraph::dependents_of
pub trait DependencyGraph: Debug + Send + Sync {
    /// Record that `dependent` depends on `referenced`.
    fn record_dependency(&self, dependent: Oid, referenced: Oid, kind: DependencyKind)
        -> Result<()>;

    /// Every edge whose referenced object is `referenced`.
    fn dependents_of(&self, referenced: Oid) -> Result<Vec<DependencyEdge>>;
}
