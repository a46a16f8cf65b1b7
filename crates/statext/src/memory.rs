//! In-memory implementations of the collaborator interfaces.
//!
//! These back the test suite and double as the default wiring when embedding
//! the statistics catalog without a real storage layer. State is held behind
//! `parking_lot` locks; transactional semantics (rollback, queued
//! invalidation) are out of scope for the memory variants.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::dependency::{DependencyEdge, DependencyGraph, DependencyKind};
use crate::entry::StatisticsEntry;
use crate::errors::{Result, StatsError};
use crate::plan_cache::PlanCache;
use crate::relation::{AttributeDesc, LockMode, RelationCatalog, TableDesc};
use crate::store::StatisticsStore;
use crate::Oid;

/// First oid handed out to user-created objects. Everything below is
/// reserved for fixed objects.
pub const FIRST_USER_OID: Oid = 16384;

/// Relation catalog backed by hash maps, with a lock ledger so callers can
/// observe which lock modes were taken.
#[derive(Debug, Default)]
pub struct MemoryRelationCatalog {
    inner: RwLock<RelationState>,
}

#[derive(Debug, Default)]
struct RelationState {
    tables: HashMap<Oid, MemoryTable>,
    /// Locks taken, in acquisition order.
    locks: Vec<(Oid, LockMode)>,
}

#[derive(Debug)]
struct MemoryTable {
    desc: TableDesc,
    attributes: Vec<AttributeDesc>,
}

impl MemoryRelationCatalog {
    pub fn new() -> MemoryRelationCatalog {
        MemoryRelationCatalog::default()
    }

    /// Register a table and its attribute descriptors.
    pub fn add_table(&self, desc: TableDesc, attributes: Vec<AttributeDesc>) {
        let mut inner = self.inner.write();
        inner.tables.insert(desc.id, MemoryTable { desc, attributes });
    }

    /// Lock modes taken on `table_id`, in acquisition order.
    pub fn locks_taken(&self, table_id: Oid) -> Vec<LockMode> {
        self.inner
            .read()
            .locks
            .iter()
            .filter(|(id, _)| *id == table_id)
            .map(|(_, mode)| *mode)
            .collect()
    }
}

impl RelationCatalog for MemoryRelationCatalog {
    fn open_table(&self, table_id: Oid, mode: LockMode) -> Result<TableDesc> {
        let mut inner = self.inner.write();
        let table = inner
            .tables
            .get(&table_id)
            .ok_or(StatsError::MissingTable(table_id))?;
        let desc = table.desc.clone();
        inner.locks.push((table_id, mode));
        Ok(desc)
    }

    fn attribute_by_name(&self, table_id: Oid, name: &str) -> Result<Option<AttributeDesc>> {
        let inner = self.inner.read();
        let table = inner
            .tables
            .get(&table_id)
            .ok_or(StatsError::MissingTable(table_id))?;
        Ok(table
            .attributes
            .iter()
            .find(|att| att.name == name)
            .cloned())
    }

    fn attribute_names(&self, table_id: Oid) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let table = inner
            .tables
            .get(&table_id)
            .ok_or(StatsError::MissingTable(table_id))?;
        Ok(table
            .attributes
            .iter()
            .filter(|att| att.num > 0)
            .map(|att| att.name.clone())
            .collect())
    }
}

/// Statistics store backed by hash maps.
///
/// Enforces `(schema_id, name)` uniqueness on insert, standing in for the
/// unique index a real catalog store would use as the race backstop.
#[derive(Debug)]
pub struct MemoryStatisticsStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    oid_counter: Oid,
    entries: HashMap<Oid, StatisticsEntry>,
    /// Maps `(schema_id, name)` to object ids.
    names: HashMap<(Oid, String), Oid>,
}

impl MemoryStatisticsStore {
    pub fn new() -> MemoryStatisticsStore {
        MemoryStatisticsStore {
            inner: Mutex::new(StoreState {
                oid_counter: FIRST_USER_OID,
                entries: HashMap::new(),
                names: HashMap::new(),
            }),
        }
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStatisticsStore {
    fn default() -> Self {
        MemoryStatisticsStore::new()
    }
}

impl StatisticsStore for MemoryStatisticsStore {
    fn insert(&self, mut entry: StatisticsEntry) -> Result<Oid> {
        let mut inner = self.inner.lock();

        let key = (entry.schema_id, entry.name.clone());
        if inner.names.contains_key(&key) {
            return Err(StatsError::DuplicateObject(entry.name));
        }

        let oid = inner.oid_counter;
        inner.oid_counter += 1;
        entry.id = oid;

        inner.names.insert(key, oid);
        inner.entries.insert(oid, entry);

        Ok(oid)
    }

    fn delete(&self, id: Oid) -> Result<()> {
        let mut inner = self.inner.lock();
        let entry = inner
            .entries
            .remove(&id)
            .ok_or(StatsError::InternalInconsistency(id))?;
        inner.names.remove(&(entry.schema_id, entry.name));
        Ok(())
    }

    fn find_by_name(&self, schema_id: Oid, name: &str) -> Result<Option<StatisticsEntry>> {
        let inner = self.inner.lock();
        let oid = inner.names.get(&(schema_id, name.to_string()));
        Ok(oid.and_then(|oid| inner.entries.get(oid)).cloned())
    }

    fn find_by_id(&self, id: Oid) -> Result<Option<StatisticsEntry>> {
        Ok(self.inner.lock().entries.get(&id).cloned())
    }
}

/// Append-only edge list.
#[derive(Debug, Default)]
pub struct MemoryDependencyGraph {
    edges: Mutex<Vec<DependencyEdge>>,
}

impl MemoryDependencyGraph {
    pub fn new() -> MemoryDependencyGraph {
        MemoryDependencyGraph::default()
    }

    /// Every recorded edge.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.edges.lock().clone()
    }
}

impl DependencyGraph for MemoryDependencyGraph {
    fn record_dependency(
        &self,
        dependent: Oid,
        referenced: Oid,
        kind: DependencyKind,
    ) -> Result<()> {
        self.edges.lock().push(DependencyEdge {
            dependent,
            referenced,
            kind,
        });
        Ok(())
    }

    fn dependents_of(&self, referenced: Oid) -> Result<Vec<DependencyEdge>> {
        Ok(self
            .edges
            .lock()
            .iter()
            .filter(|edge| edge.referenced == referenced)
            .cloned()
            .collect())
    }
}

/// Records invalidation broadcasts instead of delivering them.
#[derive(Debug, Default)]
pub struct MemoryPlanCache {
    invalidated: Mutex<Vec<Oid>>,
}

impl MemoryPlanCache {
    pub fn new() -> MemoryPlanCache {
        MemoryPlanCache::default()
    }

    /// Table oids invalidated so far, in broadcast order.
    pub fn invalidated(&self) -> Vec<Oid> {
        self.invalidated.lock().clone()
    }
}

impl PlanCache for MemoryPlanCache {
    fn invalidate_table(&self, table_id: Oid) {
        self.invalidated.lock().push(table_id);
    }
}
