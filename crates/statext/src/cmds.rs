//! Create and drop operations for extended-statistics objects.
//!
//! Orchestrates validation, canonicalization, persistence, dependency
//! registration, and plan-cache invalidation. Every operation runs inside
//! the caller's ambient transaction: a failure at any step aborts the whole
//! statement, and the injected collaborators guarantee nothing partial
//! survives a rollback.

use std::sync::Arc;

use tracing::{debug, info};

use crate::columns::{resolve_columns, ColumnList};
use crate::dependency::{DependencyGraph, DependencyKind};
use crate::entry::StatisticsEntry;
use crate::errors::{Result, StatsError};
use crate::kinds::{kinds_from_options, StatsOption};
use crate::plan_cache::PlanCache;
use crate::relation::{LockMode, RelationCatalog};
use crate::store::StatisticsStore;
use crate::{Oid, INVALID_OID};

/// Request to create a statistics object.
///
/// Name resolution has already happened upstream: the schema, owner, and
/// target table arrive as oids. Column names arrive as written, in any
/// order; duplicates are rejected during normalization.
#[derive(Debug, Clone)]
pub struct CreateStatisticsInfo {
    /// Object name, unqualified.
    pub name: String,
    /// Schema to create the object in.
    pub schema_id: Oid,
    /// Role creating the object.
    pub owner_id: Oid,
    /// Table the statistics are defined over.
    pub table_id: Oid,
    /// Column names from the `ON` clause.
    pub columns: Vec<String>,
    /// Options from the `WITH` clause.
    pub options: Vec<StatsOption>,
    /// Skip instead of erroring when the name is already taken.
    pub if_not_exists: bool,
}

/// Outcome of a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStatisticsResult {
    /// A new object was created.
    Created(Oid),
    /// An object with the same name already exists and `IF NOT EXISTS` was
    /// given. Nothing was touched. Informational, not an error; the DDL
    /// layer surfaces it as a notice.
    SkippedExisting,
}

/// DDL entry points for extended-statistics objects.
#[derive(Debug, Clone)]
pub struct StatsCommands {
    store: Arc<dyn StatisticsStore>,
    relations: Arc<dyn RelationCatalog>,
    dependencies: Arc<dyn DependencyGraph>,
    plan_cache: Arc<dyn PlanCache>,
}

impl StatsCommands {
    pub fn new(
        store: Arc<dyn StatisticsStore>,
        relations: Arc<dyn RelationCatalog>,
        dependencies: Arc<dyn DependencyGraph>,
        plan_cache: Arc<dyn PlanCache>,
    ) -> StatsCommands {
        StatsCommands {
            store,
            relations,
            dependencies,
            plan_cache,
        }
    }

    /// Create a new statistics object, returning its id.
    pub fn create_statistics(&self, info: CreateStatisticsInfo) -> Result<CreateStatisticsResult> {
        debug!(name = %info.name, table_id = info.table_id, "creating statistics object");

        // The name may already be taken in the target schema. The store's
        // own uniqueness constraint catches concurrent creates that slip
        // past this check.
        if self.store.find_by_name(info.schema_id, &info.name)?.is_some() {
            if info.if_not_exists {
                info!(name = %info.name, "statistics object already exists, skipping");
                return Ok(CreateStatisticsResult::SkippedExisting);
            }
            return Err(StatsError::DuplicateObject(info.name));
        }

        // New statistics influence future plans only, never in-flight ones.
        // ShareUpdateExclusive conflicts with statistics maintenance and
        // other DDL on the table without blocking ordinary reads or writes,
        // and holds the table's shape stable while columns resolve.
        let table = self
            .relations
            .open_table(info.table_id, LockMode::ShareUpdateExclusive)?;

        if !table.kind.supports_statistics() {
            return Err(StatsError::WrongObjectType {
                name: table.name,
                kind: table.kind,
            });
        }

        let attnums = resolve_columns(self.relations.as_ref(), &table, &info.columns)?;
        let columns = ColumnList::from_resolved(attnums)?;

        let kinds = kinds_from_options(&info.options)?;
        if kinds.is_empty() {
            // Only reachable when every supplied option was explicitly
            // false; an empty request has nothing to store.
            return Err(StatsError::EmptyKinds);
        }

        // No statistics built yet; the computation machinery fills the
        // payloads in later.
        let entry = StatisticsEntry {
            id: INVALID_OID,
            name: info.name,
            schema_id: info.schema_id,
            owner_id: info.owner_id,
            table_id: info.table_id,
            columns,
            kinds,
            ndistinct: None,
            dependencies: None,
        };

        let oid = self.store.insert(entry)?;

        // Dropping the table drops the statistics object.
        self.dependencies
            .record_dependency(oid, info.table_id, DependencyKind::Auto)?;

        // Same for the schema. The table dependency does not cover this:
        // the object may live in a different schema than its table.
        self.dependencies
            .record_dependency(oid, info.schema_id, DependencyKind::Auto)?;

        // Plans cached for the table must observe the new object.
        self.plan_cache.invalidate_table(info.table_id);

        Ok(CreateStatisticsResult::Created(oid))
    }

    /// Remove a statistics object by id.
    ///
    /// Ids only ever come from successful creates (directly, or through the
    /// dependency store's cascade when the owning table or schema is
    /// dropped), so a missing row is an internal inconsistency rather than
    /// a user error. The object's own outgoing dependency edges are cleaned
    /// up by the dependency store, not here.
    pub fn remove_statistics_by_id(&self, id: Oid) -> Result<()> {
        debug!(id, "removing statistics object");

        let entry = self
            .store
            .find_by_id(id)?
            .ok_or(StatsError::InternalInconsistency(id))?;

        // Plans built against the old set of statistics objects must be
        // rebuilt.
        self.plan_cache.invalidate_table(entry.table_id);

        self.store.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{AttrNum, MAX_DIMENSIONS};
    use crate::kinds::StatsKind;
    use crate::memory::{
        MemoryDependencyGraph,
        MemoryPlanCache,
        MemoryRelationCatalog,
        MemoryStatisticsStore,
    };
    use crate::relation::{AttributeDesc, RelationKind, TableDesc};

    const SCHEMA_PUBLIC: Oid = 2200;
    const SCHEMA_OTHER: Oid = 2201;
    const OWNER: Oid = 10;
    const TABLE_T: Oid = 16400;
    const TABLE_WIDE: Oid = 16401;
    const VIEW_V: Oid = 16402;

    struct Harness {
        cmds: StatsCommands,
        store: Arc<MemoryStatisticsStore>,
        relations: Arc<MemoryRelationCatalog>,
        dependencies: Arc<MemoryDependencyGraph>,
        plan_cache: Arc<MemoryPlanCache>,
    }

    fn attr(num: AttrNum, name: &str, has_ordering_operator: bool) -> AttributeDesc {
        AttributeDesc {
            num,
            name: name.to_string(),
            has_ordering_operator,
        }
    }

    fn test_env() -> Harness {
        logutil::init_test();

        let relations = Arc::new(MemoryRelationCatalog::new());

        // t(a int, b int, c text) plus a system column and a column whose
        // type has no ordering operator.
        relations.add_table(
            TableDesc {
                id: TABLE_T,
                schema_id: SCHEMA_PUBLIC,
                name: "t".to_string(),
                kind: RelationKind::Table,
            },
            vec![
                attr(-1, "ctid", true),
                attr(1, "a", true),
                attr(2, "b", true),
                attr(3, "c", true),
                attr(4, "p", false),
            ],
        );

        relations.add_table(
            TableDesc {
                id: TABLE_WIDE,
                schema_id: SCHEMA_PUBLIC,
                name: "wide".to_string(),
                kind: RelationKind::Table,
            },
            (1..=10)
                .map(|i| attr(i as AttrNum, &format!("col{i}"), true))
                .collect(),
        );

        relations.add_table(
            TableDesc {
                id: VIEW_V,
                schema_id: SCHEMA_PUBLIC,
                name: "v".to_string(),
                kind: RelationKind::View,
            },
            vec![attr(1, "a", true), attr(2, "b", true)],
        );

        let store = Arc::new(MemoryStatisticsStore::new());
        let dependencies = Arc::new(MemoryDependencyGraph::new());
        let plan_cache = Arc::new(MemoryPlanCache::new());

        let cmds = StatsCommands::new(
            store.clone(),
            relations.clone(),
            dependencies.clone(),
            plan_cache.clone(),
        );

        Harness {
            cmds,
            store,
            relations,
            dependencies,
            plan_cache,
        }
    }

    fn create_info(name: &str, columns: &[&str]) -> CreateStatisticsInfo {
        CreateStatisticsInfo {
            name: name.to_string(),
            schema_id: SCHEMA_PUBLIC,
            owner_id: OWNER,
            table_id: TABLE_T,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            options: Vec::new(),
            if_not_exists: false,
        }
    }

    fn created_oid(result: CreateStatisticsResult) -> Oid {
        match result {
            CreateStatisticsResult::Created(oid) => oid,
            other => panic!("expected a created object, got {other:?}"),
        }
    }

    #[test]
    fn create_stores_sorted_columns_and_default_kinds() {
        let env = test_env();

        let result = env.cmds.create_statistics(create_info("s1", &["b", "a"])).unwrap();
        let oid = created_oid(result);

        let entry = env.store.find_by_id(oid).unwrap().unwrap();
        assert_eq!(entry.name, "s1");
        assert_eq!(entry.schema_id, SCHEMA_PUBLIC);
        assert_eq!(entry.owner_id, OWNER);
        assert_eq!(entry.table_id, TABLE_T);
        assert_eq!(entry.columns.as_slice(), &[1, 2]);
        assert!(entry.kinds.contains(StatsKind::NDistinct));
        assert!(entry.kinds.contains(StatsKind::Dependencies));
        assert!(entry.ndistinct.is_none());
        assert!(entry.dependencies.is_none());

        assert!(env.store.find_by_name(SCHEMA_PUBLIC, "s1").unwrap().is_some());
    }

    #[test]
    fn create_is_input_order_independent() {
        let env = test_env();

        let first = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());

        let mut info = create_info("s2", &["b", "a"]);
        info.options = vec![StatsOption::new("dependencies", true)];
        let second = created_oid(env.cmds.create_statistics(info).unwrap());

        let first = env.store.find_by_id(first).unwrap().unwrap();
        let second = env.store.find_by_id(second).unwrap().unwrap();
        assert_eq!(first.columns, second.columns);

        assert!(second.kinds.contains(StatsKind::Dependencies));
        assert!(!second.kinds.contains(StatsKind::NDistinct));
    }

    #[test]
    fn create_takes_share_update_exclusive() {
        let env = test_env();

        env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap();
        assert_eq!(
            env.relations.locks_taken(TABLE_T),
            vec![LockMode::ShareUpdateExclusive]
        );
    }

    #[test]
    fn create_registers_auto_dependencies_and_invalidates() {
        let env = test_env();

        let oid = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());

        let edges = env.dependencies.edges();
        assert_eq!(edges.len(), 2);
        assert!(edges
            .iter()
            .any(|e| e.dependent == oid && e.referenced == TABLE_T && e.kind == DependencyKind::Auto));
        assert!(edges.iter().any(
            |e| e.dependent == oid && e.referenced == SCHEMA_PUBLIC && e.kind == DependencyKind::Auto
        ));

        assert_eq!(env.plan_cache.invalidated(), vec![TABLE_T]);
    }

    #[test]
    fn duplicate_name_errors() {
        let env = test_env();

        env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap();
        let err = env
            .cmds
            .create_statistics(create_info("s1", &["a", "c"]))
            .unwrap_err();
        assert!(matches!(err, StatsError::DuplicateObject(name) if name == "s1"));
    }

    #[test]
    fn duplicate_name_if_not_exists_skips_without_touching_anything() {
        let env = test_env();

        env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap();
        let edges_before = env.dependencies.edges().len();
        let invalidated_before = env.plan_cache.invalidated().len();

        let mut info = create_info("s1", &["a", "c"]);
        info.if_not_exists = true;
        let result = env.cmds.create_statistics(info).unwrap();

        assert_eq!(result, CreateStatisticsResult::SkippedExisting);
        assert_eq!(env.store.len(), 1);
        assert_eq!(env.dependencies.edges().len(), edges_before);
        assert_eq!(env.plan_cache.invalidated().len(), invalidated_before);
        // The skip happens before the table is even opened.
        assert_eq!(env.relations.locks_taken(TABLE_T).len(), 1);
    }

    #[test]
    fn same_name_in_other_schema_is_allowed() {
        let env = test_env();

        env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap();

        let mut info = create_info("s1", &["a", "b"]);
        info.schema_id = SCHEMA_OTHER;
        env.cmds.create_statistics(info).unwrap();
        assert_eq!(env.store.len(), 2);
    }

    #[test]
    fn too_few_columns() {
        let env = test_env();

        let err = env.cmds.create_statistics(create_info("s1", &["a"])).unwrap_err();
        assert!(matches!(err, StatsError::InvalidObjectDefinition));

        let err = env.cmds.create_statistics(create_info("s1", &[])).unwrap_err();
        assert!(matches!(err, StatsError::InvalidObjectDefinition));
    }

    #[test]
    fn too_many_columns() {
        let env = test_env();

        let names: Vec<String> = (1..=MAX_DIMENSIONS + 1).map(|i| format!("col{i}")).collect();
        let mut info = create_info("s1", &[]);
        info.table_id = TABLE_WIDE;
        info.columns = names;

        let err = env.cmds.create_statistics(info).unwrap_err();
        assert!(matches!(err, StatsError::TooManyColumns(MAX_DIMENSIONS)));
    }

    #[test]
    fn max_columns_exactly_is_allowed() {
        let env = test_env();

        let names: Vec<String> = (1..=MAX_DIMENSIONS).map(|i| format!("col{i}")).collect();
        let mut info = create_info("s1", &[]);
        info.table_id = TABLE_WIDE;
        info.columns = names;

        let oid = created_oid(env.cmds.create_statistics(info).unwrap());
        let entry = env.store.find_by_id(oid).unwrap().unwrap();
        assert_eq!(entry.columns.len(), MAX_DIMENSIONS);
    }

    #[test]
    fn duplicate_column_regardless_of_order() {
        let env = test_env();

        let err = env
            .cmds
            .create_statistics(create_info("s1", &["a", "a"]))
            .unwrap_err();
        assert!(matches!(err, StatsError::DuplicateColumn));

        let err = env
            .cmds
            .create_statistics(create_info("s1", &["b", "a", "b"]))
            .unwrap_err();
        assert!(matches!(err, StatsError::DuplicateColumn));
    }

    #[test]
    fn undefined_column_with_similarity_hint() {
        let env = test_env();

        let err = env
            .cmds
            .create_statistics(create_info("s1", &["a", "bb"]))
            .unwrap_err();
        match err {
            StatsError::UndefinedColumn { name, hint } => {
                assert_eq!(name, "bb");
                assert_eq!(hint.as_deref(), Some("b"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = env
            .cmds
            .create_statistics(create_info("s1", &["a", "zzz"]))
            .unwrap_err();
        match err {
            StatsError::UndefinedColumn { name, hint } => {
                assert_eq!(name, "zzz");
                assert_eq!(hint, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn system_column_rejected() {
        let env = test_env();

        let err = env
            .cmds
            .create_statistics(create_info("s1", &["a", "ctid"]))
            .unwrap_err();
        assert!(matches!(err, StatsError::SystemColumnNotSupported(name) if name == "ctid"));
    }

    #[test]
    fn column_without_ordering_operator_rejected() {
        let env = test_env();

        let err = env
            .cmds
            .create_statistics(create_info("s1", &["a", "p"]))
            .unwrap_err();
        assert!(matches!(err, StatsError::NoOrderingOperator(name) if name == "p"));
    }

    #[test]
    fn wrong_object_type() {
        let env = test_env();

        let mut info = create_info("s1", &["a", "b"]);
        info.table_id = VIEW_V;
        let err = env.cmds.create_statistics(info).unwrap_err();
        assert!(
            matches!(err, StatsError::WrongObjectType { ref name, kind } if name == "v" && kind == RelationKind::View)
        );
    }

    #[test]
    fn unknown_option_rejected() {
        let env = test_env();

        let mut info = create_info("s1", &["a", "b"]);
        info.options = vec![StatsOption::new("mcv", true)];
        let err = env.cmds.create_statistics(info).unwrap_err();
        assert!(matches!(err, StatsError::UnrecognizedOption(name) if name == "mcv"));
        assert!(env.store.is_empty());
    }

    #[test]
    fn ndistinct_false_alone_is_rejected() {
        let env = test_env();

        // An explicit option suppresses the all-kinds default even when it
        // nets the request down to nothing; the empty set is rejected
        // rather than silently re-defaulted.
        let mut info = create_info("s1", &["a", "b"]);
        info.options = vec![StatsOption::new("ndistinct", false)];
        let err = env.cmds.create_statistics(info).unwrap_err();
        assert!(matches!(err, StatsError::EmptyKinds));

        assert!(env.store.is_empty());
        assert!(env.dependencies.edges().is_empty());
        assert!(env.plan_cache.invalidated().is_empty());
    }

    #[test]
    fn failed_validation_leaves_no_state_behind() {
        let env = test_env();

        env.cmds
            .create_statistics(create_info("s1", &["a", "nope"]))
            .unwrap_err();

        assert!(env.store.is_empty());
        assert!(env.dependencies.edges().is_empty());
        assert!(env.plan_cache.invalidated().is_empty());
    }

    #[test]
    fn remove_deletes_row_and_invalidates() {
        let env = test_env();

        let oid = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());
        env.cmds.remove_statistics_by_id(oid).unwrap();

        assert!(env.store.find_by_id(oid).unwrap().is_none());
        assert!(env.store.find_by_name(SCHEMA_PUBLIC, "s1").unwrap().is_none());
        // Once on create, once on remove.
        assert_eq!(env.plan_cache.invalidated(), vec![TABLE_T, TABLE_T]);
    }

    #[test]
    fn remove_unknown_id_is_an_inconsistency() {
        let env = test_env();

        let err = env.cmds.remove_statistics_by_id(123456).unwrap_err();
        assert!(matches!(err, StatsError::InternalInconsistency(123456)));
    }

    #[test]
    fn dropping_the_table_cascades_through_dependency_edges() {
        let env = test_env();

        let oid = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());

        // What the external drop machinery does when t goes away: walk the
        // auto dependents and remove each one first.
        for edge in env.dependencies.dependents_of(TABLE_T).unwrap() {
            assert_eq!(edge.kind, DependencyKind::Auto);
            env.cmds.remove_statistics_by_id(edge.dependent).unwrap();
        }

        assert!(env.store.find_by_id(oid).unwrap().is_none());
        assert!(env.store.is_empty());
    }

    #[test]
    fn dropping_the_schema_cascades_even_if_the_table_survives() {
        let env = test_env();

        let oid = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());

        for edge in env.dependencies.dependents_of(SCHEMA_PUBLIC).unwrap() {
            assert_eq!(edge.kind, DependencyKind::Auto);
            env.cmds.remove_statistics_by_id(edge.dependent).unwrap();
        }

        assert!(env.store.find_by_id(oid).unwrap().is_none());
        // The table itself is untouched.
        assert!(env
            .relations
            .attribute_by_name(TABLE_T, "a")
            .unwrap()
            .is_some());
    }

    #[test]
    fn recreate_after_drop_gets_a_fresh_oid() {
        let env = test_env();

        let first = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());
        env.cmds.remove_statistics_by_id(first).unwrap();

        let second = created_oid(env.cmds.create_statistics(create_info("s1", &["a", "b"])).unwrap());
        assert_ne!(first, second);

        let entry = env.store.find_by_name(SCHEMA_PUBLIC, "s1").unwrap().unwrap();
        assert_eq!(entry.id, second);
    }
}
