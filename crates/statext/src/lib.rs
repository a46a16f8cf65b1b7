//! Catalog lifecycle for extended (multi-column) statistics objects.
//!
//! An extended statistics object is a named catalog record telling the
//! statistics build machinery which joint statistics (multi-column
//! distinctness, functional dependencies) to compute later for a set of
//! columns on a table. This crate validates a proposed definition,
//! canonicalizes it, persists it, wires up the dependency edges that get it
//! dropped along with its table or schema, and retires it on explicit
//! removal.
//!
//! Storage, the attribute catalog, the dependency store, and the plan cache
//! are injected collaborators (see [`store`], [`relation`], [`dependency`],
//! and [`plan_cache`]); [`memory`] provides in-memory implementations of
//! each.

pub mod cmds;
pub mod columns;
pub mod dependency;
pub mod entry;
pub mod errors;
pub mod kinds;
pub mod memory;
pub mod plan_cache;
pub mod relation;
pub mod store;

/// Identifier for an object in the catalog.
pub type Oid = u32;

/// Oid value that never identifies an object.
pub const INVALID_OID: Oid = 0;
