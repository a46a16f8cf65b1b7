//! Column resolution and canonicalization for statistics definitions.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StatsError};
use crate::relation::{RelationCatalog, TableDesc};

/// Attribute (column) number within a table.
///
/// Positive for user columns; system columns carry negative numbers and are
/// never allowed in a statistics definition.
pub type AttrNum = i16;

/// Upper bound on the number of columns a single statistics object may
/// reference.
pub const MAX_DIMENSIONS: usize = 8;

/// Canonical column list of a statistics object.
///
/// Sorted ascending with no duplicates, length within `[2, MAX_DIMENSIONS]`.
/// The sort order is a storage canonicalization only; it makes duplicate
/// detection an adjacent scan and the persisted row deterministic, and has
/// no effect on which statistics get computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i16>", into = "Vec<i16>")]
pub struct ColumnList(Vec<AttrNum>);

impl ColumnList {
    /// Canonicalize a resolved attribute list.
    pub fn from_resolved(mut attnums: Vec<AttrNum>) -> Result<ColumnList> {
        if attnums.len() < 2 {
            return Err(StatsError::InvalidObjectDefinition);
        }
        if attnums.len() > MAX_DIMENSIONS {
            return Err(StatsError::TooManyColumns(MAX_DIMENSIONS));
        }

        attnums.sort_unstable();

        for pair in attnums.windows(2) {
            if pair[0] == pair[1] {
                return Err(StatsError::DuplicateColumn);
            }
        }

        Ok(ColumnList(attnums))
    }

    pub fn as_slice(&self) -> &[AttrNum] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AttrNum> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<AttrNum>> for ColumnList {
    type Error = StatsError;

    fn try_from(attnums: Vec<AttrNum>) -> Result<Self> {
        ColumnList::from_resolved(attnums)
    }
}

impl From<ColumnList> for Vec<AttrNum> {
    fn from(columns: ColumnList) -> Self {
        columns.0
    }
}

/// Resolve column names against the attribute catalog.
///
/// Input order is preserved and duplicates are kept; canonicalization
/// happens separately in [`ColumnList::from_resolved`]. The
/// `MAX_DIMENSIONS` bound is enforced here, before each append, so an
/// oversized definition fails as soon as it provably exceeds the bound.
pub fn resolve_columns(
    relations: &dyn RelationCatalog,
    table: &TableDesc,
    names: &[String],
) -> Result<Vec<AttrNum>> {
    let mut attnums = Vec::with_capacity(names.len().min(MAX_DIMENSIONS));

    for name in names {
        let att = match relations.attribute_by_name(table.id, name)? {
            Some(att) => att,
            None => {
                return Err(StatsError::UndefinedColumn {
                    name: name.clone(),
                    hint: similar_column(relations, table, name)?,
                })
            }
        };

        if att.num < 0 {
            return Err(StatsError::SystemColumnNotSupported(name.clone()));
        }

        // Normalization sorts the columns, and the statistics kinds
        // themselves rely on ordering semantics of the values.
        if !att.has_ordering_operator {
            return Err(StatsError::NoOrderingOperator(name.clone()));
        }

        if attnums.len() >= MAX_DIMENSIONS {
            return Err(StatsError::TooManyColumns(MAX_DIMENSIONS));
        }

        attnums.push(att.num);
    }

    Ok(attnums)
}

/// Best-scoring existing column name to suggest for an undefined column.
fn similar_column(
    relations: &dyn RelationCatalog,
    table: &TableDesc,
    name: &str,
) -> Result<Option<String>> {
    const SIMILARITY_THRESHOLD: f64 = 0.7;

    let mut best: Option<(f64, String)> = None;
    for existing in relations.attribute_names(table.id)? {
        let score = strsim::jaro(&existing, name);
        if score > SIMILARITY_THRESHOLD && best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
            best = Some((score, existing));
        }
    }

    Ok(best.map(|(_, existing)| existing))
}
