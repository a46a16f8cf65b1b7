//! Statistics kinds and interpretation of the `WITH (...)` option list.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Result, StatsError};

/// A category of joint statistic that can be requested for a statistics
/// object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatsKind {
    /// Number-of-distinct-values counts over column combinations.
    NDistinct,
    /// Functional dependencies between columns.
    Dependencies,
}

impl StatsKind {
    /// Every known kind, in canonical order.
    pub const ALL: [StatsKind; 2] = [StatsKind::NDistinct, StatsKind::Dependencies];

    /// Stable single-character code used in the persisted record.
    pub const fn code(&self) -> char {
        match self {
            StatsKind::NDistinct => 'd',
            StatsKind::Dependencies => 'f',
        }
    }

    pub const fn from_code(code: char) -> Option<StatsKind> {
        match code {
            'd' => Some(StatsKind::NDistinct),
            'f' => Some(StatsKind::Dependencies),
            _ => None,
        }
    }

    /// Option name recognized for this kind in the DDL surface.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatsKind::NDistinct => "ndistinct",
            StatsKind::Dependencies => "dependencies",
        }
    }

    const fn bit(&self) -> u8 {
        match self {
            StatsKind::NDistinct => 1,
            StatsKind::Dependencies => 1 << 1,
        }
    }
}

impl fmt::Display for StatsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Set of statistics kinds requested for one object.
///
/// Persisted as a string of the kinds' character codes in canonical order
/// (e.g. `"df"` for both kinds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsKindSet(u8);

impl StatsKindSet {
    pub const EMPTY: StatsKindSet = StatsKindSet(0);

    /// The set containing every known kind.
    pub fn all() -> StatsKindSet {
        StatsKind::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, kind: StatsKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(&self, kind: StatsKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Kinds in the set, canonical order.
    pub fn iter(&self) -> impl Iterator<Item = StatsKind> + '_ {
        StatsKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }

    fn codes(&self) -> String {
        self.iter().map(|kind| kind.code()).collect()
    }
}

impl FromIterator<StatsKind> for StatsKindSet {
    fn from_iter<T: IntoIterator<Item = StatsKind>>(iter: T) -> Self {
        let mut set = StatsKindSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for StatsKindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codes())
    }
}

impl Serialize for StatsKindSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.codes())
    }
}

impl<'de> Deserialize<'de> for StatsKindSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let codes = String::deserialize(deserializer)?;
        let mut set = StatsKindSet::EMPTY;
        for code in codes.chars() {
            let kind = StatsKind::from_code(code)
                .ok_or_else(|| D::Error::custom(format!("unknown statistics kind code '{code}'")))?;
            set.insert(kind);
        }
        Ok(set)
    }
}

/// A single `<name> = <bool>` option from the DDL `WITH` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsOption {
    pub name: String,
    pub value: bool,
}

impl StatsOption {
    pub fn new(name: impl Into<String>, value: bool) -> StatsOption {
        StatsOption {
            name: name.into(),
            value,
        }
    }
}

/// Interpret the user-supplied options into the set of requested kinds.
///
/// Each recognized option toggles its kind and marks the request explicit;
/// an option set to `false` still counts as explicit. With no options at all
/// every known kind is requested. An explicit request may therefore net to
/// the empty set, which the create path rejects before persisting anything.
pub fn kinds_from_options(options: &[StatsOption]) -> Result<StatsKindSet> {
    let mut build_ndistinct = false;
    let mut build_dependencies = false;
    let mut requested = false;

    for opt in options {
        match opt.name.as_str() {
            "ndistinct" => {
                build_ndistinct = opt.value;
                requested = true;
            }
            "dependencies" => {
                build_dependencies = opt.value;
                requested = true;
            }
            other => return Err(StatsError::UnrecognizedOption(other.to_string())),
        }
    }

    if !requested {
        return Ok(StatsKindSet::all());
    }

    let mut kinds = StatsKindSet::EMPTY;
    if build_ndistinct {
        kinds.insert(StatsKind::NDistinct);
    }
    if build_dependencies {
        kinds.insert(StatsKind::Dependencies);
    }

    Ok(kinds)
}
