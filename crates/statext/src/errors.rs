use crate::relation::RelationKind;
use crate::Oid;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("statistics object \"{0}\" already exists")]
    DuplicateObject(String),

    #[error(
        "column \"{name}\" referenced in statistics does not exist{}",
        fmt_hint(.hint)
    )]
    UndefinedColumn { name: String, hint: Option<String> },

    #[error("statistics creation on system column \"{0}\" is not supported")]
    SystemColumnNotSupported(String),

    #[error(
        "column \"{0}\" cannot be used in statistics because its type has no ordering operator"
    )]
    NoOrderingOperator(String),

    #[error("cannot have more than {0} columns in statistics")]
    TooManyColumns(usize),

    #[error("extended statistics require at least 2 columns")]
    InvalidObjectDefinition,

    #[error("duplicate column name in statistics definition")]
    DuplicateColumn,

    #[error("unrecognized statistics option \"{0}\"")]
    UnrecognizedOption(String),

    #[error(
        "relation \"{name}\" is not a table, materialized view, foreign table, or partitioned table"
    )]
    WrongObjectType { name: String, kind: RelationKind },

    #[error("statistics object must request at least one statistics kind")]
    EmptyKinds,

    #[error("table with oid {0} does not exist")]
    MissingTable(Oid),

    #[error("lookup failed for statistics object {0}")]
    InternalInconsistency(Oid),
}

pub type Result<T, E = StatsError> = std::result::Result<T, E>;

fn fmt_hint(hint: &Option<String>) -> String {
    match hint {
        Some(similar) => format!(", did you mean \"{similar}\"?"),
        None => String::new(),
    }
}
