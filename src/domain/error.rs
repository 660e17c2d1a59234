//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Violations found while building tree revisions from a description.
///
/// Mount propagation itself cannot fail; these only arise while
/// constructing the trees it runs on.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("fixture declares no revisions")]
    NoRevisions,

    #[error("node id declared twice in revision {revision}: {id}")]
    DuplicateNode { revision: usize, id: String },

    #[error("revision {revision} reuses unknown node: {id}")]
    UnknownReuse { revision: usize, id: String },

    #[error("first revision cannot reuse node: {0}")]
    ReuseInFirstRevision(String),

    #[error("reused node must not declare content: {0}")]
    ReuseWithContent(String),

    #[error("family {family} declared as {expected}, found {found}")]
    ComponentMismatch {
        family: String,
        expected: String,
        found: String,
    },
}
