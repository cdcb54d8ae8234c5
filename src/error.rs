//! Fatal failure classes surfaced by the direct runner.
//!
//! All of these abort the run; there is no retry anywhere in this core.
//! Counter overflow is deliberately absent: it is recovered internally and
//! never surfaced.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    /// Input reaching a transform in a shape it cannot consume, e.g. a
    /// non-pair element fed to grouping.
    #[error("type check failed: {0}")]
    TypeCheck(String),

    /// A well-typed value violating an evaluation rule's contract, e.g. a
    /// multi-element collection viewed as a singleton.
    #[error("{0}")]
    Value(String),

    /// A declared kind with no evaluation rule in this runner. Signals a gap
    /// between the graph-construction layer and the dispatch table.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Key serialization failure inside grouping.
    #[error("coder error: {0}")]
    Coder(#[from] serde_json::Error),
}
