use thiserror::Error;

use feedloop_storage::StorageError;

/// Failure modes of a single rule run.
///
/// `RuleNotFound` is surfaced distinctly so callers can decide not to
/// retry; storage failures propagate un-recovered — the scheduler is the
/// only layer that catches them.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("rule not found: {0}")]
    RuleNotFound(i64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
