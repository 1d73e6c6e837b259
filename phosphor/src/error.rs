use thiserror::Error;

/// Failures surfaced by cell operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The cell was touched from a thread other than the one that created it.
    ///
    /// Cells are bound to the context of their creating thread; every operation
    /// re-checks that binding.
    #[error("cell accessed from a thread that does not own it")]
    InvalidThread,

    /// `set` or `clear` was called while a cell evaluation was in progress on
    /// this thread.
    #[error("set/clear is forbidden while a cell evaluation is in progress")]
    ForbiddenDuringEvaluation,

    /// A cell expression failed.
    ///
    /// Expressions return `Result<T, Error>`; the `From` impl lets them
    /// propagate arbitrary errors with `?` through `anyhow`.
    #[error(transparent)]
    Eval(#[from] anyhow::Error),
}
