//! Error types for the constraint engine.

use thiserror::Error;

/// Everything that can go wrong while building expressions or solving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The required constraints cannot all be satisfied. Recoverable: the
    /// tableau is left exactly as it was before the failed operation.
    #[error("required constraints cannot all be satisfied")]
    RequiredFailure,

    /// Removal was requested for a constraint the solver does not hold.
    #[error("constraint is not currently in the solver")]
    ConstraintNotFound,

    /// A solver invariant was violated. Indicates a bug in the solver, not
    /// a problem with the input.
    #[error("internal solver error: {0}")]
    InternalError(&'static str),

    /// An operation would have produced a non-linear expression, e.g.
    /// dividing by an expression that is not a nonzero constant.
    #[error("operation would produce a non-linear expression")]
    NonlinearExpression,

    /// `suggest_value` was called for a variable that was never registered
    /// with `add_edit_var`.
    #[error("variable is not registered for editing")]
    UnknownEditVariable,

    /// `add_edit_var` was called twice for the same variable without an
    /// intervening removal.
    #[error("variable is already registered for editing")]
    DuplicateEditVariable,

    /// Edit constraints must be weaker than required.
    #[error("edit variables may not use the required strength")]
    BadEditStrength,
}
