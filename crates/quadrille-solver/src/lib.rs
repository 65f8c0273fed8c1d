//! Incremental linear-constraint solving for the Quadrille engine.
//!
//! This is an implementation of the Cassowary linear arithmetic constraint
//! solving algorithm, as described in "The Cassowary Linear Arithmetic
//! Constraint Solving Algorithm" by Greg J. Badros and Alan Borning, over
//! exact rational arithmetic.
//!
//! The solver maintains an optimal solution to a live set of linear
//! equalities and inequalities ranked by strength. Constraints can be
//! added and removed incrementally, variables can be edited interactively
//! through the suggest/resolve protocol, and [`IntegerSolver`] layers a
//! best-first branch-and-bound search on top for integer-restricted
//! variables.

pub mod branching;
pub mod solver;
pub mod tableau;

pub use branching::IntegerSolver;
pub use solver::{ConstraintId, SimplexSolver};
pub use tableau::Tableau;

pub use quadrille_core::{
    Constraint, ConstraintOp, ConstraintRole, LinearExpression, Rational, Relation, SolverError,
    Strength, SymbolicWeight, Variable,
};
