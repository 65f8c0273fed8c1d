//! Core types for the Quadrille constraint engine.
//!
//! This crate provides the model shared by the solver and its callers:
//! - Exact rational arithmetic (re-exported from `num-rational`)
//! - Identity-keyed variable handles
//! - Sparse linear expressions
//! - Constraints with lexicographic strengths
//! - Error types

pub mod constraint;
pub mod errors;
pub mod expression;
pub mod rational;
pub mod strength;
pub mod variable;

pub use constraint::*;
pub use errors::*;
pub use expression::*;
pub use rational::*;
pub use strength::*;
pub use variable::*;
