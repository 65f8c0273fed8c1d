//! Sparse linear expressions.
//!
//! An expression is `constant + Σ coeffᵢ·varᵢ` with the invariant that no
//! stored coefficient is zero. Term arithmetic drops entries the moment
//! they cancel, and the mutating operations report which variables were
//! gained or lost so the tableau can keep its column index consistent.

use indexmap::IndexMap;
use num_traits::{One, Zero};
use smallvec::SmallVec;

use crate::errors::SolverError;
use crate::rational::Rational;
use crate::variable::Variable;

/// How a single term changed under a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermChange {
    /// The variable entered the expression.
    Inserted,
    /// The variable's coefficient changed but stayed nonzero.
    Modified,
    /// The variable's coefficient cancelled to zero and was dropped.
    Removed,
    /// The expression was not touched (zero increment on an absent term).
    Untouched,
}

/// Variables gained and lost by a compound mutation.
#[derive(Debug, Clone, Default)]
pub struct TermDelta {
    pub added: SmallVec<[Variable; 4]>,
    pub removed: SmallVec<[Variable; 4]>,
}

impl TermDelta {
    fn note(&mut self, var: Variable, change: TermChange) {
        match change {
            TermChange::Inserted => self.added.push(var),
            TermChange::Removed => self.removed.push(var),
            TermChange::Modified | TermChange::Untouched => {}
        }
    }
}

/// A sparse linear expression over [`Variable`] handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpression {
    constant: Rational,
    terms: IndexMap<Variable, Rational>,
}

impl LinearExpression {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn from_constant(constant: Rational) -> Self {
        Self {
            constant,
            terms: IndexMap::new(),
        }
    }

    /// The expression `1·v`.
    pub fn from_variable(var: Variable) -> Self {
        Self::term(var, Rational::one())
    }

    /// The expression `coeff·v` (or zero if `coeff` is zero).
    pub fn term(var: Variable, coeff: Rational) -> Self {
        let mut terms = IndexMap::new();
        if !coeff.is_zero() {
            terms.insert(var, coeff);
        }
        Self {
            constant: Rational::zero(),
            terms,
        }
    }

    pub fn constant(&self) -> &Rational {
        &self.constant
    }

    pub fn set_constant(&mut self, constant: Rational) {
        self.constant = constant;
    }

    /// Add `delta` to the constant term.
    pub fn increment_constant(&mut self, delta: &Rational) {
        self.constant += delta;
    }

    /// Iterate over the terms in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = (&Variable, &Rational)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, var: Variable) -> bool {
        self.terms.contains_key(&var)
    }

    /// The coefficient of `var`, if present.
    pub fn coefficient(&self, var: Variable) -> Option<&Rational> {
        self.terms.get(&var)
    }

    /// Merge `coeff·var` into the expression, dropping the term if it
    /// cancels to zero.
    pub fn add_variable(&mut self, var: Variable, coeff: &Rational) -> TermChange {
        if coeff.is_zero() {
            return TermChange::Untouched;
        }
        match self.terms.get_mut(&var) {
            Some(existing) => {
                *existing += coeff;
                if existing.is_zero() {
                    self.terms.swap_remove(&var);
                    TermChange::Removed
                } else {
                    TermChange::Modified
                }
            }
            None => {
                self.terms.insert(var, coeff.clone());
                TermChange::Inserted
            }
        }
    }

    /// Overwrite the coefficient of `var`, removing the term on zero.
    pub fn set_variable(&mut self, var: Variable, coeff: Rational) {
        if coeff.is_zero() {
            self.terms.swap_remove(&var);
        } else {
            self.terms.insert(var, coeff);
        }
    }

    /// Remove the term for `var`, returning its coefficient.
    pub fn remove_variable(&mut self, var: Variable) -> Option<Rational> {
        self.terms.swap_remove(&var)
    }

    /// Add `multiplier · other` to this expression, reporting the
    /// variables gained and lost.
    pub fn add_expression(&mut self, other: &LinearExpression, multiplier: &Rational) -> TermDelta {
        let mut delta = TermDelta::default();
        if multiplier.is_zero() {
            return delta;
        }
        self.constant += &other.constant * multiplier;
        for (&var, coeff) in &other.terms {
            let change = self.add_variable(var, &(coeff * multiplier));
            delta.note(var, change);
        }
        delta
    }

    /// Scale every coefficient and the constant.
    pub fn multiply(&mut self, factor: &Rational) {
        self.constant *= factor;
        if factor.is_zero() {
            self.terms.clear();
            return;
        }
        for coeff in self.terms.values_mut() {
            *coeff *= factor;
        }
    }

    /// Replace `var` with its defining expression, reporting the variables
    /// gained and lost (not counting `var` itself).
    pub fn substitute_out(&mut self, var: Variable, definition: &LinearExpression) -> TermDelta {
        match self.terms.swap_remove(&var) {
            Some(multiplier) => self.add_expression(definition, &multiplier),
            None => TermDelta::default(),
        }
    }

    /// Rearrange `0 == self` into a definition of `subject`.
    ///
    /// `subject` must appear in the expression; afterwards it does not,
    /// and the remaining expression equals `subject`.
    pub fn solve_for(&mut self, subject: Variable) -> Result<(), SolverError> {
        self.extract_subject(subject)?;
        Ok(())
    }

    /// Rearrange a row that currently defines `old` so that it defines
    /// `new` instead: `old == self` becomes `new == self'` with `old`
    /// appearing as an ordinary term.
    pub fn change_subject(&mut self, old: Variable, new: Variable) -> Result<(), SolverError> {
        let reciprocal = self.extract_subject(new)?;
        self.set_variable(old, reciprocal);
        Ok(())
    }

    fn extract_subject(&mut self, subject: Variable) -> Result<Rational, SolverError> {
        let coeff = self
            .terms
            .swap_remove(&subject)
            .ok_or(SolverError::InternalError("subject missing from expression"))?;
        // Invariant: stored coefficients are never zero.
        let reciprocal = coeff.recip();
        self.multiply(&-reciprocal.clone());
        Ok(reciprocal)
    }

    /// Any slack-kind variable in the expression, in term order.
    pub fn any_pivotable_variable(&self) -> Option<Variable> {
        self.terms
            .keys()
            .copied()
            .find(|var| var.is_pivotable())
    }

    /// Multiply two expressions. Linear only when at least one side is
    /// constant.
    pub fn try_mul(&self, other: &LinearExpression) -> Result<LinearExpression, SolverError> {
        if other.is_constant() {
            let mut result = self.clone();
            result.multiply(&other.constant);
            Ok(result)
        } else if self.is_constant() {
            let mut result = other.clone();
            result.multiply(&self.constant);
            Ok(result)
        } else {
            Err(SolverError::NonlinearExpression)
        }
    }

    /// Divide by an expression. Linear only when the divisor is a nonzero
    /// constant.
    pub fn try_div(&self, divisor: &LinearExpression) -> Result<LinearExpression, SolverError> {
        if !divisor.is_constant() || divisor.constant.is_zero() {
            return Err(SolverError::NonlinearExpression);
        }
        let mut result = self.clone();
        result.multiply(&divisor.constant.clone().recip());
        Ok(result)
    }
}

impl From<Variable> for LinearExpression {
    fn from(var: Variable) -> Self {
        LinearExpression::from_variable(var)
    }
}

impl From<Rational> for LinearExpression {
    fn from(constant: Rational) -> Self {
        LinearExpression::from_constant(constant)
    }
}
