//! Constraints.
//!
//! A constraint relates two linear expressions with `==`, `≤`, or `≥` at a
//! given strength. At construction it is canonicalized to `expression == 0`
//! (equation) or `expression ≥ 0` (inequality), which is the only form the
//! solver ever sees. Stays and edits are equations pinning a single
//! variable to a value; they differ from ordinary equations only in the
//! bookkeeping the solver attaches to their error variables.

use num_traits::One;

use crate::expression::LinearExpression;
use crate::rational::Rational;
use crate::strength::Strength;
use crate::variable::Variable;

/// The relation requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

/// The canonical form a constraint is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// `expression == 0`
    Equation,
    /// `expression ≥ 0`
    Inequality,
}

/// How the solver treats a constraint's error variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRole {
    /// An ordinary constraint.
    Regular,
    /// Pins a variable to its current value; its error rows are zeroed
    /// when stay constants are reset.
    Stay(Variable),
    /// Pins a variable for interactive editing; its error variables carry
    /// suggested-value deltas.
    Edit(Variable),
}

/// A linear constraint with a strength and weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    expression: LinearExpression,
    op: ConstraintOp,
    strength: Strength,
    weight: Rational,
    role: ConstraintRole,
}

impl Constraint {
    /// `lhs relation rhs` at the given strength, canonicalized.
    pub fn new(
        lhs: impl Into<LinearExpression>,
        relation: Relation,
        rhs: impl Into<LinearExpression>,
        strength: Strength,
    ) -> Self {
        let lhs = lhs.into();
        let rhs = rhs.into();
        let (mut expression, subtrahend, op) = match relation {
            Relation::Equal => (lhs, rhs, ConstraintOp::Equation),
            Relation::GreaterOrEqual => (lhs, rhs, ConstraintOp::Inequality),
            // rhs - lhs ≥ 0
            Relation::LessOrEqual => (rhs, lhs, ConstraintOp::Inequality),
        };
        expression.add_expression(&subtrahend, &-Rational::one());
        Self::from_parts(expression, op, strength)
    }

    fn from_parts(expression: LinearExpression, op: ConstraintOp, strength: Strength) -> Self {
        Self {
            expression,
            op,
            strength,
            weight: Rational::one(),
            role: ConstraintRole::Regular,
        }
    }

    /// `lhs == rhs`.
    pub fn eq(
        lhs: impl Into<LinearExpression>,
        rhs: impl Into<LinearExpression>,
        strength: Strength,
    ) -> Self {
        Self::new(lhs, Relation::Equal, rhs, strength)
    }

    /// `lhs ≥ rhs`.
    pub fn geq(
        lhs: impl Into<LinearExpression>,
        rhs: impl Into<LinearExpression>,
        strength: Strength,
    ) -> Self {
        Self::new(lhs, Relation::GreaterOrEqual, rhs, strength)
    }

    /// `lhs ≤ rhs`.
    pub fn leq(
        lhs: impl Into<LinearExpression>,
        rhs: impl Into<LinearExpression>,
        strength: Strength,
    ) -> Self {
        Self::new(lhs, Relation::LessOrEqual, rhs, strength)
    }

    /// A stay: `var == value`, expressed as `value - var == 0` so the
    /// canonical constant is the pinned value itself.
    pub fn stay(var: Variable, value: Rational, strength: Strength) -> Self {
        let mut expression = LinearExpression::from_constant(value);
        expression.add_variable(var, &-Rational::one());
        Self {
            expression,
            op: ConstraintOp::Equation,
            strength,
            weight: Rational::one(),
            role: ConstraintRole::Stay(var),
        }
    }

    /// An edit: like a stay, but its error variables track suggested
    /// values during an edit session.
    pub fn edit(var: Variable, value: Rational, strength: Strength) -> Self {
        let mut constraint = Self::stay(var, value, strength);
        constraint.role = ConstraintRole::Edit(var);
        constraint
    }

    /// Scale the strength's objective penalty.
    pub fn with_weight(mut self, weight: Rational) -> Self {
        self.weight = weight;
        self
    }

    /// The canonical expression (`== 0` or `≥ 0` depending on [`Self::op`]).
    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    pub fn is_inequality(&self) -> bool {
        self.op == ConstraintOp::Inequality
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn is_required(&self) -> bool {
        self.strength.is_required()
    }

    pub fn weight(&self) -> &Rational {
        &self.weight
    }

    pub fn role(&self) -> ConstraintRole {
        self.role
    }

    /// The objective-row coefficient for this constraint's error
    /// variables.
    pub fn error_coefficient(&self) -> Rational {
        self.strength.coefficient(&self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::int;

    #[test]
    fn equation_is_canonicalized_to_zero() {
        let x = Variable::external();
        // x == 100  =>  x - 100 == 0
        let c = Constraint::eq(x, int(100), Strength::REQUIRED);
        assert_eq!(c.op(), ConstraintOp::Equation);
        assert_eq!(c.expression().constant(), &int(-100));
        assert_eq!(c.expression().coefficient(x), Some(&int(1)));
    }

    #[test]
    fn leq_flips_into_geq_form() {
        let x = Variable::external();
        // x ≤ 10  =>  10 - x ≥ 0
        let c = Constraint::leq(x, int(10), Strength::REQUIRED);
        assert_eq!(c.op(), ConstraintOp::Inequality);
        assert_eq!(c.expression().constant(), &int(10));
        assert_eq!(c.expression().coefficient(x), Some(&int(-1)));
    }

    #[test]
    fn stay_records_the_pinned_value_as_constant() {
        let x = Variable::external();
        let c = Constraint::stay(x, int(167), Strength::WEAK);
        assert_eq!(c.expression().constant(), &int(167));
        assert_eq!(c.expression().coefficient(x), Some(&int(-1)));
        assert_eq!(c.role(), ConstraintRole::Stay(x));
    }

    #[test]
    fn default_strength_and_weight() {
        let x = Variable::external();
        let c = Constraint::eq(x, int(0), Strength::REQUIRED);
        assert!(c.is_required());
        assert_eq!(c.weight(), &int(1));
    }
}
