//! Branch-and-bound for integer-restricted variables.
//!
//! [`IntegerSolver`] wraps a [`SimplexSolver`] and drives every variable
//! created with [`Variable::integer`] to an integral value. The search is
//! best-first: each frontier node carries the bound constraints that
//! define its subproblem (shared structurally between siblings) and is
//! keyed by the relaxed objective of its parent, so the cheapest open
//! subproblem is always expanded next and nodes that cannot beat the
//! incumbent are pruned without touching the tableau.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use log::debug;
use num_traits::One;

use quadrille_core::{Constraint, Rational, SolverError, Strength, Variable};

use crate::solver::{ConstraintId, SimplexSolver};

/// One branching decision: `var ≤ limit` or `var ≥ limit`.
#[derive(Debug, Clone)]
struct Bound {
    var: Variable,
    upper: bool,
    limit: Rational,
}

impl Bound {
    fn to_constraint(&self) -> Constraint {
        if self.upper {
            Constraint::leq(self.var, self.limit.clone(), Strength::REQUIRED)
        } else {
            Constraint::geq(self.var, self.limit.clone(), Strength::REQUIRED)
        }
    }
}

/// A persistent list of bounds; children extend their parent's chain
/// without copying it.
#[derive(Debug, Clone, Default)]
struct BoundChain(Option<Rc<BoundLink>>);

#[derive(Debug)]
struct BoundLink {
    bound: Bound,
    rest: BoundChain,
}

impl BoundChain {
    fn extend(&self, bound: Bound) -> BoundChain {
        BoundChain(Some(Rc::new(BoundLink {
            bound,
            rest: self.clone(),
        })))
    }

    fn iter(&self) -> BoundIter<'_> {
        BoundIter(self.0.as_deref())
    }
}

struct BoundIter<'a>(Option<&'a BoundLink>);

impl<'a> Iterator for BoundIter<'a> {
    type Item = &'a Bound;

    fn next(&mut self) -> Option<&'a Bound> {
        let link = self.0?;
        self.0 = link.rest.0.as_deref();
        Some(&link.bound)
    }
}

/// A frontier entry: the subproblem bounds keyed by the parent's relaxed
/// objective. `seq` makes the ordering total so exploration is
/// deterministic.
#[derive(Debug)]
struct Node {
    key: Rational,
    seq: u64,
    bounds: BoundChain,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    // BinaryHeap is a max-heap; reverse so the cheapest node pops first,
    // oldest first among equals.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Outcome of solving one subproblem.
enum Explored {
    Infeasible,
    Integral(Rational),
    Fractional {
        objective: Rational,
        var: Variable,
        value: Rational,
    },
}

/// A [`SimplexSolver`] that additionally forces integer-restricted
/// variables to integral values.
///
/// The winning branch's bound constraints stay installed after
/// [`IntegerSolver::solve`] so the values can be read off; any structural
/// change retracts them first.
#[derive(Debug, Default)]
pub struct IntegerSolver {
    solver: SimplexSolver,
    /// Integer-restricted variables in order of first appearance.
    integer_vars: Vec<Variable>,
    /// Bounds committed by the last solve.
    active_bounds: Vec<ConstraintId>,
    seq: u64,
}

impl IntegerSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped continuous solver.
    pub fn solver(&self) -> &SimplexSolver {
        &self.solver
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, SolverError> {
        self.clear_active_bounds()?;
        for (&var, _) in constraint.expression().terms() {
            if var.is_integer() && !self.integer_vars.contains(&var) {
                self.integer_vars.push(var);
            }
        }
        self.solver.add_constraint(constraint)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), SolverError> {
        self.clear_active_bounds()?;
        self.solver.remove_constraint(id)
    }

    /// Add a stay pinning `var` to its current value.
    pub fn add_stay(&mut self, var: Variable, strength: Strength) -> Result<ConstraintId, SolverError> {
        let value = self.solver.get_value(var);
        self.add_constraint(Constraint::stay(var, value, strength))
    }

    pub fn get_value(&self, var: Variable) -> Rational {
        self.solver.get_value(var)
    }

    pub fn set_value(&mut self, var: Variable, value: Rational) {
        self.solver.set_value(var, value);
    }

    /// Solve the continuous relaxation, then branch and bound until every
    /// integer-restricted variable is integral.
    ///
    /// Fails with [`SolverError::RequiredFailure`] when no assignment of
    /// integral values satisfies the required constraints.
    pub fn solve(&mut self) -> Result<(), SolverError> {
        self.clear_active_bounds()?;
        self.solver.solve()?;
        if self.first_fractional().is_none() {
            return Ok(());
        }

        let mut frontier = BinaryHeap::new();
        frontier.push(Node {
            key: self.solver.objective_value(),
            seq: self.fresh_seq(),
            bounds: BoundChain::default(),
        });
        let mut incumbent: Option<(Rational, BoundChain)> = None;

        while let Some(node) = frontier.pop() {
            if let Some((best, _)) = &incumbent {
                if &node.key >= best {
                    continue;
                }
            }
            match self.explore(&node.bounds)? {
                Explored::Infeasible => {}
                Explored::Integral(objective) => {
                    let better = incumbent
                        .as_ref()
                        .map_or(true, |(best, _)| &objective < best);
                    if better {
                        debug!("new incumbent with objective {objective}");
                        incumbent = Some((objective, node.bounds.clone()));
                    }
                }
                Explored::Fractional {
                    objective,
                    var,
                    value,
                } => {
                    let floor = value.floor();
                    debug!("branching on {var} at {value}");
                    frontier.push(Node {
                        key: objective.clone(),
                        seq: self.fresh_seq(),
                        bounds: node.bounds.extend(Bound {
                            var,
                            upper: true,
                            limit: floor.clone(),
                        }),
                    });
                    frontier.push(Node {
                        key: objective,
                        seq: self.fresh_seq(),
                        bounds: node.bounds.extend(Bound {
                            var,
                            upper: false,
                            limit: floor + Rational::one(),
                        }),
                    });
                }
            }
        }

        let Some((_, bounds)) = incumbent else {
            return Err(SolverError::RequiredFailure);
        };
        for bound in bounds.iter() {
            let id = self.solver.add_constraint(bound.to_constraint())?;
            self.active_bounds.push(id);
        }
        self.solver.solve()
    }

    /// Solve one subproblem: apply its bounds, classify the result, and
    /// retract the bounds again.
    fn explore(&mut self, bounds: &BoundChain) -> Result<Explored, SolverError> {
        let mut applied = Vec::new();
        for bound in bounds.iter() {
            match self.solver.add_constraint(bound.to_constraint()) {
                Ok(id) => applied.push(id),
                Err(SolverError::RequiredFailure) => {
                    self.retract(&applied)?;
                    return Ok(Explored::Infeasible);
                }
                Err(err) => {
                    self.retract(&applied)?;
                    return Err(err);
                }
            }
        }
        self.solver.solve()?;
        let outcome = match self.first_fractional() {
            None => Explored::Integral(self.solver.objective_value()),
            Some((var, value)) => Explored::Fractional {
                objective: self.solver.objective_value(),
                var,
                value,
            },
        };
        self.retract(&applied)?;
        Ok(outcome)
    }

    fn retract(&mut self, ids: &[ConstraintId]) -> Result<(), SolverError> {
        for &id in ids.iter().rev() {
            self.solver.remove_constraint(id)?;
        }
        Ok(())
    }

    fn clear_active_bounds(&mut self) -> Result<(), SolverError> {
        for id in std::mem::take(&mut self.active_bounds) {
            self.solver.remove_constraint(id)?;
        }
        Ok(())
    }

    /// The first integer-restricted variable whose current value is not
    /// integral, with that value.
    fn first_fractional(&self) -> Option<(Variable, Rational)> {
        self.integer_vars.iter().copied().find_map(|var| {
            let value = self.solver.get_value(var);
            if value.is_integer() {
                None
            } else {
                Some((var, value))
            }
        })
    }

    fn fresh_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }
}
